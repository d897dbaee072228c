//! Transaction models and call-data classification

mod address_book;
mod call;
mod token;
mod transaction;

pub use address_book::AddressBook;
pub use call::{decode, Classification, DecodedCall, CONTRACT_CREATE};
pub use token::{KnownToken, TokenMethod, TokenTransfer, TRANSFER_SELECTOR};
pub use transaction::Transaction;
