//! Application core - decoding pipeline, rendering and the account wizard

pub mod create_account;
pub mod decoding;
pub mod describe;
pub mod format;

pub use create_account::{CreateAccount, WizardEvent, GETH_IMPORT_NAME};
pub use decoding::MethodDecoding;
pub use describe::{describe, Description, InputLine};
