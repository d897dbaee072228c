//! Ethereum infrastructure - Alloy provider implementations

mod provider;

pub use provider::{FetchedTransaction, NodeClient, ProviderConfig};
