//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based node client (chain queries, account management)
//! - ABI scanning and decoding using alloy-dyn-abi
//! - Local and remote signature registries

pub mod abi;
pub mod ethereum;

pub use abi::{AbiResolver, AbiScanner, AlloyAbiDecoder, LayeredRegistry};
pub use ethereum::{NodeClient, ProviderConfig};
