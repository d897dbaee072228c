//! Domain layer - models and contracts, free of transport details

pub mod abi;
pub mod services;
pub mod tx;
pub mod wizard;
