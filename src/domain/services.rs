//! Service contracts consumed by the decoder and the account wizard
//!
//! Implementations live in the infrastructure layer (JSON-RPC node client,
//! signature databases). Tests substitute in-memory versions.

use alloy_primitives::{Address, Bytes};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::abi::{AbiRegistry, FunctionSignature};

/// Metadata stored alongside an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hint: Option<String>,
}

/// Account provisioning and naming on the node
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account from a recovery phrase, returning its address
    async fn new_account_from_phrase(&self, phrase: &str, password: &str) -> Result<Address>;

    /// Create an account from an encrypted wallet file, returning its address
    async fn new_account_from_wallet(&self, json: &str, password: &str) -> Result<Address>;

    /// Import accounts managed by an external geth keystore
    async fn import_geth_accounts(&self, addresses: &[Address]) -> Result<Vec<Address>>;

    async fn set_account_name(&self, address: Address, name: &str) -> Result<()>;

    async fn set_account_meta(&self, address: Address, meta: &AccountMeta) -> Result<()>;
}

/// Read-only chain state queries
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Deployed code at `address`; empty means "not a contract"
    async fn get_code(&self, address: Address) -> Result<Bytes>;
}

/// Resolves 4-byte selectors to method descriptors
#[async_trait]
pub trait SignatureRegistry: Send + Sync {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Option<FunctionSignature>>;
}

#[async_trait]
impl SignatureRegistry for AbiRegistry {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Option<FunctionSignature>> {
        Ok(AbiRegistry::lookup(self, selector).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = AccountMeta {
            password_hint: Some("blue".to_string()),
        };
        assert_eq!(serde_json::to_string(&meta).unwrap(), r#"{"passwordHint":"blue"}"#);
        assert_eq!(serde_json::to_string(&AccountMeta::default()).unwrap(), "{}");
    }
}
