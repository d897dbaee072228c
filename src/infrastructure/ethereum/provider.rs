//! JSON-RPC node client backing the chain and account services
//!
//! Account management goes through the `parity_*` RPC namespace; chain
//! queries use plain `eth_*` calls.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::services::{AccountMeta, AccountService, ChainQuery};
use crate::domain::tx::Transaction;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }

    /// Pick the transport from the endpoint's scheme
    ///
    /// `ws://`/`wss://` select WebSocket, `http(s)://` HTTP, a path IPC.
    /// A bare `host:port` is treated as HTTP.
    pub fn from_endpoint(endpoint: &str) -> Self {
        let trimmed = endpoint.trim();
        if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
            return ProviderConfig::WebSocket(trimmed.to_string());
        }
        #[cfg(unix)]
        {
            if trimmed.starts_with('/') || trimmed.ends_with(".ipc") {
                return ProviderConfig::Ipc(PathBuf::from(trimmed));
            }
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ProviderConfig::Http(trimmed.to_string())
        } else {
            ProviderConfig::Http(format!("http://{}", trimmed))
        }
    }
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// A transaction together with what the node knows about its inclusion
#[derive(Debug, Clone)]
pub struct FetchedTransaction {
    pub hash: B256,
    pub transaction: Transaction,
    /// Mined into a block
    pub historic: bool,
}

/// Node client over one transport
pub enum NodeClient {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

// Dispatch one raw JSON-RPC call to whichever transport is active
macro_rules! raw_request {
    ($self:ident, $method:expr, $params:expr) => {
        match $self {
            NodeClient::Http { provider, .. } => provider.raw_request($method.into(), $params).await,
            NodeClient::WebSocket { provider, .. } => {
                provider.raw_request($method.into(), $params).await
            }
            #[cfg(unix)]
            NodeClient::Ipc { provider, .. } => provider.raw_request($method.into(), $params).await,
        }
    };
}

impl NodeClient {
    /// Connect using the given configuration
    pub async fn connect(config: ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Http(url) => {
                let rpc_url = url.parse().context("Invalid HTTP URL")?;
                let provider = ProviderBuilder::new().connect_http(rpc_url);
                Ok(NodeClient::Http {
                    provider,
                    endpoint: url,
                })
            }
            ProviderConfig::WebSocket(url) => {
                let provider = ProviderBuilder::new()
                    .connect(&url)
                    .await
                    .context("Failed to create WebSocket provider")?;
                Ok(NodeClient::WebSocket {
                    provider,
                    endpoint: url,
                })
            }
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => {
                use alloy::providers::IpcConnect;
                let ipc = IpcConnect::new(path.to_string_lossy().to_string());
                let provider = ProviderBuilder::new()
                    .connect_ipc(ipc)
                    .await
                    .context("Failed to create IPC provider")?;
                Ok(NodeClient::Ipc {
                    provider,
                    endpoint: path.display().to_string(),
                })
            }
        }
    }

    pub fn endpoint_name(&self) -> &str {
        match self {
            NodeClient::Http { endpoint, .. } => endpoint,
            NodeClient::WebSocket { endpoint, .. } => endpoint,
            #[cfg(unix)]
            NodeClient::Ipc { endpoint, .. } => endpoint,
        }
    }

    /// Fetch a transaction and, if mined, the contract it created
    pub async fn transaction(&self, hash: B256) -> Result<Option<FetchedTransaction>> {
        let json: serde_json::Value = raw_request!(self, "eth_getTransactionByHash", (hash,))
            .context("eth_getTransactionByHash failed")?;
        if json.is_null() {
            return Ok(None);
        }

        let mut transaction = parse_transaction(&json)?;
        let historic = json
            .get("blockNumber")
            .map(|value| !value.is_null())
            .unwrap_or(false);

        if historic && transaction.to.is_none() && transaction.creates.is_none() {
            let receipt: serde_json::Value =
                raw_request!(self, "eth_getTransactionReceipt", (hash,))
                    .context("eth_getTransactionReceipt failed")?;
            transaction.creates = parse_optional_address(receipt.get("contractAddress"))?;
        }

        Ok(Some(FetchedTransaction {
            hash,
            transaction,
            historic,
        }))
    }
}

#[async_trait]
impl ChainQuery for NodeClient {
    async fn get_code(&self, address: Address) -> Result<Bytes> {
        let code = match self {
            NodeClient::Http { provider, .. } => provider.get_code_at(address).await,
            NodeClient::WebSocket { provider, .. } => provider.get_code_at(address).await,
            #[cfg(unix)]
            NodeClient::Ipc { provider, .. } => provider.get_code_at(address).await,
        };
        code.with_context(|| format!("eth_getCode failed for {address}"))
    }
}

#[async_trait]
impl AccountService for NodeClient {
    async fn new_account_from_phrase(&self, phrase: &str, password: &str) -> Result<Address> {
        debug!(endpoint = self.endpoint_name(), "creating account from phrase");
        let address: Address = raw_request!(
            self,
            "parity_newAccountFromPhrase",
            (phrase.to_string(), password.to_string())
        )
            .context("parity_newAccountFromPhrase failed")?;
        Ok(address)
    }

    async fn new_account_from_wallet(&self, json: &str, password: &str) -> Result<Address> {
        debug!(endpoint = self.endpoint_name(), "creating account from wallet file");
        let address: Address = raw_request!(
            self,
            "parity_newAccountFromWallet",
            (json.to_string(), password.to_string())
        )
            .context("parity_newAccountFromWallet failed")?;
        Ok(address)
    }

    async fn import_geth_accounts(&self, addresses: &[Address]) -> Result<Vec<Address>> {
        debug!(count = addresses.len(), "importing geth accounts");
        let imported: Vec<Address> =
            raw_request!(self, "parity_importGethAccounts", (addresses.to_vec(),))
                .context("parity_importGethAccounts failed")?;
        Ok(imported)
    }

    async fn set_account_name(&self, address: Address, name: &str) -> Result<()> {
        let _: bool = raw_request!(self, "parity_setAccountName", (address, name.to_string()))
            .with_context(|| format!("parity_setAccountName failed for {address}"))?;
        Ok(())
    }

    async fn set_account_meta(&self, address: Address, meta: &AccountMeta) -> Result<()> {
        // The node stores metadata as an opaque JSON string
        let meta_json = serde_json::to_string(meta).context("Failed to encode account meta")?;
        let _: bool = raw_request!(self, "parity_setAccountMeta", (address, meta_json))
            .with_context(|| format!("parity_setAccountMeta failed for {address}"))?;
        Ok(())
    }
}

/// Parse a JSON-RPC transaction object into the display model
fn parse_transaction(json: &serde_json::Value) -> Result<Transaction> {
    let from = json
        .get("from")
        .and_then(|v| v.as_str())
        .context("transaction has no sender")?
        .parse::<Address>()
        .context("invalid sender address")?;
    let to = parse_optional_address(json.get("to"))?;
    let creates = parse_optional_address(json.get("creates"))?;

    let value = parse_hex_u256(json.get("value").and_then(|v| v.as_str()).unwrap_or("0x0"))?;
    let gas = parse_hex_u256(json.get("gas").and_then(|v| v.as_str()).unwrap_or("0x0"))?;
    // EIP-1559 transactions report the effective price once mined
    let gas_price = json
        .get("gasPrice")
        .or_else(|| json.get("maxFeePerGas"))
        .and_then(|v| v.as_str())
        .map(parse_hex_u256)
        .transpose()?
        .unwrap_or(U256::ZERO);

    let input_str = json
        .get("input")
        .or_else(|| json.get("data"))
        .and_then(|v| v.as_str())
        .unwrap_or("0x");
    let input = hex::decode(input_str.strip_prefix("0x").unwrap_or(input_str))
        .context("invalid input hex")?;

    Ok(Transaction {
        from,
        to,
        value,
        gas,
        gas_price,
        input: Bytes::from(input),
        creates,
    })
}

fn parse_optional_address(value: Option<&serde_json::Value>) -> Result<Option<Address>> {
    value
        .and_then(|v| v.as_str())
        .map(|s| s.parse::<Address>().context("invalid address"))
        .transpose()
}

/// Parse hex string to U256
fn parse_hex_u256(s: &str) -> Result<U256> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(s, 16).context("Failed to parse hex U256")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_from_endpoint() {
        assert_eq!(
            ProviderConfig::from_endpoint("localhost:8545"),
            ProviderConfig::Http("http://localhost:8545".to_string())
        );
        assert_eq!(
            ProviderConfig::from_endpoint("wss://node.example"),
            ProviderConfig::WebSocket("wss://node.example".to_string())
        );
        #[cfg(unix)]
        assert_eq!(
            ProviderConfig::from_endpoint("/tmp/parity.ipc"),
            ProviderConfig::Ipc(PathBuf::from("/tmp/parity.ipc"))
        );
    }

    #[test]
    fn test_parse_transaction() {
        let json = serde_json::json!({
            "hash": "0x01",
            "from": "0x00000000000000000000000000000000000000aa",
            "to": "0x00000000000000000000000000000000000000bb",
            "value": "0xde0b6b3a7640000",
            "gas": "0x5208",
            "gasPrice": "0x4a817c800",
            "input": "0xa9059cbb",
            "blockNumber": null
        });

        let tx = parse_transaction(&json).unwrap();
        assert_eq!(tx.from, address!("00000000000000000000000000000000000000aa"));
        assert_eq!(tx.to, Some(address!("00000000000000000000000000000000000000bb")));
        assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(tx.gas, U256::from(21_000));
        assert_eq!(tx.gas_price, U256::from(20_000_000_000u64));
        assert_eq!(tx.input.as_ref(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert!(tx.creates.is_none());
    }

    #[test]
    fn test_parse_contract_creation() {
        let json = serde_json::json!({
            "from": "0x00000000000000000000000000000000000000aa",
            "to": null,
            "creates": "0x00000000000000000000000000000000000000cc",
            "value": "0x0",
            "gas": "0x0",
            "input": "0x60606040"
        });

        let tx = parse_transaction(&json).unwrap();
        assert!(tx.to.is_none());
        assert_eq!(tx.creates, Some(address!("00000000000000000000000000000000000000cc")));
        assert_eq!(tx.gas_price, U256::ZERO);
    }

    #[test]
    fn test_parse_hex_u256() {
        assert_eq!(parse_hex_u256("0x").unwrap(), U256::ZERO);
        assert_eq!(parse_hex_u256("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_hex_u256("0xff").unwrap(), U256::from(255));
        assert!(parse_hex_u256("0xzz").is_err());
    }
}
