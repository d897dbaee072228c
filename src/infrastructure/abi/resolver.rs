//! Remote signature resolution via the OpenChain signature database

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_json_abi::Function;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::abi::{FunctionSignature, ParamSpec, SignatureSource};
use crate::domain::services::SignatureRegistry;

const OPENCHAIN_LOOKUP: &str = "https://api.openchain.xyz/signature-database/v1/lookup";

#[derive(Debug, Deserialize)]
struct OpenChainResponse {
    ok: bool,
    result: OpenChainResult,
}

#[derive(Debug, Deserialize)]
struct OpenChainResult {
    #[serde(default)]
    function: HashMap<String, Option<Vec<OpenChainSignature>>>,
}

#[derive(Debug, Deserialize)]
struct OpenChainSignature {
    name: String,
}

/// Remote signature resolver with in-memory caching
///
/// Only successful answers are cached, including "not found"; transport
/// errors are left uncached so the next lookup retries.
pub struct AbiResolver {
    http: reqwest::Client,
    endpoint: String,
    /// Cache: selector -> best signature
    selector_cache: Arc<RwLock<HashMap<[u8; 4], Option<FunctionSignature>>>>,
}

impl AbiResolver {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(OPENCHAIN_LOOKUP)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            selector_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Resolve a selector to the first candidate signature that parses
    pub async fn lookup_selector(&self, selector: [u8; 4]) -> Result<Option<FunctionSignature>> {
        if let Some(cached) = self.selector_cache.read().await.get(&selector) {
            return Ok(cached.clone());
        }

        let selector_hex = format!("0x{}", hex::encode(selector));
        debug!(selector = %selector_hex, "querying signature database");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("function", selector_hex.as_str()), ("filter", "true")])
            .send()
            .await
            .context("Failed to query OpenChain API")?
            .error_for_status()
            .context("OpenChain API returned an error status")?;

        let data: OpenChainResponse = response
            .json()
            .await
            .context("Failed to parse OpenChain response")?;

        if !data.ok {
            anyhow::bail!("OpenChain API returned ok=false for {selector_hex}");
        }

        let resolved = best_candidate(&data, &selector_hex, selector);
        debug!(
            selector = %selector_hex,
            signature = resolved.as_ref().map(|f| f.signature.as_str()).unwrap_or("<none>"),
            "signature lookup finished"
        );

        self.selector_cache
            .write()
            .await
            .insert(selector, resolved.clone());

        Ok(resolved)
    }
}

#[async_trait]
impl SignatureRegistry for AbiResolver {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Option<FunctionSignature>> {
        self.lookup_selector(selector).await
    }
}

fn best_candidate(
    data: &OpenChainResponse,
    selector_hex: &str,
    selector: [u8; 4],
) -> Option<FunctionSignature> {
    data.result
        .function
        .get(selector_hex)?
        .as_ref()?
        .iter()
        .find_map(|candidate| parse_text_signature(&candidate.name, selector).ok())
}

/// Parse a text signature like `transfer(address,uint256)`
///
/// Fails if the text does not parse or hashes to a different selector.
pub fn parse_text_signature(text: &str, selector: [u8; 4]) -> Result<FunctionSignature> {
    let function = Function::parse(text)
        .map_err(|err| anyhow::anyhow!("{err}"))
        .with_context(|| format!("invalid signature '{text}'"))?;

    if function.selector().0 != selector {
        anyhow::bail!(
            "signature '{text}' does not hash to 0x{}",
            hex::encode(selector)
        );
    }

    let inputs = function
        .inputs
        .iter()
        .map(|input| ParamSpec::new(input.name.clone(), input.selector_type()))
        .collect();

    Ok(FunctionSignature {
        selector,
        name: function.name.clone(),
        signature: function.signature(),
        inputs,
        source: SignatureSource::Remote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

    #[test]
    fn test_parse_text_signature() {
        let function = parse_text_signature("transfer(address,uint256)", TRANSFER).unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(function.signature, "transfer(address,uint256)");
        assert_eq!(
            function.input_kinds().collect::<Vec<_>>(),
            vec!["address", "uint256"]
        );
        assert_eq!(function.source, SignatureSource::Remote);
    }

    #[test]
    fn test_parse_rejects_wrong_selector() {
        assert!(parse_text_signature("approve(address,uint256)", TRANSFER).is_err());
        assert!(parse_text_signature("not a signature", TRANSFER).is_err());
    }

    #[test]
    fn test_best_candidate_skips_unparsable() {
        let data: OpenChainResponse = serde_json::from_str(
            r#"{
                "ok": true,
                "result": {
                    "function": {
                        "0xa9059cbb": [
                            {"name": "broken(", "filtered": false},
                            {"name": "transfer(address,uint256)", "filtered": false}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let found = best_candidate(&data, "0xa9059cbb", TRANSFER).unwrap();
        assert_eq!(found.name, "transfer");
    }

    #[test]
    fn test_best_candidate_handles_null() {
        let data: OpenChainResponse =
            serde_json::from_str(r#"{"ok": true, "result": {"function": {"0xdeadbeef": null}}}"#)
                .unwrap();
        assert!(best_candidate(&data, "0xdeadbeef", [0xde, 0xad, 0xbe, 0xef]).is_none());
    }
}
