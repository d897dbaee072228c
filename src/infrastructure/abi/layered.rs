//! Chain of signature registries, consulted in order

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::domain::abi::FunctionSignature;
use crate::domain::services::SignatureRegistry;

/// Local artifacts first, then remote databases
#[derive(Clone, Default)]
pub struct LayeredRegistry {
    layers: Vec<Arc<dyn SignatureRegistry>>,
}

impl LayeredRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Arc<dyn SignatureRegistry>) -> Self {
        self.layers.push(layer);
        self
    }
}

#[async_trait]
impl SignatureRegistry for LayeredRegistry {
    /// First layer with an answer wins. A failing layer is skipped; the
    /// lookup only fails when every layer failed.
    async fn lookup(&self, selector: [u8; 4]) -> Result<Option<FunctionSignature>> {
        let mut last_error = None;
        let mut answered = false;

        for layer in &self.layers {
            match layer.lookup(selector).await {
                Ok(Some(function)) => return Ok(Some(function)),
                Ok(None) => answered = true,
                Err(err) => {
                    warn!(selector = %hex::encode(selector), "signature layer failed: {err:#}");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if !answered => Err(err),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{AbiRegistry, SignatureSource};

    struct Failing;

    #[async_trait]
    impl SignatureRegistry for Failing {
        async fn lookup(&self, _selector: [u8; 4]) -> Result<Option<FunctionSignature>> {
            anyhow::bail!("offline")
        }
    }

    fn registry_with(name: &str) -> AbiRegistry {
        let mut registry = AbiRegistry::new();
        registry.insert(FunctionSignature {
            selector: [1, 2, 3, 4],
            name: name.to_string(),
            signature: format!("{name}()"),
            inputs: vec![],
            source: SignatureSource::Builtin,
        });
        registry
    }

    #[tokio::test]
    async fn test_first_layer_wins() {
        let layered = LayeredRegistry::new()
            .with_layer(Arc::new(registry_with("local")))
            .with_layer(Arc::new(registry_with("remote")));

        let found = layered.lookup([1, 2, 3, 4]).await.unwrap().unwrap();
        assert_eq!(found.name, "local");
        assert!(layered.lookup([9, 9, 9, 9]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_layer_is_skipped() {
        let layered = LayeredRegistry::new()
            .with_layer(Arc::new(Failing))
            .with_layer(Arc::new(registry_with("remote")));
        assert_eq!(
            layered.lookup([1, 2, 3, 4]).await.unwrap().unwrap().name,
            "remote"
        );
        assert!(layered.lookup([9, 9, 9, 9]).await.unwrap().is_none());

        let only_failing = LayeredRegistry::new().with_layer(Arc::new(Failing));
        assert!(only_failing.lookup([1, 2, 3, 4]).await.is_err());
    }
}
