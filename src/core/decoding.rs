//! Method decoding for a transaction list entry
//!
//! [`MethodDecoding::lookup`] classifies a transaction immediately, then
//! refines the result with two external queries: whether the counterparty
//! has code, and what the call's signature resolves to. A newer `lookup`
//! supersedes older ones; results of superseded lookups are dropped when
//! they arrive rather than applied.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::describe::{describe, Description};
use crate::domain::abi::{AbiDecoder, DecodedMethod};
use crate::domain::services::{ChainQuery, SignatureRegistry};
use crate::domain::tx::{decode, AddressBook, Classification, DecodedCall, Transaction};
use crate::infrastructure::abi::AlloyAbiDecoder;

#[derive(Debug, Default)]
struct DecodeState {
    /// Bumped by every new transaction
    generation: u64,
    transaction: Option<Transaction>,
    call: Option<DecodedCall>,
}

/// Decoder bound to the address whose history is being shown
pub struct MethodDecoding {
    address: Address,
    book: Arc<AddressBook>,
    chain: Arc<dyn ChainQuery>,
    signatures: Arc<dyn SignatureRegistry>,
    abi: Arc<dyn AbiDecoder>,
    state: RwLock<DecodeState>,
}

impl MethodDecoding {
    pub fn new(
        address: Address,
        book: Arc<AddressBook>,
        chain: Arc<dyn ChainQuery>,
        signatures: Arc<dyn SignatureRegistry>,
    ) -> Self {
        Self {
            address,
            book,
            chain,
            signatures,
            abi: Arc::new(AlloyAbiDecoder::new()),
            state: RwLock::new(DecodeState::default()),
        }
    }

    /// Latest decode result, possibly still partial
    pub async fn current(&self) -> Option<DecodedCall> {
        self.state.read().await.call.clone()
    }

    /// Render the current transaction, if any
    pub async fn describe(&self, historic: bool) -> Option<Description> {
        let state = self.state.read().await;
        let transaction = state.transaction.as_ref()?;
        let call = state.call.as_ref()?;
        Some(describe(transaction, call, &self.book, historic))
    }

    /// Decode `transaction`, running external lookups to completion
    ///
    /// Returns the final result, or `None` if a newer transaction replaced
    /// this one while its lookups were in flight. Passing the transaction
    /// that is already current returns the current result without new
    /// queries.
    pub async fn lookup(&self, transaction: Transaction) -> Option<DecodedCall> {
        let initial = decode(&transaction, self.address, &self.book);

        let generation = {
            let mut state = self.state.write().await;
            if state.transaction.as_ref() == Some(&transaction) {
                return state.call.clone();
            }
            state.generation += 1;
            state.transaction = Some(transaction.clone());
            state.call = Some(initial.clone());
            state.generation
        };

        if initial.classification == Classification::Deploy {
            return Some(initial);
        }

        let mut call = initial;

        if let Some(counterparty) = transaction.counterparty(self.address) {
            let is_contract = self.is_contract(counterparty).await;
            call = self
                .apply(generation, |call| call.with_contract(is_contract))
                .await?;
        }

        if let Some((selector, _)) = transaction.selector_and_params() {
            if call.needs_lookup() {
                let method = self.resolve_method(selector, &transaction).await;
                call = self.apply(generation, |call| call.with_method(method)).await?;
            }
        }

        Some(call)
    }

    async fn is_contract(&self, address: Address) -> bool {
        match self.chain.get_code(address).await {
            Ok(code) => !code.is_empty(),
            Err(err) => {
                warn!(%address, "code lookup failed: {err:#}");
                false
            }
        }
    }

    /// Look up and decode the call; `None` on any failure
    async fn resolve_method(
        &self,
        selector: [u8; 4],
        transaction: &Transaction,
    ) -> Option<DecodedMethod> {
        let selector_hex = hex::encode(selector);
        let function = match self.signatures.lookup(selector).await {
            Ok(Some(function)) => function,
            Ok(None) => {
                debug!(selector = %selector_hex, "signature not registered");
                return None;
            }
            Err(err) => {
                warn!(selector = %selector_hex, "signature lookup failed: {err:#}");
                return None;
            }
        };

        match self.abi.decode_calldata(&function, &transaction.input) {
            Ok(method) => Some(method),
            Err(err) => {
                debug!(
                    signature = %function.signature,
                    "call data does not fit signature: {err:#}"
                );
                None
            }
        }
    }

    /// Update the current call if `generation` is still current
    async fn apply(
        &self,
        generation: u64,
        update: impl FnOnce(DecodedCall) -> DecodedCall,
    ) -> Option<DecodedCall> {
        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "discarding stale decode result"
            );
            return None;
        }
        let call = update(state.call.take()?);
        state.call = Some(call.clone());
        Some(call)
    }
}
