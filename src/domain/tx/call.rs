//! Classification of a transaction's call data

use alloy_primitives::Address;

use super::{AddressBook, KnownToken, TokenMethod, TokenTransfer, Transaction};
use crate::domain::abi::{DecodedMethod, DecodedParam};

/// Leading bytes of contract creation code emitted by solc
pub const CONTRACT_CREATE: [u8; 4] = [0x60, 0x60, 0x60, 0x40];

/// What a transaction does, for rendering purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Deploy,
    TokenTransfer,
    KnownMethod,
    UnknownMethod,
    PlainTransfer,
    PlainReceipt,
}

/// A transaction's call data resolved as far as currently known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub signature: Option<[u8; 4]>,
    pub method_name: Option<String>,
    pub inputs: Option<Vec<DecodedParam>>,
    pub classification: Classification,
    /// The counterparty has deployed code
    pub is_contract: bool,
    /// The inspected address is the recipient
    pub is_received: bool,
    /// Counterparty token, if registered
    pub token: Option<KnownToken>,
}

impl DecodedCall {
    /// Hex form of the signature (e.g. "0xa9059cbb")
    pub fn signature_hex(&self) -> Option<String> {
        self.signature
            .map(|selector| format!("0x{}", hex::encode(selector)))
    }

    /// Whether a signature lookup can still change the classification
    pub fn needs_lookup(&self) -> bool {
        matches!(
            self.classification,
            Classification::UnknownMethod | Classification::KnownMethod | Classification::TokenTransfer
        ) && self.signature.is_some()
    }

    /// Apply a signature lookup result and reclassify
    ///
    /// `None` means the signature is unregistered or its params failed to
    /// decode; either way the call is an unknown method.
    pub fn with_method(mut self, method: Option<DecodedMethod>) -> Self {
        if !self.needs_lookup() {
            return self;
        }
        match method {
            Some(method) => {
                self.method_name = Some(method.function_name);
                self.inputs = Some(method.params);
            }
            None => {
                self.method_name = None;
                self.inputs = None;
            }
        }
        self.classification = self.classify_method();
        self
    }

    pub fn with_contract(mut self, is_contract: bool) -> Self {
        self.is_contract = is_contract;
        self
    }

    /// Token transfer arguments, if this call is one
    pub fn token_transfer(&self) -> Option<TokenTransfer> {
        self.token.as_ref()?;
        let method = TokenMethod::lookup(self.signature?)?;
        method.extract(self.inputs.as_deref()?)
    }

    fn classify_method(&self) -> Classification {
        if self.token_transfer().is_some() {
            Classification::TokenTransfer
        } else if self.method_name.is_some() && self.inputs.is_some() {
            Classification::KnownMethod
        } else {
            Classification::UnknownMethod
        }
    }
}

/// Classify a transaction as seen from `address`, before any lookups
///
/// Calls with a recipient start out as `UnknownMethod` and are refined by
/// [`DecodedCall::with_method`] once the signature resolves.
pub fn decode(transaction: &Transaction, address: Address, book: &AddressBook) -> DecodedCall {
    let is_received = transaction.is_received_by(address);
    let token = transaction
        .counterparty(address)
        .and_then(|counterparty| book.token(counterparty))
        .cloned();

    let mut call = DecodedCall {
        signature: None,
        method_name: None,
        inputs: None,
        classification: Classification::UnknownMethod,
        is_contract: false,
        is_received,
        token,
    };

    if transaction.input.is_empty() {
        call.classification = if is_received {
            Classification::PlainReceipt
        } else {
            Classification::PlainTransfer
        };
        return call;
    }

    call.signature = transaction
        .selector_and_params()
        .map(|(selector, _)| selector);

    if transaction.to.is_none() || call.signature == Some(CONTRACT_CREATE) {
        call.classification = Classification::Deploy;
    }

    call
}
