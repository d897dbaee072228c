//! ABI decoder trait and typed parameter values

use alloy_primitives::{Address, I256, U256};

use super::FunctionSignature;

/// Typed argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Address(Address),
    Uint(U256),
    Int(I256),
    Bool(bool),
    /// Fixed or dynamic byte strings (also function pointers)
    Bytes(Vec<u8>),
    Text(String),
    /// Fixed or dynamic arrays
    List(Vec<ParamValue>),
    Tuple(Vec<ParamValue>),
}

impl ParamValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            ParamValue::Address(address) => Some(*address),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            ParamValue::Uint(value) => Some(*value),
            _ => None,
        }
    }
}

/// A decoded function argument, tagged with its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    pub value: ParamValue,
}

/// A call decoded against its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMethod {
    pub function_name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    pub params: Vec<DecodedParam>,
}

/// Decodes call data against a known signature
pub trait AbiDecoder: Send + Sync {
    /// `data` includes the 4-byte selector, which must match `function`.
    /// Parameter bytes that are short or malformed for the declared types
    /// are an error, never a partial result.
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> anyhow::Result<DecodedMethod>;
}
