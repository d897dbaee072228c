//! Known tokens and the token method table

use alloy_primitives::{Address, U256};

use crate::domain::abi::DecodedParam;

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// A token the user has registered, with its display scaling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownToken {
    pub address: Address,
    pub name: String,
    /// Short symbol shown after amounts (e.g. "TOK")
    pub tag: String,
    /// Divisor from the smallest unit to display units
    pub format: U256,
}

impl KnownToken {
    pub fn new(address: Address, name: impl Into<String>, tag: impl Into<String>, format: U256) -> Self {
        Self {
            address,
            name: name.into(),
            tag: tag.into(),
            format,
        }
    }

    /// Build a token whose display divisor is `10^decimals`
    ///
    /// Returns `None` when the divisor does not fit in 256 bits (more than
    /// 77 decimals).
    pub fn with_decimals(
        address: Address,
        name: impl Into<String>,
        tag: impl Into<String>,
        decimals: u8,
    ) -> Option<Self> {
        let format = U256::from(10u64).checked_pow(U256::from(decimals))?;
        Some(Self::new(address, name, tag, format))
    }
}

/// Semantic shape of a token call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMethod {
    /// `transfer(to,value)`
    Transfer,
}

/// Arguments of a token transfer, extracted from decoded params
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub to: Address,
    pub value: U256,
}

impl TokenMethod {
    pub fn lookup(selector: [u8; 4]) -> Option<Self> {
        match selector {
            TRANSFER_SELECTOR => Some(TokenMethod::Transfer),
            _ => None,
        }
    }

    /// Extract the transfer arguments, if the params have this method's shape
    ///
    /// The first param must be an address, the second an unsigned integer.
    pub fn extract(&self, params: &[DecodedParam]) -> Option<TokenTransfer> {
        match (self, params) {
            (TokenMethod::Transfer, [to, value]) => Some(TokenTransfer {
                to: to.value.as_address()?,
                value: value.value.as_uint()?,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::ParamValue;
    use alloy_primitives::address;

    fn param(kind: &str, value: ParamValue) -> DecodedParam {
        DecodedParam {
            name: String::new(),
            kind: kind.to_string(),
            value,
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(TokenMethod::lookup(TRANSFER_SELECTOR), Some(TokenMethod::Transfer));
        assert_eq!(TokenMethod::lookup([0x09, 0x5e, 0xa7, 0xb3]), None);
    }

    #[test]
    fn test_extract_requires_shape() {
        let to = address!("00000000000000000000000000000000000000bb");
        let good = vec![
            param("address", ParamValue::Address(to)),
            param("uint256", ParamValue::Uint(U256::from(500))),
        ];
        assert_eq!(
            TokenMethod::Transfer.extract(&good),
            Some(TokenTransfer {
                to,
                value: U256::from(500)
            })
        );

        let swapped = vec![good[1].clone(), good[0].clone()];
        assert!(TokenMethod::Transfer.extract(&swapped).is_none());
        assert!(TokenMethod::Transfer.extract(&good[..1]).is_none());
    }

    #[test]
    fn test_with_decimals() {
        let token = KnownToken::with_decimals(Address::ZERO, "Token", "TOK", 2).unwrap();
        assert_eq!(token.format, U256::from(100));

        let widest = KnownToken::with_decimals(Address::ZERO, "Token", "TOK", 77).unwrap();
        assert_eq!(widest.format, U256::from(10u64).pow(U256::from(77)));

        assert!(KnownToken::with_decimals(Address::ZERO, "Token", "TOK", 78).is_none());
        assert!(KnownToken::with_decimals(Address::ZERO, "Token", "TOK", u8::MAX).is_none());
    }
}
