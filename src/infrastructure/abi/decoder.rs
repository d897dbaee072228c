//! Call data decoding backed by `alloy-dyn-abi`

use alloy_dyn_abi::{DynSolType, DynSolValue};
use anyhow::{bail, ensure, Context, Result};

use crate::domain::abi::{AbiDecoder, DecodedMethod, DecodedParam, FunctionSignature, ParamValue};

#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyAbiDecoder;

impl AlloyAbiDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AbiDecoder for AlloyAbiDecoder {
    fn decode_calldata(&self, function: &FunctionSignature, data: &[u8]) -> Result<DecodedMethod> {
        let Some((selector, encoded)) = data.split_first_chunk::<4>() else {
            bail!("call data shorter than a selector ({} bytes)", data.len());
        };
        ensure!(
            *selector == function.selector,
            "selector mismatch: got 0x{}, expected 0x{}",
            hex::encode(selector),
            hex::encode(function.selector)
        );

        let values = decode_params(function, encoded)?;
        ensure!(
            values.len() == function.inputs.len(),
            "decoded {} values for {} params",
            values.len(),
            function.inputs.len()
        );

        let params = function
            .inputs
            .iter()
            .zip(values)
            .enumerate()
            .map(|(idx, (spec, value))| DecodedParam {
                name: match spec.name.trim() {
                    "" => format!("arg{idx}"),
                    name => name.to_string(),
                },
                kind: spec.kind.clone(),
                value: to_param_value(value),
            })
            .collect();

        Ok(DecodedMethod {
            function_name: function.name.clone(),
            signature: function.signature.clone(),
            params,
        })
    }
}

/// Decode the argument block as one tuple of the declared input types
fn decode_params(function: &FunctionSignature, encoded: &[u8]) -> Result<Vec<DynSolValue>> {
    let types = function
        .input_kinds()
        .map(|kind| {
            kind.parse::<DynSolType>()
                .with_context(|| format!("unsupported parameter type `{kind}`"))
        })
        .collect::<Result<Vec<_>>>()?;
    if types.is_empty() {
        return Ok(Vec::new());
    }

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(encoded)
        .with_context(|| format!("arguments do not decode as {}", function.signature))?;
    Ok(match decoded {
        DynSolValue::Tuple(values) => values,
        single => vec![single],
    })
}

fn to_param_value(value: DynSolValue) -> ParamValue {
    match value {
        DynSolValue::Address(address) => ParamValue::Address(address),
        DynSolValue::Uint(value, _) => ParamValue::Uint(value),
        DynSolValue::Int(value, _) => ParamValue::Int(value),
        DynSolValue::Bool(flag) => ParamValue::Bool(flag),
        DynSolValue::FixedBytes(word, size) => ParamValue::Bytes(word[..size.min(32)].to_vec()),
        DynSolValue::Function(pointer) => ParamValue::Bytes(pointer.to_vec()),
        DynSolValue::Bytes(bytes) => ParamValue::Bytes(bytes),
        DynSolValue::String(text) => ParamValue::Text(text),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            ParamValue::List(items.into_iter().map(to_param_value).collect())
        }
        DynSolValue::Tuple(fields) => {
            ParamValue::Tuple(fields.into_iter().map(to_param_value).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{ParamSpec, SignatureSource};
    use alloy_primitives::{address, U256};

    fn transfer_signature() -> FunctionSignature {
        FunctionSignature {
            selector: [0xa9, 0x05, 0x9c, 0xbb],
            name: "transfer".to_string(),
            signature: "transfer(address,uint256)".to_string(),
            inputs: vec![ParamSpec::new("to", "address"), ParamSpec::new("", "uint256")],
            source: SignatureSource::Builtin,
        }
    }

    #[test]
    fn test_decode_transfer() {
        let function = transfer_signature();

        let calldata = hex::decode(
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8"
        ).unwrap();

        let result = AlloyAbiDecoder::new()
            .decode_calldata(&function, &calldata)
            .unwrap();

        assert_eq!(result.function_name, "transfer");
        assert_eq!(result.params.len(), 2);
        assert_eq!(result.params[0].name, "to");
        assert_eq!(result.params[0].kind, "address");
        assert_eq!(
            result.params[0].value,
            ParamValue::Address(address!("1234567890123456789012345678901234567890"))
        );
        assert_eq!(result.params[1].name, "arg1");
        assert_eq!(result.params[1].value, ParamValue::Uint(U256::from(1000)));
    }

    #[test]
    fn test_selector_mismatch() {
        let function = transfer_signature();
        let calldata = hex::decode("deadbeef").unwrap();

        let result = AlloyAbiDecoder::new().decode_calldata(&function, &calldata);
        assert!(result.unwrap_err().to_string().contains("selector mismatch"));
    }

    #[test]
    fn test_truncated_params_fail() {
        let function = transfer_signature();
        // selector plus only the first word
        let calldata = hex::decode(
            "a9059cbb0000000000000000000000001234567890123456789012345678901234567890",
        )
        .unwrap();

        assert!(AlloyAbiDecoder::new()
            .decode_calldata(&function, &calldata)
            .is_err());
    }

    #[test]
    fn test_no_params() {
        let function = FunctionSignature {
            selector: [0xd0, 0xe3, 0x0d, 0xb0],
            name: "deposit".to_string(),
            signature: "deposit()".to_string(),
            inputs: vec![],
            source: SignatureSource::Builtin,
        };
        let decoded = AlloyAbiDecoder::new()
            .decode_calldata(&function, &[0xd0, 0xe3, 0x0d, 0xb0])
            .unwrap();
        assert!(decoded.params.is_empty());
    }
}
