//! Human-readable descriptions of decoded transactions

use std::fmt;

use alloy_primitives::U256;

use super::format::{
    format_ether, format_integer, format_scaled, format_signed, AMOUNT_PLACES, ETHER_TAG,
};
use crate::domain::abi::{DecodedParam, ParamValue};
use crate::domain::tx::{AddressBook, Classification, DecodedCall, Transaction};

/// One rendered method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    /// Declared ABI type
    pub label: String,
    pub value: String,
    /// Uppercased book name for address params
    pub name: Option<String>,
}

/// Rendered description of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub action: String,
    pub inputs: Vec<InputLine>,
    pub gas: String,
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.action)?;
        for input in &self.inputs {
            match &input.name {
                Some(name) => writeln!(f, "  {}: {} ({})", input.label, input.value, name)?,
                None => writeln!(f, "  {}: {}", input.label, input.value)?,
            }
        }
        write!(f, "{}", self.gas)
    }
}

/// Pending vs. mined wording
#[derive(Debug, Clone, Copy)]
struct Tense {
    historic: bool,
}

impl Tense {
    fn pick<'a>(&self, historic: &'a str, pending: &'a str) -> &'a str {
        if self.historic {
            historic
        } else {
            pending
        }
    }
}

/// Render `call` for `transaction`, resolving names through `book`
pub fn describe(
    transaction: &Transaction,
    call: &DecodedCall,
    book: &AddressBook,
    historic: bool,
) -> Description {
    let tense = Tense { historic };
    let mut inputs = Vec::new();

    let action = match call.classification {
        Classification::Deploy => describe_deploy(transaction, tense),
        Classification::TokenTransfer => match describe_token(call, book, tense) {
            Some(action) => action,
            None => {
                inputs = render_inputs(call, book);
                describe_method(transaction, call, book, tense)
            }
        },
        Classification::KnownMethod => {
            inputs = render_inputs(call, book);
            describe_method(transaction, call, book, tense)
        }
        Classification::UnknownMethod => format!(
            "{} an unknown/unregistered method on the contract {}, transferring {}.",
            tense.pick("Executed", "Will execute"),
            recipient_name(transaction, book),
            format_ether(transaction.value),
        ),
        Classification::PlainReceipt => format!(
            "{} {} from {}{}",
            tense.pick("Received", "Will receive"),
            format_ether(transaction.value),
            contract_prefix(call),
            book.display_name(transaction.from),
        ),
        Classification::PlainTransfer => format!(
            "{} {} to {}{}",
            tense.pick("Transferred", "Will transfer"),
            format_ether(transaction.value),
            contract_prefix(call),
            recipient_name(transaction, book),
        ),
    };

    Description {
        action,
        inputs,
        gas: describe_gas(transaction, tense),
    }
}

fn describe_deploy(transaction: &Transaction, tense: Tense) -> String {
    if !tense.historic {
        return "Will deploy a contract.".to_string();
    }
    match transaction.creates {
        Some(address) => format!(
            "Deployed a contract at address {}.",
            address.to_checksum(None)
        ),
        None => "Deployed a contract.".to_string(),
    }
}

fn describe_token(call: &DecodedCall, book: &AddressBook, tense: Tense) -> Option<String> {
    let token = call.token.as_ref()?;
    let transfer = call.token_transfer()?;
    Some(format!(
        "{} {}{} to {}",
        tense.pick("Transferred", "Will transfer"),
        format_scaled(transfer.value, token.format, AMOUNT_PLACES),
        token.tag,
        book.display_name(transfer.to),
    ))
}

fn describe_method(
    transaction: &Transaction,
    call: &DecodedCall,
    book: &AddressBook,
    tense: Tense,
) -> String {
    format!(
        "{} the {} function on the contract {}, transferring {}, passing the following parameters:",
        tense.pick("Executed", "Will execute"),
        call.method_name.as_deref().unwrap_or("unknown"),
        recipient_name(transaction, book),
        format_ether(transaction.value),
    )
}

fn describe_gas(transaction: &Transaction, tense: Tense) -> String {
    format!(
        "{} {} gas ({}M/{}) for a total transaction cost of {}",
        tense.pick("Used", "Will use"),
        format_integer(transaction.gas),
        format_scaled(transaction.gas_price, U256::from(1_000_000u64), 0),
        ETHER_TAG,
        format_ether(transaction.fee()),
    )
}

fn contract_prefix(call: &DecodedCall) -> &'static str {
    if call.is_contract {
        "the contract "
    } else {
        ""
    }
}

fn recipient_name(transaction: &Transaction, book: &AddressBook) -> String {
    transaction
        .to
        .map(|address| book.display_name(address))
        .unwrap_or_else(|| "a new contract".to_string())
}

fn render_inputs(call: &DecodedCall, book: &AddressBook) -> Vec<InputLine> {
    call.inputs
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|param| render_input(param, book))
        .collect()
}

fn render_input(param: &DecodedParam, book: &AddressBook) -> InputLine {
    let name = match &param.value {
        ParamValue::Address(address) => book.get_account(*address).map(str::to_uppercase),
        _ => None,
    };
    InputLine {
        label: param.kind.clone(),
        value: render_value(&param.value),
        name,
    }
}

fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Address(address) => address.to_checksum(None),
        ParamValue::Uint(value) => format_integer(*value),
        ParamValue::Int(value) => format_signed(*value),
        ParamValue::Bool(value) => value.to_string(),
        ParamValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        ParamValue::Text(text) => text.clone(),
        ParamValue::List(items) => format!("[{}]", join_values(items)),
        ParamValue::Tuple(fields) => format!("({})", join_values(fields)),
    }
}

fn join_values(values: &[ParamValue]) -> String {
    values
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(", ")
}
