use alloy_primitives::{Address, Bytes, U256};

/// A transaction as shown to the user, pending or mined
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub gas: U256,
    pub gas_price: U256,
    pub input: Bytes,
    /// Address of the deployed contract, once mined
    pub creates: Option<Address>,
}

impl Transaction {
    /// Whether `address` is the recipient of this transaction
    pub fn is_received_by(&self, address: Address) -> bool {
        self.to == Some(address)
    }

    /// The other side of the transaction as seen from `address`
    pub fn counterparty(&self, address: Address) -> Option<Address> {
        if self.is_received_by(address) {
            Some(self.from)
        } else {
            self.to
        }
    }

    /// Split input into selector and parameter bytes
    ///
    /// Returns `None` when the input is shorter than a selector.
    pub fn selector_and_params(&self) -> Option<([u8; 4], &[u8])> {
        let selector: [u8; 4] = self.input.get(..4)?.try_into().ok()?;
        Some((selector, &self.input[4..]))
    }

    /// Total fee ceiling (`gas * gas_price`)
    pub fn fee(&self) -> U256 {
        self.gas.saturating_mul(self.gas_price)
    }
}
