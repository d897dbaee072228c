//! Address name resolution

use std::collections::HashMap;

use alloy_primitives::Address;

use super::KnownToken;

/// Everything the user has a name for
///
/// Lookups check accounts, contacts, tokens, then contracts; the first
/// match wins.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    pub accounts: HashMap<Address, String>,
    pub contacts: HashMap<Address, String>,
    pub tokens: HashMap<Address, KnownToken>,
    pub contracts: HashMap<Address, String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, token: KnownToken) {
        self.tokens.insert(token.address, token);
    }

    pub fn token(&self, address: Address) -> Option<&KnownToken> {
        self.tokens.get(&address)
    }

    /// Stored name for an address, first match wins
    pub fn get_account(&self, address: Address) -> Option<&str> {
        self.accounts
            .get(&address)
            .or_else(|| self.contacts.get(&address))
            .map(String::as_str)
            .or_else(|| self.tokens.get(&address).map(|token| token.name.as_str()))
            .or_else(|| self.contracts.get(&address).map(String::as_str))
    }

    /// Uppercased name, falling back to the checksummed address
    pub fn display_name(&self, address: Address) -> String {
        self.get_account(address)
            .map(str::to_uppercase)
            .unwrap_or_else(|| address.to_checksum(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};

    const ADDR: Address = address!("00000000000000000000000000000000000000aa");

    #[test]
    fn test_accounts_win_over_contacts() {
        let mut book = AddressBook::new();
        book.contacts.insert(ADDR, "bob".to_string());
        book.accounts.insert(ADDR, "main".to_string());

        assert_eq!(book.get_account(ADDR), Some("main"));
        assert_eq!(book.display_name(ADDR), "MAIN");
    }

    #[test]
    fn test_precedence_order() {
        let mut book = AddressBook::new();
        book.contracts.insert(ADDR, "registry".to_string());
        assert_eq!(book.get_account(ADDR), Some("registry"));

        book.add_token(KnownToken::new(ADDR, "Token", "TOK", U256::from(100)));
        assert_eq!(book.get_account(ADDR), Some("Token"));

        book.contacts.insert(ADDR, "bob".to_string());
        assert_eq!(book.get_account(ADDR), Some("bob"));
    }

    #[test]
    fn test_fallback_to_address() {
        let book = AddressBook::new();
        assert_eq!(book.get_account(ADDR), None);
        assert_eq!(book.display_name(ADDR), ADDR.to_checksum(None));
    }
}
