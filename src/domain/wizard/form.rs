//! Sub-form payloads, one shape per creation type

use alloy_primitives::Address;

use crate::domain::services::AccountMeta;

/// How the new account is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateType {
    /// Fresh account from a recovery phrase
    FromNew,
    /// Accounts already in a geth keystore
    FromGeth,
    /// Encrypted wallet file
    FromImport,
}

impl CreateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreateType::FromNew => "fromNew",
            CreateType::FromGeth => "fromGeth",
            CreateType::FromImport => "fromImport",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAccountFields {
    pub name: String,
    pub password_hint: Option<String>,
    pub password: String,
    pub phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GethImportFields {
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletImportFields {
    pub name: String,
    pub password_hint: Option<String>,
    pub password: String,
    /// Encrypted wallet file contents
    pub json: String,
}

/// Fields reported by the active sub-form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountForm {
    New(NewAccountFields),
    Geth(GethImportFields),
    Import(WalletImportFields),
}

impl AccountForm {
    pub fn create_type(&self) -> CreateType {
        match self {
            AccountForm::New(_) => CreateType::FromNew,
            AccountForm::Geth(_) => CreateType::FromGeth,
            AccountForm::Import(_) => CreateType::FromImport,
        }
    }

    /// Metadata stored with the created account
    pub fn meta(&self) -> AccountMeta {
        let password_hint = match self {
            AccountForm::New(fields) => fields.password_hint.clone(),
            AccountForm::Import(fields) => fields.password_hint.clone(),
            AccountForm::Geth(_) => None,
        };
        AccountMeta { password_hint }
    }
}
