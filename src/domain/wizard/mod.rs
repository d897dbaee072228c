//! Account-creation wizard models

mod form;
mod state;

pub use form::{AccountForm, CreateType, GethImportFields, NewAccountFields, WalletImportFields};
pub use state::{Confirmation, DialogAction, Stage, WizardError, WizardState};
