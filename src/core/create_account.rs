//! Create-account wizard wired to the account service
//!
//! Each creation type commits through one dependent chain of service calls.
//! The stage only advances once the whole chain has succeeded; any failure
//! re-enables the commit and is reported on the event channel.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::Result;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::services::AccountService;
use crate::domain::wizard::{
    AccountForm, Confirmation, CreateType, DialogAction, GethImportFields, NewAccountFields,
    Stage, WalletImportFields, WizardError, WizardState,
};

/// Name given to every account imported from geth
pub const GETH_IMPORT_NAME: &str = "Geth Import";

/// Notifications for the host UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// The wizard was closed and reset
    Closed,
    /// Accounts changed on the node
    Updated,
    /// A provisioning call failed
    Error { message: String },
}

/// An open create-account wizard
pub struct CreateAccount {
    state: WizardState,
    accounts: Arc<dyn AccountService>,
    events: Sender<WizardEvent>,
}

impl CreateAccount {
    pub fn new(accounts: Arc<dyn AccountService>, events: Sender<WizardEvent>) -> Self {
        Self {
            state: WizardState::new(),
            accounts,
            events,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn can_create(&self) -> bool {
        self.state.can_create()
    }

    pub fn steps(&self) -> [&'static str; 3] {
        self.state.steps()
    }

    pub fn actions(&self) -> Vec<DialogAction> {
        self.state.actions()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.state.confirmation()
    }

    pub fn select_type(&mut self, create_type: CreateType) -> Result<(), WizardError> {
        self.state.select_type(create_type)
    }

    pub fn next(&mut self) -> bool {
        self.state.next()
    }

    pub fn prev(&mut self) -> bool {
        self.state.prev()
    }

    pub fn on_change(&mut self, valid: bool, form: AccountForm) -> Result<(), WizardError> {
        self.state.on_change(valid, form)
    }

    /// Reset to the first page and tell the host
    pub fn close(&mut self) {
        self.state.close();
        let _ = self.events.send(WizardEvent::Closed);
    }

    /// Commit the current form
    ///
    /// Fails without side effects if the form is not ready. Provisioning
    /// failures are returned and also sent as [`WizardEvent::Error`].
    pub async fn create(&mut self) -> Result<(), WizardError> {
        let form = self.state.begin_create()?;
        debug!(create_type = form.create_type().as_str(), "creating account");

        let accounts = self.accounts.as_ref();
        let result = match &form {
            AccountForm::New(fields) => create_from_phrase(accounts, fields, &form).await,
            AccountForm::Geth(fields) => import_from_geth(accounts, fields).await,
            AccountForm::Import(fields) => create_from_wallet(accounts, fields, &form).await,
        };

        match result {
            Ok(confirmation) => {
                self.state.finish_create(confirmation);
                let _ = self.events.send(WizardEvent::Updated);
                Ok(())
            }
            Err(err) => {
                warn!("account creation failed: {err:#}");
                self.state.fail_create();
                let _ = self.events.send(WizardEvent::Error {
                    message: format!("{err:#}"),
                });
                Err(WizardError::Provisioning(err))
            }
        }
    }
}

async fn create_from_phrase(
    accounts: &dyn AccountService,
    fields: &NewAccountFields,
    form: &AccountForm,
) -> Result<Confirmation> {
    let address = accounts
        .new_account_from_phrase(&fields.phrase, &fields.password)
        .await?;
    name_account(accounts, address, &fields.name, form).await?;
    Ok(Confirmation::Account {
        address,
        name: fields.name.clone(),
        phrase: Some(fields.phrase.clone()),
    })
}

async fn create_from_wallet(
    accounts: &dyn AccountService,
    fields: &WalletImportFields,
    form: &AccountForm,
) -> Result<Confirmation> {
    let address = accounts
        .new_account_from_wallet(&fields.json, &fields.password)
        .await?;
    name_account(accounts, address, &fields.name, form).await?;
    Ok(Confirmation::Account {
        address,
        name: fields.name.clone(),
        phrase: None,
    })
}

async fn import_from_geth(
    accounts: &dyn AccountService,
    fields: &GethImportFields,
) -> Result<Confirmation> {
    let imported = accounts.import_geth_accounts(&fields.addresses).await?;
    debug!(requested = fields.addresses.len(), imported = imported.len(), "geth import");

    try_join_all(
        fields
            .addresses
            .iter()
            .map(|address| accounts.set_account_name(*address, GETH_IMPORT_NAME)),
    )
    .await?;

    Ok(Confirmation::Geth {
        addresses: fields.addresses.clone(),
    })
}

async fn name_account(
    accounts: &dyn AccountService,
    address: Address,
    name: &str,
    form: &AccountForm,
) -> Result<()> {
    accounts.set_account_name(address, name).await?;
    accounts.set_account_meta(address, &form.meta()).await
}
