//! Create-account wizard state machine

use alloy_primitives::Address;
use thiserror::Error;

use super::{AccountForm, CreateType};

const TITLE_TYPE: &str = "creation type";
const TITLE_CREATE: &str = "create account";
const TITLE_IMPORT: &str = "import wallet";
const TITLE_INFO: &str = "account information";

/// Wizard page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Selecting,
    Configuring,
    Confirming,
}

impl Stage {
    pub fn index(self) -> usize {
        match self {
            Stage::Selecting => 0,
            Stage::Configuring => 1,
            Stage::Confirming => 2,
        }
    }

    fn forward(self) -> Option<Self> {
        match self {
            Stage::Selecting => Some(Stage::Configuring),
            Stage::Configuring => Some(Stage::Confirming),
            Stage::Confirming => None,
        }
    }

    /// Once an account exists there is no way back into the form
    fn back(self) -> Option<Self> {
        match self {
            Stage::Configuring => Some(Stage::Selecting),
            Stage::Selecting | Stage::Confirming => None,
        }
    }
}

/// Buttons offered on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Cancel,
    Next,
    Back,
    /// Commit; labelled "Create" or "Import"
    Create { label: &'static str, enabled: bool },
    Close,
}

/// What the confirmation page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Account {
        address: Address,
        name: String,
        /// Only for freshly created accounts, so the user can back it up
        phrase: Option<String>,
    },
    Geth { addresses: Vec<Address> },
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("{action} is not available at stage {stage:?}")]
    WrongStage { action: &'static str, stage: Stage },
    #[error("no creation type selected")]
    NoCreationType,
    #[error("form for {got:?} does not match selected type {expected:?}")]
    FormMismatch { expected: CreateType, got: CreateType },
    #[error("account details are incomplete or invalid")]
    NotReady,
    #[error("account provisioning failed: {0:#}")]
    Provisioning(#[source] anyhow::Error),
}

/// State of one open wizard; discarded on close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    stage: Stage,
    create_type: Option<CreateType>,
    can_create: bool,
    form: Option<AccountForm>,
    confirmation: Option<Confirmation>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            stage: Stage::Selecting,
            create_type: None,
            can_create: false,
            form: None,
            confirmation: None,
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn create_type(&self) -> Option<CreateType> {
        self.create_type
    }

    pub fn can_create(&self) -> bool {
        self.can_create
    }

    pub fn form(&self) -> Option<&AccountForm> {
        self.form.as_ref()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Choose the creation type; a different type discards the current form
    pub fn select_type(&mut self, create_type: CreateType) -> Result<(), WizardError> {
        if self.stage != Stage::Selecting {
            return Err(WizardError::WrongStage {
                action: "select_type",
                stage: self.stage,
            });
        }
        if self.create_type != Some(create_type) {
            self.form = None;
            self.can_create = false;
        }
        self.create_type = Some(create_type);
        Ok(())
    }

    /// Leave `Selecting` for the form; returns whether the stage changed
    ///
    /// Requires a creation type. `Configuring` is only left through a
    /// successful create, so this is a no-op on the later pages.
    pub fn next(&mut self) -> bool {
        if self.stage != Stage::Selecting || self.create_type.is_none() {
            return false;
        }
        self.advance()
    }

    fn advance(&mut self) -> bool {
        match self.stage.forward() {
            Some(stage) => {
                self.stage = stage;
                true
            }
            None => false,
        }
    }

    /// Retreat one stage; returns whether the stage changed
    ///
    /// `Confirming` is terminal: the account already exists.
    pub fn prev(&mut self) -> bool {
        match self.stage.back() {
            Some(stage) => {
                self.stage = stage;
                true
            }
            None => false,
        }
    }

    /// Reset to the first page, discarding the form and any result
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Record a sub-form report
    pub fn on_change(&mut self, valid: bool, form: AccountForm) -> Result<(), WizardError> {
        let expected = self.create_type.ok_or(WizardError::NoCreationType)?;
        let got = form.create_type();
        if expected != got {
            return Err(WizardError::FormMismatch { expected, got });
        }
        self.can_create = valid;
        self.form = Some(form);
        Ok(())
    }

    /// Take the form for a commit, disabling further commits
    pub(crate) fn begin_create(&mut self) -> Result<AccountForm, WizardError> {
        if self.stage != Stage::Configuring {
            return Err(WizardError::WrongStage {
                action: "create",
                stage: self.stage,
            });
        }
        if !self.can_create {
            return Err(WizardError::NotReady);
        }
        let form = self.form.clone().ok_or(WizardError::NotReady)?;
        self.can_create = false;
        Ok(form)
    }

    /// The whole provisioning chain failed somewhere; allow a retry
    pub(crate) fn fail_create(&mut self) {
        self.can_create = true;
    }

    /// The whole provisioning chain succeeded
    pub(crate) fn finish_create(&mut self, confirmation: Confirmation) {
        self.confirmation = Some(confirmation);
        self.advance();
    }

    /// Step titles for the progress header
    pub fn steps(&self) -> [&'static str; 3] {
        let middle = match self.create_type {
            Some(CreateType::FromNew) => TITLE_CREATE,
            _ => TITLE_IMPORT,
        };
        [TITLE_TYPE, middle, TITLE_INFO]
    }

    /// Buttons for the current page
    pub fn actions(&self) -> Vec<DialogAction> {
        match self.stage {
            Stage::Selecting => vec![DialogAction::Cancel, DialogAction::Next],
            Stage::Configuring => {
                let label = match self.create_type {
                    Some(CreateType::FromNew) => "Create",
                    _ => "Import",
                };
                vec![
                    DialogAction::Cancel,
                    DialogAction::Back,
                    DialogAction::Create {
                        label,
                        enabled: self.can_create,
                    },
                ]
            }
            Stage::Confirming => vec![DialogAction::Close],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wizard::{GethImportFields, NewAccountFields};

    fn confirmed_geth() -> WizardState {
        let mut state = WizardState::new();
        state.select_type(CreateType::FromGeth).unwrap();
        state.next();
        state
            .on_change(true, AccountForm::Geth(GethImportFields::default()))
            .unwrap();
        state.begin_create().unwrap();
        state.finish_create(Confirmation::Geth {
            addresses: Vec::new(),
        });
        state
    }

    #[test]
    fn test_stage_stays_in_bounds() {
        let mut state = WizardState::new();
        assert!(!state.prev());
        assert_eq!(state.stage().index(), 0);

        state.select_type(CreateType::FromNew).unwrap();
        assert!(state.next());
        assert!(state.prev());
        assert!(!state.prev());
        assert_eq!(state.stage(), Stage::Selecting);

        let mut state = confirmed_geth();
        assert_eq!(state.stage().index(), 2);
        assert!(!state.next());
        assert_eq!(state.stage().index(), 2);
    }

    #[test]
    fn test_next_does_not_skip_provisioning() {
        let mut state = WizardState::new();
        state.select_type(CreateType::FromNew).unwrap();
        assert!(state.next());

        // neither an empty nor a valid form lets `next` leave the form page
        assert!(!state.next());
        state
            .on_change(true, AccountForm::New(NewAccountFields::default()))
            .unwrap();
        assert!(!state.next());

        assert_eq!(state.stage(), Stage::Configuring);
        assert!(state.can_create());
        assert!(state.confirmation().is_none());
    }

    #[test]
    fn test_confirming_is_terminal() {
        let mut state = confirmed_geth();
        assert_eq!(state.stage(), Stage::Confirming);

        assert!(!state.prev());
        assert_eq!(state.stage(), Stage::Confirming);
        assert!(!state.can_create());
        assert!(matches!(
            state.begin_create(),
            Err(WizardError::WrongStage { .. })
        ));
        assert_eq!(state.actions(), vec![DialogAction::Close]);
    }

    #[test]
    fn test_next_requires_type() {
        let mut state = WizardState::new();
        assert!(!state.next());
        assert_eq!(state.stage(), Stage::Selecting);
    }

    #[test]
    fn test_close_resets() {
        let mut state = WizardState::new();
        state.select_type(CreateType::FromGeth).unwrap();
        state.next();
        state
            .on_change(true, AccountForm::Geth(GethImportFields::default()))
            .unwrap();
        assert!(state.can_create());

        state.close();
        assert_eq!(state.stage(), Stage::Selecting);
        assert!(!state.can_create());
        assert!(state.form().is_none());
        assert!(state.create_type().is_none());
    }

    #[test]
    fn test_select_type_only_at_start() {
        let mut state = WizardState::new();
        state.select_type(CreateType::FromNew).unwrap();
        state.next();
        let err = state.select_type(CreateType::FromGeth).unwrap_err();
        assert!(matches!(err, WizardError::WrongStage { .. }));
        assert_eq!(state.create_type(), Some(CreateType::FromNew));
    }

    #[test]
    fn test_changing_type_discards_form() {
        let mut state = WizardState::new();
        state.select_type(CreateType::FromNew).unwrap();
        state
            .on_change(true, AccountForm::New(NewAccountFields::default()))
            .unwrap();

        state.select_type(CreateType::FromNew).unwrap();
        assert!(state.form().is_some());

        state.select_type(CreateType::FromImport).unwrap();
        assert!(state.form().is_none());
        assert!(!state.can_create());
    }

    #[test]
    fn test_form_must_match_type() {
        let mut state = WizardState::new();
        assert!(matches!(
            state.on_change(true, AccountForm::Geth(GethImportFields::default())),
            Err(WizardError::NoCreationType)
        ));

        state.select_type(CreateType::FromNew).unwrap();
        let err = state
            .on_change(true, AccountForm::Geth(GethImportFields::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::FormMismatch {
                expected: CreateType::FromNew,
                got: CreateType::FromGeth
            }
        ));
        assert!(!state.can_create());
    }

    #[test]
    fn test_actions_follow_stage() {
        let mut state = WizardState::new();
        assert_eq!(state.actions(), vec![DialogAction::Cancel, DialogAction::Next]);
        assert_eq!(state.steps()[1], TITLE_IMPORT);

        state.select_type(CreateType::FromNew).unwrap();
        state.next();
        assert_eq!(state.steps()[1], TITLE_CREATE);
        assert_eq!(
            state.actions()[2],
            DialogAction::Create {
                label: "Create",
                enabled: false
            }
        );

        state
            .on_change(true, AccountForm::New(NewAccountFields::default()))
            .unwrap();
        assert_eq!(
            state.actions()[2],
            DialogAction::Create {
                label: "Create",
                enabled: true
            }
        );
    }
}
