//! Error types for the transfer workflow.

use std::fmt;

use thiserror::Error;

use crate::Amount;
use crate::account::StoreError;

use super::state::Stage;

/// Top-level error returned by [`TransferWorkflow`](super::TransferWorkflow) transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{action} is not allowed in the {stage} stage")]
    InvalidTransition { action: Action, stage: Stage },

    #[error("processing run {0} is no longer active")]
    StaleRun(u64),

    #[error("account unavailable: {0}")]
    Account(#[from] StoreError),
}

/// Form input rejected; the stage does not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),
    #[error("amount must be a positive whole number")]
    InvalidAmount,
    #[error("requested {requested} exceeds the deposit balance of {available}")]
    ExceedsDeposit { requested: Amount, available: Amount },
}

/// PIN rejected; the stage stays at PIN entry with the input cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("transaction PIN does not match")]
    PinMismatch,
}

/// Required fields of the transfer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    AccountNumber,
    Bank,
    OwnerName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Amount => "amount",
            Field::AccountNumber => "destination account number",
            Field::Bank => "destination bank",
            Field::OwnerName => "account owner name",
        };
        f.write_str(name)
    }
}

/// The transition being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Continue,
    Back,
    Confirm,
    EnterPin,
    SubmitPin,
    Tick,
    Resolve,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Edit => "edit",
            Action::Continue => "continue",
            Action::Back => "back",
            Action::Confirm => "confirm",
            Action::EnterPin => "enter pin",
            Action::SubmitPin => "submit pin",
            Action::Tick => "tick",
            Action::Resolve => "resolve",
        };
        f.write_str(name)
    }
}
