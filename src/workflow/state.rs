use std::fmt;

use crate::Amount;
use crate::model::{Bank, TransferKind, TransferRequest};

use super::error::{Field, ValidationError};

/// Stage of the guided transfer dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Form,
    Preview,
    PinEntry,
    Processing,
    Success,
    Failed,
}

impl Stage {
    /// Success and Failed are only left through a reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Success | Stage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Form => "form",
            Stage::Preview => "preview",
            Stage::PinEntry => "pin_entry",
            Stage::Processing => "processing",
            Stage::Success => "success",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable steps shown while the transfer is "processed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ProcessingStage {
    #[default]
    Preparing,
    LoadingData,
    Connecting,
    Forwarding,
    CheckingRequirements,
    AwaitingConfirmation,
    RequestingAuthorization,
}

impl ProcessingStage {
    pub const ALL: [ProcessingStage; 7] = [
        ProcessingStage::Preparing,
        ProcessingStage::LoadingData,
        ProcessingStage::Connecting,
        ProcessingStage::Forwarding,
        ProcessingStage::CheckingRequirements,
        ProcessingStage::AwaitingConfirmation,
        ProcessingStage::RequestingAuthorization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProcessingStage::Preparing => "Preparing transfer",
            ProcessingStage::LoadingData => "Loading transfer data",
            ProcessingStage::Connecting => "Connecting to the bank data server",
            ProcessingStage::Forwarding => "Forwarding data",
            ProcessingStage::CheckingRequirements => "Checking requirements",
            ProcessingStage::AwaitingConfirmation => "Waiting for server confirmation",
            ProcessingStage::RequestingAuthorization => "Requesting server authorization",
        }
    }
}

/// Progress of the simulated processing delay, counted in timer ticks.
///
/// Percent and label are derived from the tick count, so both are monotonic
/// and the percentage lands on exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressTracker {
    ticks: u32,
}

impl ProgressTracker {
    /// Ticks for a full 0 to 100% sweep.
    pub const TICKS: u32 = 60;

    /// Count one tick; returns `true` once the sweep is complete.
    pub fn advance(&mut self) -> bool {
        if self.ticks < Self::TICKS {
            self.ticks += 1;
        }
        self.is_complete()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_complete(&self) -> bool {
        self.ticks >= Self::TICKS
    }

    pub fn percent(&self) -> f64 {
        f64::from(self.ticks) * 100.0 / f64::from(Self::TICKS)
    }

    /// `floor(percent / 100 × N)` clamped to the last label.
    pub fn stage(&self) -> ProcessingStage {
        let count = ProcessingStage::ALL.len();
        let index = self.ticks as usize * count / Self::TICKS as usize;
        ProcessingStage::ALL[index.min(count - 1)]
    }
}

/// Why a processing run ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Savings below 1.5% of the deposit at completion time.
    Ineligible { shortfall: Amount },
    /// The deposit no longer covers the withdrawal at completion time.
    ExceedsDeposit { requested: Amount, available: Amount },
    /// The account could not be read at completion time.
    AccountUnavailable,
    /// The balance update was rejected before the outcome was shown.
    NotRecorded,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Ineligible { .. } => "ineligible",
            FailureReason::ExceedsDeposit { .. } => "exceeds_deposit",
            FailureReason::AccountUnavailable => "account_unavailable",
            FailureReason::NotRecorded => "not_recorded",
        }
    }
}

/// Result of a completed processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(FailureReason),
}

impl Outcome {
    pub fn stage(&self) -> Stage {
        match self {
            Outcome::Success => Stage::Success,
            Outcome::Failed(_) => Stage::Failed,
        }
    }

    /// Amount to top up, for the failure message.
    pub fn shortfall(&self) -> Option<Amount> {
        match self {
            Outcome::Failed(FailureReason::Ineligible { shortfall }) => Some(*shortfall),
            _ => None,
        }
    }
}

/// Raw field input of the transfer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Digits only.
    pub amount: String,
    pub account_number: String,
    pub bank: Option<Bank>,
    pub owner_name: String,
}

impl TransferForm {
    /// Keep only the digits, as the amount field does while typing.
    pub fn set_amount(&mut self, raw: &str) {
        self.amount = raw.chars().filter(char::is_ascii_digit).collect();
    }

    /// Fields that are still empty for a flow of this kind.
    pub fn missing(&self, kind: TransferKind) -> Vec<Field> {
        let mut missing = Vec::new();
        if self.amount.is_empty() {
            missing.push(Field::Amount);
        }
        if kind == TransferKind::ThirdParty {
            if self.account_number.is_empty() {
                missing.push(Field::AccountNumber);
            }
            if self.bank.is_none() {
                missing.push(Field::Bank);
            }
            if self.owner_name.is_empty() {
                missing.push(Field::OwnerName);
            }
        }
        missing
    }

    /// Turn the form into a request, reporting the first missing field.
    pub fn validate(&self, kind: TransferKind) -> Result<TransferRequest, ValidationError> {
        if let Some(field) = self.missing(kind).first() {
            return Err(ValidationError::MissingField(*field));
        }

        let units: i64 = self
            .amount
            .parse()
            .map_err(|_| ValidationError::InvalidAmount)?;
        if units <= 0 || units > i64::MAX / Amount::SCALE {
            return Err(ValidationError::InvalidAmount);
        }
        let amount = Amount::from_units(units);

        match (kind, self.bank) {
            (TransferKind::Withdrawal, _) => Ok(TransferRequest::Withdrawal { amount }),
            (TransferKind::ThirdParty, Some(bank)) => Ok(TransferRequest::ThirdParty {
                amount,
                account_number: self.account_number.clone(),
                bank,
                owner_name: self.owner_name.clone(),
            }),
            (TransferKind::ThirdParty, None) => Err(ValidationError::MissingField(Field::Bank)),
        }
    }
}

/// Per-dialog session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferSession {
    pub stage: Stage,
    pub pin_input: String,
    pub progress: ProgressTracker,
    pub outcome: Option<Outcome>,
    /// Identifies the processing run a timer belongs to.
    pub epoch: u64,
}
