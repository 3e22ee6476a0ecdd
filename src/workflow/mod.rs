//! Guided transfer state machine.
//!
//! Drives a dialog from data entry to a terminal outcome:
//! Form → Preview → PinEntry → Processing → Success | Failed.
//! Every UI event is an explicit transition. The processing delay is counted
//! in ticks handed in from outside (see [`crate::dialog`]), and the outcome is
//! a pure function of the account at completion time ([`decide`]).

use tracing::{debug, info, warn};

use crate::Amount;
use crate::eligibility;
use crate::model::{Account, Bank, TransferKind, TransferRequest};
use crate::session::TransactionPin;

mod state;
pub use state::{
    FailureReason, Outcome, ProcessingStage, ProgressTracker, Stage, TransferForm, TransferSession,
};

mod error;
pub use error::{Action, AuthorizationError, Field, ValidationError, WorkflowError};

/// UI events accepted by [`TransferWorkflow::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SetAmount(String),
    SetAccountNumber(String),
    SelectBank(Bank),
    SetOwnerName(String),
    /// Form → Preview.
    Continue,
    /// Preview → Form, PinEntry → Preview.
    Back,
    /// Preview → PinEntry.
    Confirm,
    EnterPin(String),
    /// PinEntry → Processing when the PIN matches.
    SubmitPin,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::SetAmount(_) => "set amount",
            Event::SetAccountNumber(_) => "set account number",
            Event::SelectBank(_) => "select bank",
            Event::SetOwnerName(_) => "set owner name",
            Event::Continue => "continue",
            Event::Back => "back",
            Event::Confirm => "confirm",
            Event::EnterPin(_) => "enter pin",
            Event::SubmitPin => "submit pin",
        }
    }
}

/// The transfer dialog state machine.
#[derive(Debug)]
pub struct TransferWorkflow {
    kind: TransferKind,
    pin: TransactionPin,
    form: TransferForm,
    /// Set once the form validates; cleared when going back to the form.
    request: Option<TransferRequest>,
    session: TransferSession,
    /// Last epoch handed out, never reused across resets.
    last_epoch: u64,
}

/// Public API
impl TransferWorkflow {
    pub fn new(kind: TransferKind, pin: TransactionPin) -> Self {
        Self {
            kind,
            pin,
            form: TransferForm::default(),
            request: None,
            session: TransferSession::default(),
            last_epoch: 0,
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.session.stage
    }

    pub fn form(&self) -> &TransferForm {
        &self.form
    }

    pub fn request(&self) -> Option<&TransferRequest> {
        self.request.as_ref()
    }

    pub fn pin_input(&self) -> &str {
        &self.session.pin_input
    }

    pub fn progress(&self) -> f64 {
        self.session.progress.percent()
    }

    pub fn processing_stage(&self) -> ProcessingStage {
        self.session.progress.stage()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.session.outcome
    }

    /// Epoch of the current processing run.
    pub fn epoch(&self) -> u64 {
        self.session.epoch
    }

    /// Start over as a fresh dialog of `kind`.
    pub fn open(&mut self, kind: TransferKind) {
        self.kind = kind;
        self.reset();
    }

    /// Discard all input and progress and return to the form.
    ///
    /// Bumps the epoch, so ticks from an earlier processing run are rejected.
    pub fn reset(&mut self) {
        self.form = TransferForm::default();
        self.request = None;
        self.session = TransferSession {
            epoch: self.next_epoch(),
            ..TransferSession::default()
        };
        debug!(kind = %self.kind, epoch = self.session.epoch, "workflow reset");
    }

    /// Apply a single UI event on top of the current state.
    ///
    /// `account` is the live balance snapshot, used by the withdrawal checks.
    pub fn apply(&mut self, event: Event, account: &Account) -> Result<Stage, WorkflowError> {
        let name = event.name();
        let result = match event {
            Event::SetAmount(raw) => self.set_amount(&raw),
            Event::SetAccountNumber(value) => self.set_account_number(value),
            Event::SelectBank(bank) => self.select_bank(bank),
            Event::SetOwnerName(value) => self.set_owner_name(value),
            Event::Continue => self.continue_to_preview(account),
            Event::Back => self.back(),
            Event::Confirm => self.confirm(account),
            Event::EnterPin(input) => self.enter_pin(input),
            Event::SubmitPin => self.submit_pin(account).map(|_| ()),
        };
        self.log_result(name, &result);
        result.map(|()| self.stage())
    }

    pub fn set_amount(&mut self, raw: &str) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Edit, Stage::Form)?;
        self.form.set_amount(raw);
        Ok(())
    }

    pub fn set_account_number(&mut self, value: impl Into<String>) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Edit, Stage::Form)?;
        self.form.account_number = value.into();
        Ok(())
    }

    pub fn select_bank(&mut self, bank: Bank) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Edit, Stage::Form)?;
        self.form.bank = Some(bank);
        Ok(())
    }

    pub fn set_owner_name(&mut self, value: impl Into<String>) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Edit, Stage::Form)?;
        self.form.owner_name = value.into();
        Ok(())
    }

    /// Form → Preview:
    /// - Ensure every required field is filled and the amount is positive
    /// - For withdrawals, ensure the deposit covers the amount
    pub fn continue_to_preview(&mut self, account: &Account) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Continue, Stage::Form)?;
        let request = self.form.validate(self.kind)?;
        Self::check_deposit_covers(&request, account)?;
        self.request = Some(request);
        self.session.stage = Stage::Preview;
        Ok(())
    }

    /// Preview → Form, PinEntry → Preview.
    pub fn back(&mut self) -> Result<(), WorkflowError> {
        match self.session.stage {
            Stage::Preview => {
                self.request = None;
                self.session.stage = Stage::Form;
            }
            Stage::PinEntry => {
                self.session.pin_input.clear();
                self.session.stage = Stage::Preview;
            }
            stage => {
                return Err(WorkflowError::InvalidTransition {
                    action: Action::Back,
                    stage,
                });
            }
        }
        Ok(())
    }

    /// Preview → PinEntry.
    pub fn confirm(&mut self, account: &Account) -> Result<(), WorkflowError> {
        self.expect_stage(Action::Confirm, Stage::Preview)?;
        self.check_request_against(account)?;
        self.session.stage = Stage::PinEntry;
        Ok(())
    }

    pub fn enter_pin(&mut self, input: impl Into<String>) -> Result<(), WorkflowError> {
        self.expect_stage(Action::EnterPin, Stage::PinEntry)?;
        self.session.pin_input = input.into();
        Ok(())
    }

    /// PinEntry → Processing:
    /// - For withdrawals, re-check that the deposit covers the amount
    /// - Compare the entered PIN with the session PIN; on mismatch clear the
    ///   input and stay
    /// - Start a new processing run and return its epoch
    pub fn submit_pin(&mut self, account: &Account) -> Result<u64, WorkflowError> {
        self.expect_stage(Action::SubmitPin, Stage::PinEntry)?;
        self.check_request_against(account)?;

        if !self.pin.matches(&self.session.pin_input) {
            self.session.pin_input.clear();
            warn!(kind = %self.kind, "transaction PIN rejected");
            return Err(AuthorizationError::PinMismatch.into());
        }

        self.session.pin_input.clear();
        self.session.progress = ProgressTracker::default();
        self.session.outcome = None;
        self.session.epoch = self.next_epoch();
        self.session.stage = Stage::Processing;
        Ok(self.session.epoch)
    }

    /// One progress tick of processing run `epoch`.
    ///
    /// Returns `true` once progress has reached 100%.
    pub fn advance(&mut self, epoch: u64) -> Result<bool, WorkflowError> {
        self.expect_run(Action::Tick, epoch)?;
        let complete = self.session.progress.advance();
        debug!(
            epoch,
            progress = self.progress(),
            label = self.processing_stage().label(),
            "processing tick"
        );
        Ok(complete)
    }

    /// Processing → Success | Failed, as one step.
    pub fn resolve(&mut self, epoch: u64, outcome: Outcome) -> Result<Stage, WorkflowError> {
        self.expect_run(Action::Resolve, epoch)?;
        if !self.session.progress.is_complete() {
            return Err(WorkflowError::InvalidTransition {
                action: Action::Resolve,
                stage: Stage::Processing,
            });
        }
        self.session.outcome = Some(outcome);
        self.session.stage = outcome.stage();
        match outcome {
            Outcome::Success => info!(kind = %self.kind, epoch, "transfer succeeded"),
            Outcome::Failed(reason) => info!(
                kind = %self.kind,
                epoch,
                reason = reason.as_str(),
                shortfall = ?outcome.shortfall(),
                "transfer failed"
            ),
        }
        Ok(self.session.stage)
    }

    /// Amount to top up, once the run failed on the eligibility rule.
    pub fn shortfall(&self) -> Option<Amount> {
        self.session.outcome.and_then(|outcome| outcome.shortfall())
    }
}

/// Decide the outcome of a completed run from the account at completion time.
pub fn decide(request: &TransferRequest, account: &Account) -> Outcome {
    if let Err(ineligible) = eligibility::assess(account) {
        return Outcome::Failed(FailureReason::Ineligible {
            shortfall: ineligible.shortfall,
        });
    }
    if let TransferRequest::Withdrawal { amount } = request {
        if *amount > account.deposit {
            return Outcome::Failed(FailureReason::ExceedsDeposit {
                requested: *amount,
                available: account.deposit,
            });
        }
    }
    Outcome::Success
}

/// Private API
impl TransferWorkflow {
    fn next_epoch(&mut self) -> u64 {
        self.last_epoch += 1;
        self.last_epoch
    }

    fn expect_stage(&self, action: Action, expected: Stage) -> Result<(), WorkflowError> {
        if self.session.stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                action,
                stage: self.session.stage,
            })
        }
    }

    fn expect_run(&self, action: Action, epoch: u64) -> Result<(), WorkflowError> {
        if epoch != self.session.epoch {
            return Err(WorkflowError::StaleRun(epoch));
        }
        self.expect_stage(action, Stage::Processing)
    }

    fn check_request_against(&self, account: &Account) -> Result<(), WorkflowError> {
        match &self.request {
            Some(request) => Ok(Self::check_deposit_covers(request, account)?),
            // Preview and PinEntry are only reachable with a validated request
            None => Err(WorkflowError::InvalidTransition {
                action: Action::Confirm,
                stage: self.session.stage,
            }),
        }
    }

    fn check_deposit_covers(
        request: &TransferRequest,
        account: &Account,
    ) -> Result<(), ValidationError> {
        match request {
            TransferRequest::Withdrawal { amount } if *amount > account.deposit => {
                Err(ValidationError::ExceedsDeposit {
                    requested: *amount,
                    available: account.deposit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Small helper to log `apply` results
    fn log_result(&self, event: &str, result: &Result<(), WorkflowError>) {
        match result {
            Ok(()) => {
                info!(kind = %self.kind, stage = %self.session.stage, "{event} applied");
            }
            Err(e) => {
                info!(
                    kind = %self.kind,
                    stage = %self.session.stage,
                    reason = %e,
                    "{event} rejected"
                );
            }
        }
    }
}
