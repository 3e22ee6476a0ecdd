//! Async driver for the transfer dialog.
//!
//! Owns a [`TransferWorkflow`] and runs the simulated processing delay on a
//! tokio timer. When the progress sweep completes, the live account is re-read,
//! the outcome is decided and resolved in one step, and successful withdrawals
//! are recorded through the [`AccountStore`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, warn};

use crate::account::AccountStore;
use crate::config::{Config, SettlementOrder, Timing};
use crate::model::{TransferKind, TransferRequest};
use crate::session::TransactionPin;
use crate::workflow::{
    self, Event, FailureReason, Outcome, ProcessingStage, Stage, TransferWorkflow, WorkflowError,
};

/// Commands accepted by [`TransferDialog::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(TransferKind),
    Event(Event),
    /// Wait for an in-flight processing run to finish.
    Wait,
    Close,
}

/// What the dialog currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogView {
    pub kind: TransferKind,
    pub stage: Stage,
    pub progress: f64,
    pub processing_stage: ProcessingStage,
    pub outcome: Option<Outcome>,
}

impl DialogView {
    pub fn label(&self) -> &'static str {
        self.processing_stage.label()
    }
}

/// Handle on the spawned progress timer.
///
/// At most one timer is alive; cancelling is idempotent.
#[derive(Debug, Default)]
struct ProcessingTimer {
    handle: Option<JoinHandle<()>>,
}

impl ProcessingTimer {
    fn start(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.cancel();
        self.handle = Some(tokio::spawn(task));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("processing timer cancelled");
        }
    }

    async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!(reason = %e, "processing timer failed");
                }
            }
        }
    }
}

impl Drop for ProcessingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Everything the timer task needs, cloned out of the dialog.
#[derive(Clone)]
struct Processor {
    workflow: Arc<Mutex<TransferWorkflow>>,
    account: Arc<dyn AccountStore>,
    timing: Timing,
    settlement: SettlementOrder,
}

pub struct TransferDialog {
    processor: Processor,
    timer: ProcessingTimer,
}

/// Public API
impl TransferDialog {
    pub fn new(account: Arc<dyn AccountStore>, pin: TransactionPin, config: &Config) -> Self {
        let workflow = TransferWorkflow::new(TransferKind::ThirdParty, pin);
        Self {
            processor: Processor {
                workflow: Arc::new(Mutex::new(workflow)),
                account,
                timing: config.timing,
                settlement: config.settlement,
            },
            timer: ProcessingTimer::default(),
        }
    }

    /// Open a fresh dialog of `kind`, discarding any previous session.
    pub async fn open(&mut self, kind: TransferKind) {
        let mut workflow = self.processor.workflow.lock().await;
        workflow.open(kind);
        self.timer.cancel();
    }

    /// Close the dialog and reset it to the initial state.
    ///
    /// A settlement already under way is allowed to finish first; the timer is
    /// stopped once the reset has made its run stale.
    pub async fn close(&mut self) {
        let mut workflow = self.processor.workflow.lock().await;
        workflow.reset();
        self.timer.cancel();
    }

    /// Apply a UI event against the live account.
    ///
    /// Starts the progress timer when the event moves the dialog into
    /// processing.
    pub async fn apply(&mut self, event: Event) -> Result<Stage, WorkflowError> {
        let account = match self.processor.account.current().await {
            Ok(account) => account,
            Err(e) => {
                warn!(event = ?event, reason = %e, "account unavailable, event rejected");
                return Err(e.into());
            }
        };
        let (stage, epoch) = {
            let mut workflow = self.processor.workflow.lock().await;
            let stage = workflow.apply(event, &account)?;
            (stage, workflow.epoch())
        };

        // only a successful PIN submit returns Processing
        if stage == Stage::Processing {
            let processor = self.processor.clone();
            self.timer.start(async move { processor.drive(epoch).await });
        }
        Ok(stage)
    }

    pub async fn view(&self) -> DialogView {
        let workflow = self.processor.workflow.lock().await;
        DialogView {
            kind: workflow.kind(),
            stage: workflow.stage(),
            progress: workflow.progress(),
            processing_stage: workflow.processing_stage(),
            outcome: workflow.outcome(),
        }
    }

    /// Wait until the current processing run, if any, has finished.
    pub async fn settled(&mut self) {
        self.timer.join().await;
    }

    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::Open(kind) => self.open(kind).await,
            Command::Event(event) => {
                // rejected events leave the dialog as it was, keep going
                let _ = self.apply(event).await;
            }
            Command::Wait => self.settled().await,
            Command::Close => self.close().await,
        }
    }

    /// Run the dialog with the given command stream.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            self.execute(command).await;
        }
    }
}

impl Processor {
    /// Tick until the sweep completes, then settle run `epoch`.
    async fn drive(self, epoch: u64) {
        let tick = self.timing.tick();
        let mut ticker = time::interval_at(Instant::now() + tick, tick);

        let request = loop {
            ticker.tick().await;
            let mut workflow = self.workflow.lock().await;
            match workflow.advance(epoch) {
                Ok(false) => {}
                Ok(true) => match workflow.request() {
                    Some(request) => break request.clone(),
                    None => {
                        error!(epoch, "processing run has no request");
                        return;
                    }
                },
                Err(e) => {
                    debug!(epoch, reason = %e, "processing timer stopped");
                    return;
                }
            }
        };

        time::sleep(self.timing.settle()).await;
        self.settle(epoch, &request).await;
    }

    /// Decide and resolve the outcome from the account as it is now.
    ///
    /// The workflow stays locked from the epoch check until the run is
    /// resolved, so a close either discards the run before any balance moves or
    /// waits until its outcome is in place.
    async fn settle(&self, epoch: u64, request: &TransferRequest) {
        let outcome = match self.account.current().await {
            Ok(account) => workflow::decide(request, &account),
            Err(e) => {
                error!(epoch, reason = %e, "account unavailable at completion");
                Outcome::Failed(FailureReason::AccountUnavailable)
            }
        };

        let mut workflow = self.workflow.lock().await;
        if workflow.epoch() != epoch || workflow.stage() != Stage::Processing {
            debug!(epoch, "outcome discarded");
            return;
        }

        match self.settlement {
            SettlementOrder::OutcomeFirst => {
                Self::resolve(&mut workflow, epoch, outcome);
                if outcome == Outcome::Success {
                    // the outcome stands even if recording fails
                    self.record(request).await;
                }
            }
            SettlementOrder::RecordFirst => {
                let outcome = if outcome == Outcome::Success && !self.record(request).await {
                    Outcome::Failed(FailureReason::NotRecorded)
                } else {
                    outcome
                };
                Self::resolve(&mut workflow, epoch, outcome);
            }
        }
    }

    fn resolve(workflow: &mut TransferWorkflow, epoch: u64, outcome: Outcome) {
        if let Err(e) = workflow.resolve(epoch, outcome) {
            debug!(epoch, reason = %e, "outcome discarded");
        }
    }

    /// Apply the balance change of a successful withdrawal to the latest
    /// balances.
    ///
    /// Returns whether the change was recorded.
    async fn record(&self, request: &TransferRequest) -> bool {
        let TransferRequest::Withdrawal { amount } = request else {
            // no destination ledger for third-party transfers
            return true;
        };
        let account = match self.account.current().await {
            Ok(account) => account,
            Err(e) => {
                error!(amount = %amount, reason = %e, "failed to record withdrawal");
                return false;
            }
        };
        let Some(updated) = account.withdraw_deposit(*amount) else {
            warn!(amount = %amount, deposit = %account.deposit, "withdrawal no longer covered");
            return false;
        };
        match self
            .account
            .set_balances(updated.savings, updated.deposit)
            .await
        {
            Ok(()) => {
                debug!(
                    savings = %updated.savings,
                    deposit = %updated.deposit,
                    "withdrawal recorded"
                );
                true
            }
            Err(e) => {
                error!(amount = %amount, reason = %e, "failed to record withdrawal");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::Amount;
    use crate::account::{Ledger, StoreError};
    use crate::model::{Account, BalanceKind, Bank};

    const PIN: &str = "112233";

    // test utils

    fn units(value: i64) -> Amount {
        Amount::from_units(value)
    }

    /// Store whose reads and writes can be made to fail or stall.
    #[derive(Default)]
    struct TestStore {
        account: std::sync::Mutex<Account>,
        fail_reads: bool,
        fail_writes: bool,
        write_delay: Duration,
    }

    impl TestStore {
        fn new(account: Account, fail_writes: bool) -> Arc<Self> {
            Arc::new(Self {
                account: std::sync::Mutex::new(account),
                fail_writes,
                ..Self::default()
            })
        }

        fn snapshot(&self) -> Account {
            *self.account.lock().unwrap()
        }
    }

    #[async_trait]
    impl AccountStore for TestStore {
        async fn current(&self) -> Result<Account, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Unavailable("read rejected".to_string()));
            }
            Ok(self.snapshot())
        }

        async fn set_balances(&self, savings: Amount, deposit: Amount) -> Result<(), StoreError> {
            time::sleep(self.write_delay).await;
            if self.fail_writes {
                return Err(StoreError::Unavailable("write rejected".to_string()));
            }
            *self.account.lock().unwrap() = Account::new(savings, deposit);
            Ok(())
        }
    }

    fn dialog_with(store: Arc<dyn AccountStore>, settlement: SettlementOrder) -> TransferDialog {
        let config = Config {
            settlement,
            ..Config::default()
        };
        TransferDialog::new(store, TransactionPin::new(PIN), &config)
    }

    fn dialog(account: Account) -> TransferDialog {
        dialog_with(TestStore::new(account, false), SettlementOrder::OutcomeFirst)
    }

    async fn submit_transfer(dialog: &mut TransferDialog) -> Stage {
        dialog.open(TransferKind::ThirdParty).await;
        for event in [
            Event::SetAmount("250000".to_string()),
            Event::SetAccountNumber("1234567890".to_string()),
            Event::SelectBank(Bank::Bni),
            Event::SetOwnerName("Dewi Lestari".to_string()),
            Event::Continue,
            Event::Confirm,
            Event::EnterPin(PIN.to_string()),
        ] {
            dialog.apply(event).await.unwrap();
        }
        dialog.apply(Event::SubmitPin).await.unwrap()
    }

    async fn submit_withdrawal(dialog: &mut TransferDialog, amount: &str) -> Stage {
        dialog.open(TransferKind::Withdrawal).await;
        for event in [
            Event::SetAmount(amount.to_string()),
            Event::Continue,
            Event::Confirm,
            Event::EnterPin(PIN.to_string()),
        ] {
            dialog.apply(event).await.unwrap();
        }
        dialog.apply(Event::SubmitPin).await.unwrap()
    }

    // End-to-end

    #[tokio::test(start_paused = true)]
    async fn eligible_transfer_succeeds() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        assert_eq!(submit_transfer(&mut dialog).await, Stage::Processing);

        dialog.settled().await;

        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Success);
        assert_eq!(view.progress, 100.0);
        assert_eq!(view.label(), "Requesting server authorization");
        assert_eq!(view.outcome, Some(Outcome::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn ineligible_transfer_fails_with_shortfall() {
        let mut dialog = dialog(Account::new(units(1_000_000), units(245_300_000)));
        submit_transfer(&mut dialog).await;

        dialog.settled().await;

        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Failed);
        assert_eq!(view.outcome.and_then(|o| o.shortfall()), Some(units(2_679_500)));
    }

    #[tokio::test(start_paused = true)]
    async fn processing_takes_sixty_ticks_plus_settle() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        let started = Instant::now();
        submit_transfer(&mut dialog).await;

        time::sleep(Duration::from_millis(30_500)).await;
        let halfway = dialog.view().await;
        assert_eq!(halfway.stage, Stage::Processing);
        assert_eq!(halfway.progress, 50.0);

        time::sleep(Duration::from_millis(29_700)).await;
        let full = dialog.view().await;
        assert_eq!(full.progress, 100.0);
        // settle delay still running
        assert_eq!(full.stage, Stage::Processing);

        dialog.settled().await;
        assert_eq!(dialog.view().await.stage, Stage::Success);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(60_500));
        assert!(elapsed < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_monotonic_while_processing() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        submit_transfer(&mut dialog).await;

        let mut last = dialog.view().await;
        for _ in 0..70 {
            time::sleep(Duration::from_millis(1_000)).await;
            let view = dialog.view().await;
            assert!(view.progress >= last.progress);
            assert!(view.progress <= 100.0);
            assert!(view.processing_stage >= last.processing_stage);
            last = view;
        }
        assert_eq!(last.stage, Stage::Success);
        assert_eq!(last.progress, 100.0);
    }

    // PIN

    #[tokio::test(start_paused = true)]
    async fn wrong_pin_never_starts_the_timer() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        dialog.open(TransferKind::Withdrawal).await;
        dialog.apply(Event::SetAmount("10".to_string())).await.unwrap();
        dialog.apply(Event::Continue).await.unwrap();
        dialog.apply(Event::Confirm).await.unwrap();
        dialog.apply(Event::EnterPin("000000".to_string())).await.unwrap();

        let result = dialog.apply(Event::SubmitPin).await;
        assert!(matches!(result, Err(WorkflowError::Authorization(_))));

        time::sleep(Duration::from_secs(120)).await;
        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::PinEntry);
        assert_eq!(view.progress, 0.0);
    }

    // Cancellation

    #[tokio::test(start_paused = true)]
    async fn close_mid_processing_stops_the_timer() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        submit_transfer(&mut dialog).await;

        time::sleep(Duration::from_millis(10_500)).await;
        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Processing);
        assert!(view.progress > 0.0);

        dialog.close().await;
        let closed = dialog.view().await;
        assert_eq!(closed.stage, Stage::Form);
        assert_eq!(closed.progress, 0.0);

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(dialog.view().await, closed);

        // reopening starts a fresh session
        dialog.open(TransferKind::ThirdParty).await;
        let reopened = dialog.view().await;
        assert_eq!(reopened.stage, Stage::Form);
        assert_eq!(reopened.progress, 0.0);
        assert_eq!(reopened.outcome, None);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_processing_leaves_one_timer() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        submit_transfer(&mut dialog).await;
        time::sleep(Duration::from_millis(20_500)).await;

        // reopen and submit again: the first run must not keep ticking
        submit_transfer(&mut dialog).await;
        time::sleep(Duration::from_millis(10_500)).await;
        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Processing);
        assert!((view.progress - 10.0 * 100.0 / 60.0).abs() < 1e-9);

        dialog.settled().await;
        assert_eq!(dialog.view().await.stage, Stage::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_dialog_cancels_the_timer() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::OutcomeFirst);
        submit_withdrawal(&mut dialog, "500000").await;
        drop(dialog);

        time::sleep(Duration::from_secs(120)).await;
        // the withdrawal was never recorded
        assert_eq!(store.snapshot().deposit, units(1_500_000));
    }

    // Completion-time snapshot

    #[tokio::test(start_paused = true)]
    async fn top_up_during_processing_flips_the_outcome() {
        let ledger = Arc::new(Ledger::new());
        let user = ledger
            .insert(
                "Siti",
                "1",
                Account::new(units(1_000_000), units(245_300_000)),
            )
            .await;
        let mut dialog = dialog_with(Arc::new(ledger.handle(user)), SettlementOrder::OutcomeFirst);
        submit_transfer(&mut dialog).await;

        time::sleep(Duration::from_secs(30)).await;
        ledger
            .credit(user, BalanceKind::Savings, units(2_679_500))
            .await
            .unwrap();

        dialog.settled().await;
        assert_eq!(dialog.view().await.stage, Stage::Success);
    }

    // Withdrawal settlement

    #[tokio::test(start_paused = true)]
    async fn successful_withdrawal_moves_deposit_to_savings() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::OutcomeFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        dialog.settled().await;

        assert_eq!(dialog.view().await.stage, Stage::Success);
        assert_eq!(
            store.snapshot(),
            Account::new(units(3_500_000), units(1_000_000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_withdrawal_leaves_balances_alone() {
        let store = TestStore::new(Account::new(units(1_000_000), units(245_300_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::OutcomeFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        dialog.settled().await;

        assert_eq!(dialog.view().await.stage, Stage::Failed);
        assert_eq!(
            store.snapshot(),
            Account::new(units(1_000_000), units(245_300_000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn third_party_transfer_does_not_touch_balances() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::OutcomeFirst);
        submit_transfer(&mut dialog).await;

        dialog.settled().await;

        assert_eq!(dialog.view().await.stage, Stage::Success);
        assert_eq!(
            store.snapshot(),
            Account::new(units(3_000_000), units(1_500_000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn outcome_first_keeps_success_when_recording_fails() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), true);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::OutcomeFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        dialog.settled().await;

        assert_eq!(dialog.view().await.stage, Stage::Success);
        assert_eq!(store.snapshot().deposit, units(1_500_000));
    }

    #[tokio::test(start_paused = true)]
    async fn record_first_fails_when_recording_fails() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), true);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::RecordFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        dialog.settled().await;

        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Failed);
        assert_eq!(view.outcome, Some(Outcome::Failed(FailureReason::NotRecorded)));
    }

    #[tokio::test(start_paused = true)]
    async fn record_first_records_then_succeeds() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::RecordFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        dialog.settled().await;

        assert_eq!(dialog.view().await.stage, Stage::Success);
        assert_eq!(store.snapshot().savings, units(3_500_000));
    }

    #[tokio::test(start_paused = true)]
    async fn withdrawal_above_deposit_never_reaches_processing() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        dialog.open(TransferKind::Withdrawal).await;
        dialog
            .apply(Event::SetAmount("1500001".to_string()))
            .await
            .unwrap();
        let result = dialog.apply(Event::Continue).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(dialog.view().await.stage, Stage::Form);
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_recording_waits_for_the_outcome() {
        let store = Arc::new(TestStore {
            account: std::sync::Mutex::new(Account::new(units(3_000_000), units(1_500_000))),
            write_delay: Duration::from_secs(5),
            ..TestStore::default()
        });
        let mut dialog = dialog_with(store.clone(), SettlementOrder::RecordFirst);
        let started = Instant::now();
        submit_withdrawal(&mut dialog, "500000").await;

        // sweep done at 60s, settle at 60.5s, write lands at 65.5s
        time::sleep(Duration::from_secs(62)).await;
        assert_eq!(store.snapshot().deposit, units(1_500_000));

        dialog.close().await;

        // the close waited for the write, which was recorded exactly once
        assert!(started.elapsed() >= Duration::from_millis(65_500));
        assert_eq!(
            store.snapshot(),
            Account::new(units(3_500_000), units(1_000_000))
        );
        let closed = dialog.view().await;
        assert_eq!(closed.stage, Stage::Form);

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(dialog.view().await, closed);
        assert_eq!(store.snapshot().deposit, units(1_000_000));
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_settle_delay_moves_no_funds() {
        let store = TestStore::new(Account::new(units(3_000_000), units(1_500_000)), false);
        let mut dialog = dialog_with(store.clone(), SettlementOrder::RecordFirst);
        submit_withdrawal(&mut dialog, "500000").await;

        time::sleep(Duration::from_millis(60_200)).await;
        assert_eq!(dialog.view().await.progress, 100.0);
        dialog.close().await;

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(dialog.view().await.stage, Stage::Form);
        assert_eq!(
            store.snapshot(),
            Account::new(units(3_000_000), units(1_500_000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_account_rejects_events() {
        let store = Arc::new(TestStore {
            fail_reads: true,
            ..TestStore::default()
        });
        let mut dialog = dialog_with(store, SettlementOrder::OutcomeFirst);
        dialog.open(TransferKind::Withdrawal).await;

        let result = dialog.apply(Event::SetAmount("1000".to_string())).await;
        assert!(matches!(result, Err(WorkflowError::Account(_))));

        // run() keeps going past the rejected event
        dialog
            .execute(Command::Event(Event::SetAmount("2000".to_string())))
            .await;
        let view = dialog.view().await;
        assert_eq!(view.stage, Stage::Form);
        assert_eq!(view.kind, TransferKind::Withdrawal);
    }

    // run()

    #[tokio::test(start_paused = true)]
    async fn run_processes_commands_and_skips_rejected_ones() {
        let mut dialog = dialog(Account::new(units(3_000_000), units(1_500_000)));
        let commands = vec![
            Command::Open(TransferKind::Withdrawal),
            Command::Event(Event::Continue), // rejected: amount missing
            Command::Event(Event::SetAmount("1000".to_string())),
            Command::Event(Event::Continue),
            Command::Event(Event::Confirm),
            Command::Event(Event::EnterPin("nope".to_string())), // rejected later
            Command::Event(Event::SubmitPin),
            Command::Event(Event::EnterPin(PIN.to_string())),
            Command::Event(Event::SubmitPin),
            Command::Wait,
        ];

        dialog.run(tokio_stream::iter(commands)).await;

        let view = dialog.view().await;
        assert_eq!(view.kind, TransferKind::Withdrawal);
        assert_eq!(view.stage, Stage::Success);
    }
}
