//! Scripted customer session.
//!
//! Replays a stream of [`Step`]s the way a customer would click through the
//! app: log in, open a dialog, fill the form, and so on. Admin top-ups can be
//! interleaved to change balances while a transfer is processing.

use std::sync::Arc;

use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::Amount;
use crate::account::Ledger;
use crate::config::Config;
use crate::dialog::{Command, DialogView, TransferDialog};
use crate::eligibility::Feature;
use crate::model::{Account, BalanceKind};
use crate::session::Session;

/// One line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Login { username: String, pin: String },
    Logout,
    /// Admin top-up of the signed-in customer's balance.
    Credit { kind: BalanceKind, amount: Amount },
    /// Dashboard shortcut, gated on the minimum-savings rule.
    Menu(Feature),
    Dialog(Command),
}

/// Final state of a script run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub view: DialogView,
    pub account: Option<Account>,
}

struct Active {
    session: Session,
    dialog: TransferDialog,
}

pub struct ScriptRunner {
    ledger: Arc<Ledger>,
    config: Config,
    active: Option<Active>,
    last: Option<Report>,
}

/// Public API
impl ScriptRunner {
    pub fn new(ledger: Arc<Ledger>, config: Config) -> Self {
        Self {
            ledger,
            config,
            active: None,
            last: None,
        }
    }

    /// Run the script with the given step stream.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Step> + Unpin) {
        while let Some(step) = stream.next().await {
            self.step(step).await;
        }
    }

    pub async fn step(&mut self, step: Step) {
        match step {
            Step::Login { username, pin } => self.login(&username, &pin).await,
            Step::Logout => self.logout().await,
            Step::Credit { kind, amount } => self.credit(kind, amount).await,
            Step::Menu(feature) => self.menu(feature).await,
            Step::Dialog(command) => {
                let Some(active) = self.active.as_mut() else {
                    warn!(?command, "no active session, command skipped");
                    return;
                };
                active.dialog.execute(command).await;
            }
        }
    }

    /// State of the active dialog, or of the last one before logout.
    pub async fn report(&self) -> Option<Report> {
        match &self.active {
            Some(active) => Some(Self::snapshot(active).await),
            None => self.last.clone(),
        }
    }
}

/// Private API
impl ScriptRunner {
    async fn login(&mut self, username: &str, pin: &str) {
        if self.active.is_some() {
            warn!(username, "already logged in, login skipped");
            return;
        }
        match Session::login(&self.ledger, username, pin, self.config.transaction_pin()).await {
            Ok(session) => {
                let dialog = session.transfer_dialog(&self.config);
                self.active = Some(Active { session, dialog });
            }
            Err(e) => warn!("{e}"),
        }
    }

    async fn logout(&mut self) {
        let Some(mut active) = self.active.take() else {
            warn!("no active session, logout skipped");
            return;
        };
        self.last = Some(Self::snapshot(&active).await);
        active.dialog.close().await;
        active.session.logout();
    }

    async fn credit(&self, kind: BalanceKind, amount: Amount) {
        let Some(active) = &self.active else {
            warn!(?kind, "no active session, credit skipped");
            return;
        };
        let user = active.session.user();
        if let Err(e) = self.ledger.credit(user, kind, amount).await {
            warn!("{e}");
        }
    }

    async fn menu(&self, feature: Feature) {
        let Some(active) = &self.active else {
            warn!(%feature, "no active session, menu skipped");
            return;
        };
        if let Err(e) = active.session.open_feature(feature).await {
            warn!("{e}");
        }
    }

    async fn snapshot(active: &Active) -> Report {
        let account = match active.session.account().current().await {
            Ok(account) => Some(account),
            Err(e) => {
                warn!("{e}");
                None
            }
        };
        Report {
            view: active.dialog.view().await,
            account,
        }
    }
}
