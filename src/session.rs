//! Signed-in customer session.
//!
//! A [`Session`] is created by logging in and consumed by logging out. It hands
//! the customer's account handle and the transaction PIN to the dialogs it
//! opens.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::account::{AccountStore, Ledger, StoreError};
use crate::config::Config;
use crate::dialog::TransferDialog;
use crate::eligibility::{self, Feature, FeatureLocked};
use crate::model::UserId;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid username or PIN")]
    InvalidCredentials,
    #[error(transparent)]
    Locked(#[from] FeatureLocked),
    #[error("account unavailable: {0}")]
    Account(#[from] StoreError),
}

/// PIN authorizing transfers for the active session.
#[derive(Clone, PartialEq, Eq)]
pub struct TransactionPin(String);

impl TransactionPin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    /// Exact string comparison.
    pub fn matches(&self, input: &str) -> bool {
        self.0 == input
    }
}

impl fmt::Debug for TransactionPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransactionPin(***)")
    }
}

pub struct Session {
    user: UserId,
    username: String,
    account: Arc<dyn AccountStore>,
    pin: TransactionPin,
}

impl Session {
    /// Check credentials against the ledger and open a session.
    pub async fn login(
        ledger: &Arc<Ledger>,
        username: &str,
        pin: &str,
        transaction_pin: TransactionPin,
    ) -> Result<Session, SessionError> {
        let Some(user) = ledger.authenticate(username, pin).await else {
            warn!(username, "login rejected");
            return Err(SessionError::InvalidCredentials);
        };
        info!(user = user, username, "logged in");
        Ok(Session {
            user,
            username: username.to_string(),
            account: Arc::new(ledger.handle(user)),
            pin: transaction_pin,
        })
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn account(&self) -> Arc<dyn AccountStore> {
        Arc::clone(&self.account)
    }

    /// Dashboard shortcut: let the customer into `feature` only while the
    /// account meets the minimum-savings rule.
    pub async fn open_feature(&self, feature: Feature) -> Result<(), SessionError> {
        let account = self.account.current().await?;
        if let Err(e) = eligibility::gate(feature, &account) {
            warn!(user = self.user, feature = %feature, shortfall = %e.shortfall, "feature locked");
            return Err(e.into());
        }
        info!(user = self.user, feature = %feature, "feature opened");
        Ok(())
    }

    /// A transfer dialog bound to this session's account and PIN.
    pub fn transfer_dialog(&self, config: &Config) -> TransferDialog {
        TransferDialog::new(self.account(), self.pin.clone(), config)
    }

    pub fn logout(self) {
        info!(user = self.user, username = %self.username, "logged out");
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("username", &self.username)
            .field("pin", &self.pin)
            .finish_non_exhaustive()
    }
}
