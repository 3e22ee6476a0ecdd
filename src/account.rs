//! Account balance collaborator.
//!
//! The workflow only needs to read the current balances and to write back
//! updated ones. [`Ledger`] is an in-memory store holding the demo customers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::Amount;
use crate::model::{Account, BalanceKind, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{kind:?} balance of user {user} would overflow")]
    Overflow { user: UserId, kind: BalanceKind },
}

/// Read and write access to the signed-in customer's balances.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Latest committed balances.
    async fn current(&self) -> Result<Account, StoreError>;

    async fn set_balances(&self, savings: Amount, deposit: Amount) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct UserRecord {
    username: String,
    pin: String,
    account: Account,
}

/// In-memory customer store.
#[derive(Debug, Default)]
pub struct Ledger {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with the two demo customers.
    pub fn with_demo_users() -> Self {
        let users = [
            (
                1,
                "Siti Aminah",
                "112233",
                Account::new(Amount::from_units(1_100_000), Amount::from_units(245_300_000)),
            ),
            (
                2,
                "Budi Santoso",
                "123456",
                Account::new(Amount::from_units(3_000_000), Amount::from_units(1_500_000)),
            ),
        ]
        .into_iter()
        .map(|(id, username, pin, account)| {
            let record = UserRecord {
                username: username.to_string(),
                pin: pin.to_string(),
                account,
            };
            (id, record)
        })
        .collect();

        Self {
            users: RwLock::new(users),
        }
    }

    /// Register a customer and return its id.
    pub async fn insert(&self, username: &str, pin: &str, account: Account) -> UserId {
        let mut users = self.users.write().await;
        let id = users.keys().max().map_or(1, |max| max + 1);
        users.insert(
            id,
            UserRecord {
                username: username.to_string(),
                pin: pin.to_string(),
                account,
            },
        );
        id
    }

    /// Find the customer matching these login credentials.
    pub async fn authenticate(&self, username: &str, pin: &str) -> Option<UserId> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|(_, record)| record.username == username && record.pin == pin)
            .map(|(id, _)| *id)
    }

    pub async fn username(&self, user: UserId) -> Result<String, StoreError> {
        let users = self.users.read().await;
        users
            .get(&user)
            .map(|record| record.username.clone())
            .ok_or(StoreError::UserNotFound(user))
    }

    pub async fn account(&self, user: UserId) -> Result<Account, StoreError> {
        let users = self.users.read().await;
        users
            .get(&user)
            .map(|record| record.account)
            .ok_or(StoreError::UserNotFound(user))
    }

    pub async fn set_account(&self, user: UserId, account: Account) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user).ok_or(StoreError::UserNotFound(user))?;
        record.account = account;
        Ok(())
    }

    /// Add funds to one of the customer's balances (admin top-up).
    pub async fn credit(
        &self,
        user: UserId,
        kind: BalanceKind,
        amount: Amount,
    ) -> Result<Account, StoreError> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user).ok_or(StoreError::UserNotFound(user))?;
        let balance = match kind {
            BalanceKind::Savings => &mut record.account.savings,
            BalanceKind::Deposit => &mut record.account.deposit,
        };
        *balance = balance
            .checked_add(amount)
            .ok_or(StoreError::Overflow { user, kind })?;
        info!(user = user, kind = ?kind, amount = %amount, "balance credited");
        Ok(record.account)
    }

    /// Handle scoped to one customer.
    pub fn handle(self: &Arc<Self>, user: UserId) -> UserAccount {
        UserAccount {
            ledger: Arc::clone(self),
            user,
        }
    }
}

/// [`AccountStore`] view of a single customer in a [`Ledger`].
#[derive(Debug, Clone)]
pub struct UserAccount {
    ledger: Arc<Ledger>,
    user: UserId,
}

#[async_trait]
impl AccountStore for UserAccount {
    async fn current(&self) -> Result<Account, StoreError> {
        self.ledger.account(self.user).await
    }

    async fn set_balances(&self, savings: Amount, deposit: Amount) -> Result<(), StoreError> {
        self.ledger
            .set_account(self.user, Account::new(savings, deposit))
            .await
    }
}
