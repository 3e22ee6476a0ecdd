pub mod account;
pub mod amount;
pub mod config;
pub mod csv;
pub mod dialog;
pub mod eligibility;
pub mod model;
pub mod script;
pub mod session;
pub mod workflow;

pub use account::{AccountStore, Ledger};
pub use amount::Amount;
pub use config::Config;
pub use dialog::TransferDialog;
pub use model::{Account, Bank, TransferKind, TransferRequest, UserId};
pub use session::{Session, TransactionPin};
pub use workflow::TransferWorkflow;
