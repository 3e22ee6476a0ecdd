//! Core domain types for the savings and deposit account.

use std::fmt;
use std::str::FromStr;

use crate::Amount;

/// User identifier.
pub type UserId = u32;

/// Balance snapshot of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Account {
    /// Freely accessible funds.
    pub savings: Amount,
    /// Higher-yield, access-restricted funds.
    pub deposit: Amount,
}

impl Account {
    pub fn new(savings: Amount, deposit: Amount) -> Self {
        Self { savings, deposit }
    }

    pub fn total(&self) -> Amount {
        self.savings + self.deposit
    }

    /// Move `amount` from the deposit into savings.
    ///
    /// Returns `None` if the deposit does not cover `amount` or the savings
    /// balance would overflow.
    pub fn withdraw_deposit(&self, amount: Amount) -> Option<Account> {
        if amount > self.deposit {
            return None;
        }
        Some(Account {
            savings: self.savings.checked_add(amount)?,
            deposit: self.deposit.checked_sub(amount)?,
        })
    }
}

/// Which balance a credit lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    Savings,
    Deposit,
}

/// Destination banks offered by the transfer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    Mandiri,
    Bca,
    Bni,
    Bri,
    Btn,
    Danamon,
    CimbNiaga,
    Permata,
    Maybank,
    OcbcNisp,
    Panin,
    Mega,
    Bukopin,
    Sinarmas,
    Uob,
}

impl Bank {
    /// Every bank, in the order the form lists them.
    pub const ALL: [Bank; 15] = [
        Bank::Mandiri,
        Bank::Bca,
        Bank::Bni,
        Bank::Bri,
        Bank::Btn,
        Bank::Danamon,
        Bank::CimbNiaga,
        Bank::Permata,
        Bank::Maybank,
        Bank::OcbcNisp,
        Bank::Panin,
        Bank::Mega,
        Bank::Bukopin,
        Bank::Sinarmas,
        Bank::Uob,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bank::Mandiri => "Bank Mandiri",
            Bank::Bca => "Bank Central Asia (BCA)",
            Bank::Bni => "Bank Negara Indonesia (BNI)",
            Bank::Bri => "Bank Rakyat Indonesia (BRI)",
            Bank::Btn => "Bank Tabungan Negara (BTN)",
            Bank::Danamon => "Bank Danamon",
            Bank::CimbNiaga => "Bank CIMB Niaga",
            Bank::Permata => "Bank Permata",
            Bank::Maybank => "Bank Maybank Indonesia",
            Bank::OcbcNisp => "Bank OCBC NISP",
            Bank::Panin => "Bank Panin",
            Bank::Mega => "Bank Mega",
            Bank::Bukopin => "Bank Bukopin",
            Bank::Sinarmas => "Bank Sinarmas",
            Bank::Uob => "Bank UOB Indonesia",
        }
    }

    /// Short code accepted by [`Bank::from_str`].
    pub fn code(self) -> &'static str {
        match self {
            Bank::Mandiri => "mandiri",
            Bank::Bca => "bca",
            Bank::Bni => "bni",
            Bank::Bri => "bri",
            Bank::Btn => "btn",
            Bank::Danamon => "danamon",
            Bank::CimbNiaga => "cimb",
            Bank::Permata => "permata",
            Bank::Maybank => "maybank",
            Bank::OcbcNisp => "ocbc",
            Bank::Panin => "panin",
            Bank::Mega => "mega",
            Bank::Bukopin => "bukopin",
            Bank::Sinarmas => "sinarmas",
            Bank::Uob => "uob",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a bank name is not in [`Bank::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bank '{0}'")]
pub struct UnknownBank(pub String);

impl FromStr for Bank {
    type Err = UnknownBank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Bank::ALL
            .into_iter()
            .find(|bank| {
                bank.name().eq_ignore_ascii_case(needle) || bank.code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownBank(s.to_string()))
    }
}

/// The two guided flows sharing the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferKind {
    /// Transfer to another bank's account; no destination ledger exists.
    #[default]
    ThirdParty,
    /// Move funds from the deposit into savings.
    Withdrawal,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::ThirdParty => f.write_str("transfer"),
            TransferKind::Withdrawal => f.write_str("withdrawal"),
        }
    }
}

/// A validated transfer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    ThirdParty {
        amount: Amount,
        account_number: String,
        bank: Bank,
        owner_name: String,
    },
    Withdrawal {
        amount: Amount,
    },
}

impl TransferRequest {
    pub fn amount(&self) -> Amount {
        match self {
            TransferRequest::ThirdParty { amount, .. } | TransferRequest::Withdrawal { amount } => {
                *amount
            }
        }
    }

    pub fn kind(&self) -> TransferKind {
        match self {
            TransferRequest::ThirdParty { .. } => TransferKind::ThirdParty,
            TransferRequest::Withdrawal { .. } => TransferKind::Withdrawal,
        }
    }
}
