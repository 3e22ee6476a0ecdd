//! Minimum-savings rule gating every movement of deposit funds.
//!
//! An account may withdraw from its deposit, transfer, or use the dashboard
//! shortcuts only while its savings balance is at least 1.5% of its deposit
//! balance.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Amount;
use crate::model::Account;

/// Required savings rate, in basis points of the deposit balance.
pub const MIN_SAVINGS_BPS: i64 = 150;

const BPS_DENOMINATOR: i128 = 10_000;

/// Savings balance needed to move deposit funds: `deposit × 1.5%`.
///
/// Rounded up to the smallest representable unit, so that comparing an amount
/// against it is the same as comparing against the exact product.
pub fn required_savings(deposit: Amount) -> Amount {
    let product = i128::from(deposit.scaled()) * i128::from(MIN_SAVINGS_BPS);
    let required = div_ceil(product, BPS_DENOMINATOR);
    // |deposit × 0.015| never exceeds |deposit|
    Amount::from_scaled(required as i64)
}

/// Whether an account with these balances may move deposit funds.
pub fn is_eligible(savings: Amount, deposit: Amount) -> bool {
    savings >= required_savings(deposit)
}

/// How much more savings is needed before the account becomes eligible.
pub fn shortfall(savings: Amount, deposit: Amount) -> Amount {
    required_savings(deposit).saturating_sub_zero(savings)
}

/// The rule failed for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("savings must be at least 1.5% of the deposit balance (required {required}, short by {shortfall})")]
pub struct Ineligible {
    pub required: Amount,
    pub shortfall: Amount,
}

/// Evaluate the rule against an account snapshot.
pub fn assess(account: &Account) -> Result<(), Ineligible> {
    let required = required_savings(account.deposit);
    if account.savings >= required {
        Ok(())
    } else {
        Err(Ineligible {
            required,
            shortfall: required - account.savings,
        })
    }
}

/// Dashboard shortcuts that are locked for ineligible accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Transfer,
    DepositWithdrawal,
    VirtualAccount,
    EWallet,
    MobileCredit,
    TopUp,
    Bills,
    CashDepositWithdrawal,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Transfer,
        Feature::DepositWithdrawal,
        Feature::VirtualAccount,
        Feature::EWallet,
        Feature::MobileCredit,
        Feature::TopUp,
        Feature::Bills,
        Feature::CashDepositWithdrawal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Transfer => "Transfer",
            Feature::DepositWithdrawal => "Deposit withdrawal",
            Feature::VirtualAccount => "Virtual account",
            Feature::EWallet => "E-wallet",
            Feature::MobileCredit => "Mobile credit",
            Feature::TopUp => "Top up",
            Feature::Bills => "Bills",
            Feature::CashDepositWithdrawal => "Cash deposit & withdrawal",
        }
    }

    /// Short code accepted by [`Feature::from_str`].
    pub fn code(self) -> &'static str {
        match self {
            Feature::Transfer => "transfer",
            Feature::DepositWithdrawal => "deposit_withdrawal",
            Feature::VirtualAccount => "virtual_account",
            Feature::EWallet => "e_wallet",
            Feature::MobileCredit => "mobile_credit",
            Feature::TopUp => "top_up",
            Feature::Bills => "bills",
            Feature::CashDepositWithdrawal => "cash",
        }
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Feature::ALL
            .into_iter()
            .find(|feature| {
                feature.name().eq_ignore_ascii_case(needle)
                    || feature.code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Error returned when a feature name is not in [`Feature::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A feature was requested by an account that does not meet the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "{feature} requires savings of at least 1.5% of the deposit balance; top up by {shortfall} first"
)]
pub struct FeatureLocked {
    pub feature: Feature,
    pub shortfall: Amount,
}

/// Check the rule before letting the user into `feature`.
pub fn gate(feature: Feature, account: &Account) -> Result<(), FeatureLocked> {
    assess(account).map_err(|ineligible| FeatureLocked {
        feature,
        shortfall: ineligible.shortfall,
    })
}

fn div_ceil(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}
