//! Domain models for accounts, their ledgers, and accrual configuration.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How often an allowance or interest accrual comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    /// Label used in accrual descriptions, e.g. "Allowance $10 (weekly)".
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntryType {
    Deposit,
    Withdraw,
}

/// One immutable line in an account's append-only ledger.
///
/// Deposits carry a positive value, withdrawals a negative one. The owning
/// ledger is kept sorted ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: NaiveDateTime,
    pub entry_type: LedgerEntryType,
    pub description: String,
    pub value: i64,
}

/// Recurring allowance configuration for an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowanceConfig {
    pub enabled: bool,
    pub amount: Option<i64>,
    pub frequency: Option<Frequency>,
}

impl AllowanceConfig {
    /// Amount and frequency, but only when the config is complete and usable.
    ///
    /// An enabled config missing its amount or frequency is treated as
    /// disabled here; creation-time validation is the primary guard and this
    /// is the safety net that keeps a bad stored record from failing a batch.
    pub fn effective(&self) -> Option<(i64, Frequency)> {
        if !self.enabled {
            return None;
        }
        match (self.amount, self.frequency) {
            (Some(amount), Some(frequency)) if amount > 0 => Some((amount, frequency)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestKind {
    /// A fixed whole-unit amount per period.
    Absolute,
    /// A percentage (0-100) of the running balance per period.
    Percentage,
}

/// Recurring interest configuration for an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestConfig {
    pub enabled: bool,
    pub kind: Option<InterestKind>,
    pub value: Option<f64>,
    pub frequency: Option<Frequency>,
}

impl InterestConfig {
    /// Kind, value and frequency when the config is complete and usable.
    /// Same defensive contract as [`AllowanceConfig::effective`].
    pub fn effective(&self) -> Option<(InterestKind, f64, Frequency)> {
        if !self.enabled {
            return None;
        }
        match (self.kind, self.value, self.frequency) {
            (Some(kind), Some(value), Some(frequency)) if value > 0.0 => {
                Some((kind, value, frequency))
            }
            _ => None,
        }
    }
}

/// Savings target attached to a Goal account.
///
/// Once `achieved` flips true the owning account is permanently read-only and
/// excluded from accrual and from child totals. The flag is only ever set by
/// an explicit transition, never by the balance calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub name: String,
    pub cost: i64,
    pub achieved: bool,
}

/// An account owned by a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub account_type: AccountType,
    pub allowance: AllowanceConfig,
    pub interest: InterestConfig,
    pub goal: Option<GoalConfig>,
    /// Always sorted ascending by timestamp.
    pub ledger: Vec<LedgerEntry>,
    pub created_at: NaiveDateTime,
}

impl Account {
    pub fn is_achieved(&self) -> bool {
        self.goal.as_ref().map(|g| g.achieved).unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountValidationError {
    #[error("Account name cannot be empty")]
    EmptyName,
    #[error("Allowance amount is required when allowance is enabled")]
    MissingAllowanceAmount,
    #[error("Allowance frequency is required when allowance is enabled")]
    MissingAllowanceFrequency,
    #[error("Allowance amount must be positive")]
    NonPositiveAllowanceAmount,
    #[error("Interest type, value and frequency are required when interest is enabled")]
    IncompleteInterestConfig,
    #[error("Interest value must be positive")]
    NonPositiveInterestValue,
    #[error("Interest percentage must be between 0 and 100")]
    InterestPercentageOutOfRange,
    #[error("Goal accounts require a goal with a positive cost")]
    MissingOrInvalidGoal,
    #[error("Account is read-only once its goal is achieved")]
    AccountReadOnly,
}
