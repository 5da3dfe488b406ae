//! The balance accrual engine.
//!
//! Given an account, the instant it was last calculated, and "now", this
//! module re-derives every allowance and interest accrual that came due in
//! between and emits the corresponding ledger entries. It is pure and
//! side-effect free: persisting the emitted entries and the new timestamp is
//! the accrual service's job, which keeps this trivially unit-testable.
//!
//! Hard rules enforced here:
//! - an achieved goal never accrues and its timestamp never moves;
//! - a device clock running behind the last calculation freezes everything;
//! - within one timeline instant, interest is applied to the running balance
//!   before that period's allowance is added;
//! - zero amounts produce no entries;
//! - an enabled but incomplete config accrues nothing (it is validated away
//!   at creation time; this is the in-batch safety net).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregation::account_balance;
use crate::domain::models::account::{Account, InterestKind, LedgerEntry, LedgerEntryType};
use crate::domain::rounding::{percentage_of, round_up};
use crate::domain::schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualKind {
    Interest,
    Allowance,
}

/// One accrual that came due, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accrual {
    pub instant: NaiveDateTime,
    pub account_name: String,
    pub kind: AccrualKind,
    pub amount: i64,
    pub description: String,
}

/// Result of one calculator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub new_balance: i64,
    pub new_timestamp: NaiveDateTime,
    pub accruals: Vec<Accrual>,
    pub ledger_entries: Vec<LedgerEntry>,
}

#[derive(Default)]
struct DuePoint {
    interest: bool,
    allowance: bool,
}

fn frozen(balance: i64, timestamp: NaiveDateTime) -> CalculationOutcome {
    CalculationOutcome {
        new_balance: balance,
        new_timestamp: timestamp,
        accruals: Vec::new(),
        ledger_entries: Vec::new(),
    }
}

/// Format a config value for accrual descriptions: "5" rather than "5.0",
/// "2.5" when genuinely fractional.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Re-derive all accruals due on `account` between `last_calculated_at` and
/// `now`, returning the new balance, new timestamp, and the ledger entries to
/// append. Never fails for valid-shaped input.
pub fn calculate(
    account: &Account,
    last_calculated_at: NaiveDateTime,
    now: NaiveDateTime,
) -> CalculationOutcome {
    let opening_balance = account_balance(account);

    // Achieved goals are terminal: no accrual, unchanged timestamp.
    if account.is_achieved() {
        return frozen(opening_balance, last_calculated_at);
    }

    // Clock-skew guard, checked before any period math so a backwards clock
    // can never produce negative-period artifacts.
    if now < last_calculated_at {
        return frozen(opening_balance, last_calculated_at);
    }

    let allowance = account.allowance.effective();
    let interest = account.interest.effective();

    // Merge both schedules into one chronological timeline; a single instant
    // may have interest due, allowance due, or both.
    let mut timeline: BTreeMap<NaiveDateTime, DuePoint> = BTreeMap::new();
    if let Some((_, _, frequency)) = interest {
        for instant in schedule::due_instants(last_calculated_at, now, frequency) {
            timeline.entry(instant).or_default().interest = true;
        }
    }
    if let Some((_, frequency)) = allowance {
        for instant in schedule::due_instants(last_calculated_at, now, frequency) {
            timeline.entry(instant).or_default().allowance = true;
        }
    }

    let mut balance = opening_balance;
    let mut accruals = Vec::new();
    let mut ledger_entries = Vec::new();

    let mut post = |instant: NaiveDateTime,
                    kind: AccrualKind,
                    amount: i64,
                    description: String,
                    balance: &mut i64| {
        *balance += amount;
        ledger_entries.push(LedgerEntry {
            timestamp: instant,
            entry_type: LedgerEntryType::Deposit,
            description: description.clone(),
            value: amount,
        });
        accruals.push(Accrual {
            instant,
            account_name: account.name.clone(),
            kind,
            amount,
            description,
        });
    };

    for (instant, due) in timeline {
        // Interest first: percentage interest must be computed on the balance
        // before this period's allowance lands.
        if due.interest {
            if let Some((kind, value, frequency)) = interest {
                let amount = match kind {
                    InterestKind::Percentage => percentage_of(balance, value),
                    InterestKind::Absolute => round_up(value),
                };
                if amount != 0 {
                    let description = match kind {
                        InterestKind::Percentage => {
                            format!("Interest {}% ({})", format_value(value), frequency.label())
                        }
                        InterestKind::Absolute => {
                            format!("Interest ${} ({})", format_value(value), frequency.label())
                        }
                    };
                    post(instant, AccrualKind::Interest, amount, description, &mut balance);
                }
            }
        }
        if due.allowance {
            if let Some((amount, frequency)) = allowance {
                let description = format!("Allowance ${} ({})", amount, frequency.label());
                post(instant, AccrualKind::Allowance, amount, description, &mut balance);
            }
        }
    }

    CalculationOutcome {
        new_balance: balance,
        // Calculation happened "as of now", even when the last accrual landed
        // earlier than now.
        new_timestamp: now,
        accruals,
        ledger_entries,
    }
}
