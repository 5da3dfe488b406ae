//! Domain model for a child and their cached balance snapshot.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A child who owns accounts.
///
/// `current_balance` / `calculated_at` are a memoized snapshot: the sum of all
/// owned non-achieved accounts' balances as of `calculated_at`. Only the
/// accrual run recomputes them, and `calculated_at` never moves backwards —
/// when the device clock reports an earlier "now" the snapshot stays frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub name: String,
    /// Names of the accounts owned by this child.
    pub accounts: Vec<String>,
    #[serde(rename = "cb")]
    pub current_balance: i64,
    #[serde(rename = "cbts")]
    pub calculated_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}
