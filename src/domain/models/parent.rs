//! Domain model for a parent, the top of the ownership tree.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A parent who manages children. Deleting a parent cascades to all owned
/// children and their accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub name: String,
    /// Names of the children managed by this parent.
    pub children: Vec<String>,
    pub created_at: NaiveDateTime,
}
