//! Storage abstraction traits.
//!
//! The domain layer works against these traits so storage backends can be
//! swapped without touching business logic. All operations are synchronous;
//! writes are expected to be durable before returning.

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::domain::models::account::{Account, LedgerEntry};
use crate::domain::models::child::Child;
use crate::domain::models::parent::Parent;

/// Storage operations for parents.
pub trait ParentStorage: Send + Sync {
    fn store_parent(&self, parent: &Parent) -> Result<()>;

    fn get_parent(&self, parent_name: &str) -> Result<Option<Parent>>;

    /// List all parents ordered by name.
    fn list_parents(&self) -> Result<Vec<Parent>>;

    fn update_parent(&self, parent: &Parent) -> Result<()>;

    /// Returns true if the parent was found and deleted.
    fn delete_parent(&self, parent_name: &str) -> Result<bool>;
}

/// Storage operations for children.
pub trait ChildStorage: Send + Sync {
    fn store_child(&self, child: &Child) -> Result<()>;

    fn get_child(&self, child_name: &str) -> Result<Option<Child>>;

    /// List all children ordered by name.
    fn list_children(&self) -> Result<Vec<Child>>;

    fn update_child(&self, child: &Child) -> Result<()>;

    /// Delete a child and everything it owns (its accounts go with it).
    /// Returns true if the child was found and deleted.
    fn delete_child(&self, child_name: &str) -> Result<bool>;

    /// Persist a child's recomputed balance snapshot (cb / cbts).
    fn set_child_balance(
        &self,
        child_name: &str,
        balance: i64,
        calculated_at: NaiveDateTime,
    ) -> Result<()>;
}

/// Storage operations for accounts and their ledgers.
pub trait AccountStorage: Send + Sync {
    fn store_account(&self, child_name: &str, account: &Account) -> Result<()>;

    fn get_account(&self, child_name: &str, account_name: &str) -> Result<Option<Account>>;

    /// List a child's accounts ordered by creation time.
    fn list_accounts(&self, child_name: &str) -> Result<Vec<Account>>;

    fn update_account(&self, child_name: &str, account: &Account) -> Result<()>;

    /// Returns true if the account was found and deleted.
    fn delete_account(&self, child_name: &str, account_name: &str) -> Result<bool>;

    /// Append entries to an account's ledger and re-sort it ascending by
    /// timestamp, so the ordering invariant holds even when accrual entries
    /// interleave with wall-clock entries from user actions.
    fn append_ledger_entries(
        &self,
        child_name: &str,
        account_name: &str,
        entries: &[LedgerEntry],
    ) -> Result<()>;
}
