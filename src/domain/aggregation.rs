//! Balance aggregation helpers.

use crate::domain::models::account::{Account, AccountType};

/// Current balance of a single account: the sum of its ledger values,
/// clamped to zero at read time.
pub fn account_balance(account: &Account) -> i64 {
    account.ledger.iter().map(|entry| entry.value).sum::<i64>().max(0)
}

/// A child's aggregate balance across their accounts. Achieved-goal accounts
/// contribute zero regardless of their internal balance.
pub fn child_total_balance(accounts: &[Account]) -> i64 {
    accounts
        .iter()
        .filter(|account| !account.is_achieved())
        .map(account_balance)
        .sum()
}

/// Whether a Goal account's balance currently meets its cost.
///
/// This is a query, distinct from the persisted `achieved` flag: the flag is
/// only flipped by an explicit transition, never by this function.
pub fn is_goal_achieved(account: &Account) -> bool {
    match (&account.account_type, &account.goal) {
        (AccountType::Goal, Some(goal)) => account_balance(account) >= goal.cost,
        _ => false,
    }
}
