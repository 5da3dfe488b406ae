//! Commands and results for account operations.

use crate::domain::models::account::{
    Account, AccountType, AllowanceConfig, GoalConfig, InterestConfig, LedgerEntry,
};

#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub child_name: String,
    pub name: String,
    pub account_type: AccountType,
    pub allowance: AllowanceConfig,
    pub interest: InterestConfig,
    pub goal: Option<GoalConfig>,
}

#[derive(Debug, Clone)]
pub struct CreateAccountResult {
    pub account: Account,
}

#[derive(Debug, Clone)]
pub struct GetAccountCommand {
    pub child_name: String,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct GetAccountResult {
    pub account: Option<Account>,
}

#[derive(Debug, Clone)]
pub struct ListAccountsResult {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone)]
pub struct UpdateAccountConfigCommand {
    pub child_name: String,
    pub account_name: String,
    /// Replacement allowance config, when changing it.
    pub allowance: Option<AllowanceConfig>,
    /// Replacement interest config, when changing it.
    pub interest: Option<InterestConfig>,
}

#[derive(Debug, Clone)]
pub struct UpdateAccountConfigResult {
    pub account: Account,
}

#[derive(Debug, Clone)]
pub struct DepositCommand {
    pub child_name: String,
    pub account_name: String,
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DepositResult {
    pub entry: LedgerEntry,
    pub new_balance: i64,
}

#[derive(Debug, Clone)]
pub struct WithdrawCommand {
    pub child_name: String,
    pub account_name: String,
    pub amount: i64,
    pub description: Option<String>,
}

/// Outcome of a withdrawal. When the requested amount exceeded the available
/// balance, `capped` is set and `applied` carries what was actually taken —
/// it is the caller's job to surface the notice to the user.
#[derive(Debug, Clone)]
pub struct WithdrawResult {
    /// None when the cap reduced the withdrawal to zero.
    pub entry: Option<LedgerEntry>,
    pub requested: i64,
    pub applied: i64,
    pub capped: bool,
    pub new_balance: i64,
}

#[derive(Debug, Clone)]
pub struct TransferCommand {
    pub child_name: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: i64,
}

#[derive(Debug, Clone)]
pub struct TransferResult {
    pub requested: i64,
    pub applied: i64,
    pub capped: bool,
    pub withdraw_entry: Option<LedgerEntry>,
    pub deposit_entry: Option<LedgerEntry>,
}

#[derive(Debug, Clone)]
pub struct MarkGoalAchievedCommand {
    pub child_name: String,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct MarkGoalAchievedResult {
    pub account: Account,
    pub success_message: String,
}

#[derive(Debug, Clone)]
pub struct DeleteAccountCommand {
    pub child_name: String,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteAccountResult {
    pub success_message: String,
}
