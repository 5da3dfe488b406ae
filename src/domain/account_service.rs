//! Account management service: creation, config updates, deposits, capped
//! withdrawals, transfers, and the one-way goal-achieved transition.
//!
//! Config validation is enforced strictly here, at creation/update time; the
//! balance calculator's defensive checks are only a safety net for records
//! that predate a rule change.

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::aggregation::{account_balance, is_goal_achieved};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::commands::account::{
    CreateAccountCommand, CreateAccountResult, DeleteAccountCommand, DeleteAccountResult,
    DepositCommand, DepositResult, GetAccountCommand, GetAccountResult, ListAccountsResult,
    MarkGoalAchievedCommand, MarkGoalAchievedResult, TransferCommand, TransferResult,
    UpdateAccountConfigCommand, UpdateAccountConfigResult, WithdrawCommand, WithdrawResult,
};
use crate::domain::models::account::{
    Account, AccountType, AccountValidationError, AllowanceConfig, InterestConfig, InterestKind,
    LedgerEntry, LedgerEntryType,
};
use crate::domain::rounding::cap_to;
use crate::storage::json::{AccountRepository, ChildRepository, JsonConnection};
use crate::storage::traits::{AccountStorage, ChildStorage};

fn validate_allowance_config(config: &AllowanceConfig) -> Result<(), AccountValidationError> {
    if !config.enabled {
        return Ok(());
    }
    let amount = config.amount.ok_or(AccountValidationError::MissingAllowanceAmount)?;
    if config.frequency.is_none() {
        return Err(AccountValidationError::MissingAllowanceFrequency);
    }
    if amount <= 0 {
        return Err(AccountValidationError::NonPositiveAllowanceAmount);
    }
    Ok(())
}

fn validate_interest_config(config: &InterestConfig) -> Result<(), AccountValidationError> {
    if !config.enabled {
        return Ok(());
    }
    let (kind, value) = match (config.kind, config.value, config.frequency) {
        (Some(kind), Some(value), Some(_)) => (kind, value),
        _ => return Err(AccountValidationError::IncompleteInterestConfig),
    };
    if value <= 0.0 {
        return Err(AccountValidationError::NonPositiveInterestValue);
    }
    if kind == InterestKind::Percentage && value > 100.0 {
        return Err(AccountValidationError::InterestPercentageOutOfRange);
    }
    Ok(())
}

/// Service for managing accounts and their ledgers.
#[derive(Clone)]
pub struct AccountService {
    account_repository: AccountRepository,
    child_repository: ChildRepository,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self::with_clock(connection, Arc::new(SystemClock))
    }

    pub fn with_clock(connection: Arc<JsonConnection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account_repository: AccountRepository::new(connection.clone()),
            child_repository: ChildRepository::new(connection),
            clock,
        }
    }

    pub fn create_account(&self, command: CreateAccountCommand) -> Result<CreateAccountResult> {
        let name = command.name.trim().to_string();
        info!("Creating account {} for child {}", name, command.child_name);

        if name.is_empty() {
            return Err(AccountValidationError::EmptyName.into());
        }
        validate_allowance_config(&command.allowance)?;
        validate_interest_config(&command.interest)?;
        if command.account_type == AccountType::Goal {
            match &command.goal {
                Some(goal) if goal.cost > 0 => {}
                _ => return Err(AccountValidationError::MissingOrInvalidGoal.into()),
            }
        }

        let mut child = self
            .child_repository
            .get_child(&command.child_name)?
            .ok_or_else(|| anyhow::anyhow!("Child not found: {}", command.child_name))?;
        if self
            .account_repository
            .get_account(&command.child_name, &name)?
            .is_some()
        {
            return Err(anyhow::anyhow!("Account already exists: {}", name));
        }

        let account = Account {
            name,
            account_type: command.account_type,
            allowance: command.allowance,
            interest: command.interest,
            goal: command.goal,
            ledger: Vec::new(),
            created_at: self.clock.now(),
        };
        self.account_repository.store_account(&command.child_name, &account)?;

        child.accounts.push(account.name.clone());
        self.child_repository.update_child(&child)?;

        info!("Created account {} for child {}", account.name, command.child_name);
        Ok(CreateAccountResult { account })
    }

    pub fn get_account(&self, command: GetAccountCommand) -> Result<GetAccountResult> {
        let account = self
            .account_repository
            .get_account(&command.child_name, &command.account_name)?;
        Ok(GetAccountResult { account })
    }

    pub fn list_accounts(&self, child_name: &str) -> Result<ListAccountsResult> {
        let accounts = self.account_repository.list_accounts(child_name)?;
        Ok(ListAccountsResult { accounts })
    }

    /// Replace an account's allowance and/or interest config, with the same
    /// strict validation as creation.
    pub fn update_account_config(
        &self,
        command: UpdateAccountConfigCommand,
    ) -> Result<UpdateAccountConfigResult> {
        info!(
            "Updating config for account {} (child {})",
            command.account_name, command.child_name
        );

        let mut account = self.load_writable(&command.child_name, &command.account_name)?;
        if let Some(allowance) = command.allowance {
            validate_allowance_config(&allowance)?;
            account.allowance = allowance;
        }
        if let Some(interest) = command.interest {
            validate_interest_config(&interest)?;
            account.interest = interest;
        }
        self.account_repository.update_account(&command.child_name, &account)?;
        Ok(UpdateAccountConfigResult { account })
    }

    pub fn deposit(&self, command: DepositCommand) -> Result<DepositResult> {
        info!(
            "Deposit of {} into {} (child {})",
            command.amount, command.account_name, command.child_name
        );

        if command.amount <= 0 {
            return Err(anyhow::anyhow!("Deposit amount must be positive"));
        }
        let account = self.load_writable(&command.child_name, &command.account_name)?;

        let entry = LedgerEntry {
            timestamp: self.clock.now(),
            entry_type: LedgerEntryType::Deposit,
            description: command.description.unwrap_or_else(|| "Deposit".to_string()),
            value: command.amount,
        };
        self.account_repository.append_ledger_entries(
            &command.child_name,
            &account.name,
            std::slice::from_ref(&entry),
        )?;

        Ok(DepositResult {
            new_balance: account_balance(&account) + entry.value,
            entry,
        })
    }

    /// Withdraw from an account, capping the amount to the available balance.
    /// A capped withdrawal is not an error; the result carries the notice.
    pub fn withdraw(&self, command: WithdrawCommand) -> Result<WithdrawResult> {
        info!(
            "Withdrawal of {} from {} (child {})",
            command.amount, command.account_name, command.child_name
        );

        if command.amount <= 0 {
            return Err(anyhow::anyhow!("Withdrawal amount must be positive"));
        }
        let account = self.load_writable(&command.child_name, &command.account_name)?;

        let available = account_balance(&account);
        let applied = cap_to(command.amount, available);
        let capped = applied < command.amount;
        if capped {
            warn!(
                "Withdrawal of {} from {} capped to available balance {}",
                command.amount, account.name, available
            );
        }
        if applied == 0 {
            return Ok(WithdrawResult {
                entry: None,
                requested: command.amount,
                applied: 0,
                capped,
                new_balance: available,
            });
        }

        let entry = LedgerEntry {
            timestamp: self.clock.now(),
            entry_type: LedgerEntryType::Withdraw,
            description: command
                .description
                .unwrap_or_else(|| "Withdrawal".to_string()),
            value: -applied,
        };
        self.account_repository.append_ledger_entries(
            &command.child_name,
            &account.name,
            std::slice::from_ref(&entry),
        )?;

        Ok(WithdrawResult {
            entry: Some(entry),
            requested: command.amount,
            applied,
            capped,
            new_balance: available - applied,
        })
    }

    /// Move money between two of a child's accounts as a paired
    /// withdraw+deposit, capped to the source's available balance.
    pub fn transfer(&self, command: TransferCommand) -> Result<TransferResult> {
        info!(
            "Transfer of {} from {} to {} (child {})",
            command.amount, command.from_account, command.to_account, command.child_name
        );

        if command.amount <= 0 {
            return Err(anyhow::anyhow!("Transfer amount must be positive"));
        }
        if command.from_account == command.to_account {
            return Err(anyhow::anyhow!("Cannot transfer an account to itself"));
        }
        let source = self.load_writable(&command.child_name, &command.from_account)?;
        let target = self.load_writable(&command.child_name, &command.to_account)?;

        let available = account_balance(&source);
        let applied = cap_to(command.amount, available);
        let capped = applied < command.amount;
        if applied == 0 {
            return Ok(TransferResult {
                requested: command.amount,
                applied: 0,
                capped,
                withdraw_entry: None,
                deposit_entry: None,
            });
        }

        let now = self.clock.now();
        let withdraw_entry = LedgerEntry {
            timestamp: now,
            entry_type: LedgerEntryType::Withdraw,
            description: format!("Transfer to {}", target.name),
            value: -applied,
        };
        let deposit_entry = LedgerEntry {
            timestamp: now,
            entry_type: LedgerEntryType::Deposit,
            description: format!("Transfer from {}", source.name),
            value: applied,
        };
        self.account_repository.append_ledger_entries(
            &command.child_name,
            &source.name,
            std::slice::from_ref(&withdraw_entry),
        )?;
        if let Err(error) = self.account_repository.append_ledger_entries(
            &command.child_name,
            &target.name,
            std::slice::from_ref(&deposit_entry),
        ) {
            // The source is already debited; put the money back before
            // reporting the failure.
            warn!(
                "Transfer deposit into {} failed, refunding {}: {:#}",
                target.name, source.name, error
            );
            let refund = LedgerEntry {
                timestamp: now,
                entry_type: LedgerEntryType::Deposit,
                description: format!("Transfer to {} reversed", target.name),
                value: applied,
            };
            self.account_repository
                .append_ledger_entries(
                    &command.child_name,
                    &source.name,
                    std::slice::from_ref(&refund),
                )
                .with_context(|| {
                    format!(
                        "Failed to refund {} to {} after transfer into {} failed",
                        applied, source.name, target.name
                    )
                })?;
            return Err(error.context(format!(
                "Transfer into {} failed and was reversed",
                target.name
            )));
        }

        Ok(TransferResult {
            requested: command.amount,
            applied,
            capped,
            withdraw_entry: Some(withdraw_entry),
            deposit_entry: Some(deposit_entry),
        })
    }

    /// Flip a goal account's achieved flag. One-way: once set, the account is
    /// permanently read-only and excluded from accrual and totals. Requires
    /// the goal to actually be reached; marking an already-achieved account
    /// is a no-op success.
    pub fn mark_goal_achieved(
        &self,
        command: MarkGoalAchievedCommand,
    ) -> Result<MarkGoalAchievedResult> {
        info!(
            "Marking goal achieved on {} (child {})",
            command.account_name, command.child_name
        );

        let mut account = self
            .account_repository
            .get_account(&command.child_name, &command.account_name)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", command.account_name))?;

        if account.account_type != AccountType::Goal || account.goal.is_none() {
            return Err(anyhow::anyhow!(
                "Account {} is not a goal account",
                account.name
            ));
        }
        if account.is_achieved() {
            return Ok(MarkGoalAchievedResult {
                success_message: format!("Goal on '{}' was already achieved", account.name),
                account,
            });
        }
        if !is_goal_achieved(&account) {
            let goal_cost = account.goal.as_ref().map(|g| g.cost).unwrap_or(0);
            return Err(anyhow::anyhow!(
                "Goal not reached: balance {} of {}",
                account_balance(&account),
                goal_cost
            ));
        }

        if let Some(goal) = account.goal.as_mut() {
            goal.achieved = true;
        }
        self.account_repository.update_account(&command.child_name, &account)?;

        info!("Goal achieved on account {}", account.name);
        Ok(MarkGoalAchievedResult {
            success_message: format!("Goal on '{}' achieved", account.name),
            account,
        })
    }

    pub fn delete_account(&self, command: DeleteAccountCommand) -> Result<DeleteAccountResult> {
        info!(
            "Deleting account {} (child {})",
            command.account_name, command.child_name
        );

        let deleted = self
            .account_repository
            .delete_account(&command.child_name, &command.account_name)?;
        if !deleted {
            return Err(anyhow::anyhow!(
                "Account not found: {}",
                command.account_name
            ));
        }

        if let Some(mut child) = self.child_repository.get_child(&command.child_name)? {
            child.accounts.retain(|a| a != &command.account_name);
            self.child_repository.update_child(&child)?;
        }

        Ok(DeleteAccountResult {
            success_message: format!("Account '{}' deleted successfully", command.account_name),
        })
    }

    /// Load an account for a mutating operation, rejecting achieved goals —
    /// they are permanently read-only.
    fn load_writable(&self, child_name: &str, account_name: &str) -> Result<Account> {
        let account = self
            .account_repository
            .get_account(child_name, account_name)?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account_name))?;
        if account.is_achieved() {
            return Err(AccountValidationError::AccountReadOnly.into());
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::child::CreateChildCommand;
    use crate::domain::commands::parent::CreateParentCommand;
    use crate::domain::models::account::{Frequency, GoalConfig};
    use crate::domain::child_service::ChildService;
    use crate::domain::parent_service::ParentService;
    use tempfile::{tempdir, TempDir};

    fn setup_test() -> (TempDir, AccountService) {
        let temp_dir = tempdir().unwrap();
        let connection = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        ParentService::new(connection.clone())
            .create_parent(CreateParentCommand {
                name: "Sam".to_string(),
            })
            .unwrap();
        ChildService::new(connection.clone())
            .create_child(CreateChildCommand {
                parent_name: "Sam".to_string(),
                name: "Emma".to_string(),
            })
            .unwrap();
        (temp_dir, AccountService::new(connection))
    }

    fn savings_command(name: &str) -> CreateAccountCommand {
        CreateAccountCommand {
            child_name: "Emma".to_string(),
            name: name.to_string(),
            account_type: AccountType::Savings,
            allowance: AllowanceConfig::default(),
            interest: InterestConfig::default(),
            goal: None,
        }
    }

    fn deposit(service: &AccountService, account: &str, amount: i64) {
        service
            .deposit(DepositCommand {
                child_name: "Emma".to_string(),
                account_name: account.to_string(),
                amount,
                description: None,
            })
            .expect("Failed to deposit");
    }

    #[test]
    fn test_create_account_and_deposit() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();

        let result = service
            .deposit(DepositCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
                amount: 25,
                description: Some("Birthday money".to_string()),
            })
            .unwrap();
        assert_eq!(result.new_balance, 25);
        assert_eq!(result.entry.value, 25);
        assert_eq!(result.entry.description, "Birthday money");
    }

    #[test]
    fn test_deposit_must_be_positive() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();
        assert!(service
            .deposit(DepositCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
                amount: 0,
                description: None,
            })
            .is_err());
    }

    #[test]
    fn test_withdraw_capped_to_available_balance() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();
        deposit(&service, "Piggy", 100);

        let result = service
            .withdraw(WithdrawCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
                amount: 150,
                description: None,
            })
            .unwrap();
        assert!(result.capped);
        assert_eq!(result.requested, 150);
        assert_eq!(result.applied, 100);
        assert_eq!(result.new_balance, 0);
        assert_eq!(result.entry.as_ref().unwrap().value, -100);
    }

    #[test]
    fn test_withdraw_from_empty_account_writes_no_entry() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();

        let result = service
            .withdraw(WithdrawCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
                amount: 10,
                description: None,
            })
            .unwrap();
        assert!(result.capped);
        assert_eq!(result.applied, 0);
        assert!(result.entry.is_none());

        let account = service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
            })
            .unwrap()
            .account
            .unwrap();
        assert!(account.ledger.is_empty());
    }

    #[test]
    fn test_transfer_moves_money_and_caps() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();
        service.create_account(savings_command("Vacation")).unwrap();
        deposit(&service, "Piggy", 60);

        let result = service
            .transfer(TransferCommand {
                child_name: "Emma".to_string(),
                from_account: "Piggy".to_string(),
                to_account: "Vacation".to_string(),
                amount: 100,
            })
            .unwrap();
        assert!(result.capped);
        assert_eq!(result.applied, 60);
        assert_eq!(result.withdraw_entry.as_ref().unwrap().value, -60);
        assert_eq!(result.deposit_entry.as_ref().unwrap().value, 60);
        assert_eq!(
            result.withdraw_entry.unwrap().description,
            "Transfer to Vacation"
        );

        let source = service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
            })
            .unwrap()
            .account
            .unwrap();
        let target = service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Vacation".to_string(),
            })
            .unwrap()
            .account
            .unwrap();
        assert_eq!(account_balance(&source), 0);
        assert_eq!(account_balance(&target), 60);
    }

    #[test]
    fn test_transfer_refunds_source_when_target_write_fails() {
        let (dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();
        service.create_account(savings_command("Vacation")).unwrap();
        deposit(&service, "Piggy", 60);

        // Occupy the target document's temp-file slot with a directory so
        // the deposit write fails after the source has been debited.
        let blocker = dir.path().join("children/emma/accounts/vacation.json.tmp");
        std::fs::create_dir_all(&blocker).unwrap();

        let result = service.transfer(TransferCommand {
            child_name: "Emma".to_string(),
            from_account: "Piggy".to_string(),
            to_account: "Vacation".to_string(),
            amount: 40,
        });
        assert!(result.is_err());

        // The debit was reversed: no money vanished.
        let source = service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
            })
            .unwrap()
            .account
            .unwrap();
        assert_eq!(account_balance(&source), 60);
        assert!(source
            .ledger
            .iter()
            .any(|e| e.description == "Transfer to Vacation reversed"));

        let target = service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Vacation".to_string(),
            })
            .unwrap()
            .account
            .unwrap();
        assert!(target.ledger.is_empty());
    }

    #[test]
    fn test_symbol_only_account_name_rejected() {
        let (_dir, service) = setup_test();
        let result = service.create_account(savings_command("###"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("letter or digit"));
    }

    #[test]
    fn test_goal_account_requires_goal_config() {
        let (_dir, service) = setup_test();
        let mut command = savings_command("Bike");
        command.account_type = AccountType::Goal;
        assert!(service.create_account(command.clone()).is_err());

        command.goal = Some(GoalConfig {
            name: "Bike".to_string(),
            cost: 80,
            achieved: false,
        });
        assert!(service.create_account(command).is_ok());
    }

    #[test]
    fn test_enabled_config_must_be_complete() {
        let (_dir, service) = setup_test();
        let mut command = savings_command("Piggy");
        command.allowance = AllowanceConfig {
            enabled: true,
            amount: Some(10),
            frequency: None,
        };
        let result = service.create_account(command);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("frequency is required"));

        let mut command = savings_command("Piggy");
        command.interest = InterestConfig {
            enabled: true,
            kind: Some(InterestKind::Percentage),
            value: Some(150.0),
            frequency: Some(Frequency::Monthly),
        };
        let result = service.create_account(command);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("between 0 and 100"));
    }

    #[test]
    fn test_mark_goal_achieved_is_one_way_and_freezes_account() {
        let (_dir, service) = setup_test();
        let mut command = savings_command("Bike");
        command.account_type = AccountType::Goal;
        command.goal = Some(GoalConfig {
            name: "Bike".to_string(),
            cost: 80,
            achieved: false,
        });
        service.create_account(command).unwrap();

        // Not reached yet: transition rejected.
        deposit(&service, "Bike", 50);
        assert!(service
            .mark_goal_achieved(MarkGoalAchievedCommand {
                child_name: "Emma".to_string(),
                account_name: "Bike".to_string(),
            })
            .is_err());

        deposit(&service, "Bike", 30);
        let result = service
            .mark_goal_achieved(MarkGoalAchievedCommand {
                child_name: "Emma".to_string(),
                account_name: "Bike".to_string(),
            })
            .unwrap();
        assert!(result.account.is_achieved());

        // Achieved accounts are read-only.
        let deposit_result = service.deposit(DepositCommand {
            child_name: "Emma".to_string(),
            account_name: "Bike".to_string(),
            amount: 5,
            description: None,
        });
        assert!(deposit_result.is_err());

        // Marking again is a no-op success.
        assert!(service
            .mark_goal_achieved(MarkGoalAchievedCommand {
                child_name: "Emma".to_string(),
                account_name: "Bike".to_string(),
            })
            .is_ok());
    }

    #[test]
    fn test_update_config_validates_and_persists() {
        let (_dir, service) = setup_test();
        service.create_account(savings_command("Piggy")).unwrap();

        let rejected = service.update_account_config(UpdateAccountConfigCommand {
            child_name: "Emma".to_string(),
            account_name: "Piggy".to_string(),
            allowance: Some(AllowanceConfig {
                enabled: true,
                amount: Some(-5),
                frequency: Some(Frequency::Weekly),
            }),
            interest: None,
        });
        assert!(rejected.is_err());

        let updated = service
            .update_account_config(UpdateAccountConfigCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
                allowance: Some(AllowanceConfig {
                    enabled: true,
                    amount: Some(10),
                    frequency: Some(Frequency::Weekly),
                }),
                interest: None,
            })
            .unwrap();
        assert_eq!(updated.account.allowance.amount, Some(10));

        let accounts = service.list_accounts("Emma").unwrap().accounts;
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].allowance.frequency, Some(Frequency::Weekly));
    }

    #[test]
    fn test_delete_account_detaches_from_child() {
        let (_dir, service) = setup_test();
        let connection_child = {
            service.create_account(savings_command("Piggy")).unwrap();
            service
                .delete_account(DeleteAccountCommand {
                    child_name: "Emma".to_string(),
                    account_name: "Piggy".to_string(),
                })
                .unwrap();
            service
                .child_repository
                .get_child("Emma")
                .unwrap()
                .unwrap()
        };
        assert!(connection_child.accounts.is_empty());
        assert!(service
            .get_account(GetAccountCommand {
                child_name: "Emma".to_string(),
                account_name: "Piggy".to_string(),
            })
            .unwrap()
            .account
            .is_none());
    }
}
