//! JSON-backed account repository.

use anyhow::Result;
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::JsonConnection;
use crate::domain::models::account::{Account, LedgerEntry};
use crate::storage::traits::AccountStorage;

#[derive(Clone)]
pub struct AccountRepository {
    connection: Arc<JsonConnection>,
}

impl AccountRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }

    fn account_path(&self, child_name: &str, account_name: &str) -> Result<PathBuf> {
        Ok(self
            .connection
            .accounts_directory(child_name)?
            .join(format!("{}.json", JsonConnection::safe_key(account_name)?)))
    }
}

impl AccountStorage for AccountRepository {
    fn store_account(&self, child_name: &str, account: &Account) -> Result<()> {
        debug!("Storing account {} for child {}", account.name, child_name);
        self.connection
            .write_document(&self.account_path(child_name, &account.name)?, account)
    }

    fn get_account(&self, child_name: &str, account_name: &str) -> Result<Option<Account>> {
        self.connection
            .read_document(&self.account_path(child_name, account_name)?)
    }

    fn list_accounts(&self, child_name: &str) -> Result<Vec<Account>> {
        let directory = self.connection.accounts_directory(child_name)?;
        if !directory.exists() {
            return Ok(Vec::new());
        }
        let mut accounts = Vec::new();
        for dir_entry in fs::read_dir(&directory)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.connection.read_document::<Account>(&path)? {
                Some(account) => accounts.push(account),
                None => warn!("Account document vanished while listing: {:?}", path),
            }
        }
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(accounts)
    }

    fn update_account(&self, child_name: &str, account: &Account) -> Result<()> {
        self.store_account(child_name, account)
    }

    fn delete_account(&self, child_name: &str, account_name: &str) -> Result<bool> {
        debug!("Deleting account {} for child {}", account_name, child_name);
        self.connection
            .delete_document(&self.account_path(child_name, account_name)?)
    }

    fn append_ledger_entries(
        &self,
        child_name: &str,
        account_name: &str,
        entries: &[LedgerEntry],
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut account = self
            .get_account(child_name, account_name)?
            .ok_or_else(|| {
                anyhow::anyhow!("Account not found: {} (child {})", account_name, child_name)
            })?;
        account.ledger.extend_from_slice(entries);
        // Stable sort: entries sharing a timestamp keep their append order.
        account.ledger.sort_by_key(|entry| entry.timestamp);
        self.store_account(child_name, &account)?;
        debug!(
            "Appended {} ledger entries to {} (child {})",
            entries.len(),
            account_name,
            child_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::account::{
        AccountType, AllowanceConfig, InterestConfig, LedgerEntryType,
    };
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn entry(day: u32, value: i64) -> LedgerEntry {
        LedgerEntry {
            timestamp: at(day),
            entry_type: if value >= 0 {
                LedgerEntryType::Deposit
            } else {
                LedgerEntryType::Withdraw
            },
            description: "test".to_string(),
            value,
        }
    }

    fn test_account() -> Account {
        Account {
            name: "Piggy Bank".to_string(),
            account_type: AccountType::Savings,
            allowance: AllowanceConfig::default(),
            interest: InterestConfig::default(),
            goal: None,
            ledger: Vec::new(),
            created_at: at(1),
        }
    }

    #[test]
    fn test_store_get_roundtrip() {
        let dir = tempdir().unwrap();
        let repo = AccountRepository::new(Arc::new(JsonConnection::new(dir.path()).unwrap()));

        let account = test_account();
        repo.store_account("Emma", &account).unwrap();
        let loaded = repo.get_account("Emma", "Piggy Bank").unwrap().unwrap();
        assert_eq!(loaded, account);
        assert!(repo.get_account("Emma", "Missing").unwrap().is_none());
    }

    #[test]
    fn test_append_resorts_ledger_ascending() {
        let dir = tempdir().unwrap();
        let repo = AccountRepository::new(Arc::new(JsonConnection::new(dir.path()).unwrap()));

        let mut account = test_account();
        account.ledger = vec![entry(5, 100)];
        repo.store_account("Emma", &account).unwrap();

        // A backdated accrual entry lands before the existing one.
        repo.append_ledger_entries("Emma", "Piggy Bank", &[entry(2, 10), entry(8, -20)])
            .unwrap();

        let loaded = repo.get_account("Emma", "Piggy Bank").unwrap().unwrap();
        let days: Vec<u32> = loaded
            .ledger
            .iter()
            .map(|e| chrono::Datelike::day(&e.timestamp.date()))
            .collect();
        assert_eq!(days, vec![2, 5, 8]);
    }

    #[test]
    fn test_append_to_missing_account_fails() {
        let dir = tempdir().unwrap();
        let repo = AccountRepository::new(Arc::new(JsonConnection::new(dir.path()).unwrap()));
        let result = repo.append_ledger_entries("Emma", "Ghost", &[entry(1, 10)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_accounts_ordered_by_creation() {
        let dir = tempdir().unwrap();
        let repo = AccountRepository::new(Arc::new(JsonConnection::new(dir.path()).unwrap()));

        let mut second = test_account();
        second.name = "Later".to_string();
        second.created_at = at(9);
        repo.store_account("Emma", &second).unwrap();
        repo.store_account("Emma", &test_account()).unwrap();

        let names: Vec<String> = repo
            .list_accounts("Emma")
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Piggy Bank".to_string(), "Later".to_string()]);
    }
}
