//! Accrual orchestration.
//!
//! Walks children and their accounts, runs the balance calculator per
//! account, appends the emitted ledger entries, then recomputes and persists
//! the child's balance snapshot. A child whose stored `calculated_at` lies in
//! the future (device clock moved backwards) is skipped whole and left
//! frozen; the condition is reported, not raised. Failures on one account or
//! child never abort the rest of the batch — the run is best-effort and the
//! report carries the per-entity errors.
//!
//! Callers are responsible for not overlapping runs; this service assumes
//! at most one run in flight.

use anyhow::Result;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::aggregation::child_total_balance;
use crate::domain::balance_calculator::calculate;
use crate::domain::clock::{Clock, SystemClock};
use crate::storage::json::{AccountRepository, ChildRepository, JsonConnection};
use crate::storage::traits::{AccountStorage, ChildStorage};

/// A failure on one account during a run. Collected, never propagated.
#[derive(Debug, Clone)]
pub struct AccountRunError {
    pub account_name: String,
    pub message: String,
}

/// Outcome of processing one child.
#[derive(Debug, Clone)]
pub struct ChildRunReport {
    pub child_name: String,
    /// True when the device clock was behind the stored snapshot and the
    /// child was left untouched. Self-resolves once the clock catches up.
    pub skipped_clock_skew: bool,
    pub accounts_processed: usize,
    pub accruals_posted: usize,
    pub new_balance: i64,
    pub calculated_at: NaiveDateTime,
    pub errors: Vec<AccountRunError>,
}

/// A failure that prevented a child from being processed at all.
#[derive(Debug, Clone)]
pub struct ChildRunError {
    pub child_name: String,
    pub message: String,
}

/// Outcome of a full run across all children.
#[derive(Debug, Clone, Default)]
pub struct BatchRunReport {
    pub children: Vec<ChildRunReport>,
    pub errors: Vec<ChildRunError>,
}

/// Service that re-derives balances from ledgers on demand.
#[derive(Clone)]
pub struct AccrualService {
    account_repository: AccountRepository,
    child_repository: ChildRepository,
    clock: Arc<dyn Clock>,
}

impl AccrualService {
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

    /// Process one child: accrue every account since the child's last
    /// calculation, then recompute and persist the balance snapshot.
    pub fn run_for_child(&self, child_name: &str) -> Result<ChildRunReport> {
        let child = self
            .child_repository
            .get_child(child_name)?
            .ok_or_else(|| anyhow::anyhow!("Child not found: {}", child_name))?;
        let now = self.clock.now();

        if now < child.calculated_at {
            warn!(
                "Clock skew for child {}: now {} precedes checkpoint {}, skipping",
                child.name, now, child.calculated_at
            );
            return Ok(ChildRunReport {
                child_name: child.name,
                skipped_clock_skew: true,
                accounts_processed: 0,
                accruals_posted: 0,
                new_balance: child.current_balance,
                calculated_at: child.calculated_at,
                errors: Vec::new(),
            });
        }

        let accounts = self.account_repository.list_accounts(child_name)?;
        let mut errors = Vec::new();
        let mut accruals_posted = 0;

        for account in &accounts {
            let outcome = calculate(account, child.calculated_at, now);
            if outcome.ledger_entries.is_empty() {
                continue;
            }
            match self.account_repository.append_ledger_entries(
                child_name,
                &account.name,
                &outcome.ledger_entries,
            ) {
                Ok(()) => {
                    info!(
                        "Posted {} accruals to {} (child {})",
                        outcome.accruals.len(),
                        account.name,
                        child_name
                    );
                    accruals_posted += outcome.accruals.len();
                }
                Err(err) => {
                    warn!(
                        "Failed to post accruals to {} (child {}): {:#}",
                        account.name, child_name, err
                    );
                    errors.push(AccountRunError {
                        account_name: account.name.clone(),
                        message: format!("{:#}", err),
                    });
                }
            }
        }

        // Full re-derivation: re-read the accounts so the total reflects what
        // actually landed on disk, achieved goals excluded.
        let updated_accounts = self.account_repository.list_accounts(child_name)?;
        let total = child_total_balance(&updated_accounts);
        self.child_repository.set_child_balance(child_name, total, now)?;

        info!(
            "Child {} recalculated: balance {} as of {} ({} accruals, {} errors)",
            child_name,
            total,
            now,
            accruals_posted,
            errors.len()
        );
        Ok(ChildRunReport {
            child_name: child.name,
            skipped_clock_skew: false,
            accounts_processed: accounts.len(),
            accruals_posted,
            new_balance: total,
            calculated_at: now,
            errors,
        })
    }

    /// Process every child, continuing past per-child failures.
    pub fn run_for_all(&self) -> Result<BatchRunReport> {
        let children = self.child_repository.list_children()?;
        info!("Accrual run over {} children", children.len());

        let mut report = BatchRunReport::default();
        for child in children {
            match self.run_for_child(&child.name) {
                Ok(child_report) => report.children.push(child_report),
                Err(err) => {
                    warn!("Failed to process child {}: {:#}", child.name, err);
                    report.errors.push(ChildRunError {
                        child_name: child.name,
                        message: format!("{:#}", err),
                    });
                }
            }
        }
        Ok(report)
    }
}
