//! # pocketbank
//!
//! An on-device child "bank": a parent manages children, each child owns
//! Savings or Goal accounts that accrue allowance and interest on a schedule,
//! support deposits, capped withdrawals and transfers, and recompute balances
//! deterministically from an append-only ledger.
//!
//! The interesting part is the accrual engine: [`domain::schedule`] turns a
//! last-calculation instant and "now" into the exact local-midnight instants
//! at which accruals came due, and [`domain::balance_calculator`] replays
//! them in chronological order (interest before allowance within a period,
//! every amount rounded up to a whole currency unit) to re-derive an
//! account's ledger. [`domain::accrual_service::AccrualService`] drives that
//! over storage and maintains each child's cached balance snapshot, skipping
//! children whose stored checkpoint lies in the future of the device clock.
//!
//! All time is device-local and flows through an injectable
//! [`domain::clock::Clock`], so every calculation is deterministic under
//! test.

pub mod domain;
pub mod storage;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use domain::clock::{Clock, SystemClock};
use domain::{AccountService, AccrualService, ChildService, ParentService};
pub use storage::json::JsonConnection;

/// All services wired over one storage connection.
pub struct Bank {
    pub parent_service: ParentService,
    pub child_service: ChildService,
    pub account_service: AccountService,
    pub accrual_service: AccrualService,
}

impl Bank {
    /// Open (or create) a bank rooted at `base_directory`, using the device
    /// clock.
    pub fn new(base_directory: impl Into<PathBuf>) -> Result<Self> {
        let connection = Arc::new(JsonConnection::new(base_directory)?);
        Ok(Self::with_clock(connection, Arc::new(SystemClock)))
    }

    /// Wire the services over an existing connection and clock. Tests use
    /// this with a fixed clock.
    pub fn with_clock(connection: Arc<JsonConnection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            parent_service: ParentService::with_clock(connection.clone(), clock.clone()),
            child_service: ChildService::with_clock(connection.clone(), clock.clone()),
            account_service: AccountService::with_clock(connection.clone(), clock.clone()),
            accrual_service: AccrualService::with_clock(connection, clock),
        }
    }
}
