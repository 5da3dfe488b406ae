//! Domain models for the pocket bank ownership tree:
//! parents own children, children own accounts, accounts own ledger entries.

pub mod account;
pub mod child;
pub mod parent;
