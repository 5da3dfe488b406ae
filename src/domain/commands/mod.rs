//! Command and result types for the domain services.
//!
//! Each service operation takes a command struct and returns a result struct,
//! keeping the service signatures stable as operations grow fields.

pub mod account;
pub mod child;
pub mod parent;
