//! # JSON Storage Module
//!
//! File-per-key JSON storage backend. Each parent, child, and account is one
//! JSON document on disk; every write rotates the previous version into a
//! single `.bak` slot next to the document. Children are discovered by
//! scanning their directory, so the filesystem itself is the index.

pub mod account_repository;
pub mod child_repository;
pub mod connection;
pub mod parent_repository;

pub use account_repository::AccountRepository;
pub use child_repository::ChildRepository;
pub use connection::JsonConnection;
pub use parent_repository::ParentRepository;
