//! Domain layer: models, the pure accrual engine, and the services that
//! orchestrate it over storage.

pub mod account_service;
pub mod accrual_service;
pub mod aggregation;
pub mod balance_calculator;
pub mod child_service;
pub mod clock;
pub mod commands;
pub mod models;
pub mod parent_service;
pub mod rounding;
pub mod schedule;

pub use account_service::AccountService;
pub use accrual_service::AccrualService;
pub use child_service::ChildService;
pub use parent_service::ParentService;
