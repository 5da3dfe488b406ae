//! Storage layer: abstraction traits plus the JSON file backend.

pub mod json;
pub mod traits;

pub use traits::{AccountStorage, ChildStorage, ParentStorage};
