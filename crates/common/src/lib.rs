//! Shared identifiers used across the inventory adjustment crates.

mod types;

pub use types::{OrderId, ProductId};
