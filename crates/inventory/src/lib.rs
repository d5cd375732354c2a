//! Order-driven inventory adjustment.
//!
//! Placing an order decrements stock for every line item; cancelling it
//! restores stock. Each item is an independent gateway call, so a batch can
//! partially fail. The engine:
//! 1. Fans the per-item calls out concurrently and records every outcome
//! 2. Plans a reversing batch for the items that succeeded
//! 3. Executes that batch and reports whether inventory is consistent again
//!
//! Only `FullSuccess` means the order's stock was fully applied.

pub mod engine;
pub mod error;
pub mod executor;
pub mod item;
pub mod outcome;
pub mod planner;
pub mod state;

pub use common::ProductId;
pub use engine::InventoryEngine;
pub use error::{InventoryError, Result};
pub use executor::BatchExecutor;
pub use item::{LineItem, OrderBatch};
pub use outcome::{BatchResult, Direction, ItemOutcome, OutcomeStatus, OverallStatus};
pub use planner::{CompensationPlan, CompensationPlanner};
pub use state::AdjustmentState;
