//! Inventory engine error types.

use thiserror::Error;

use crate::state::AdjustmentState;

/// Errors that can occur before or around an adjustment run.
///
/// Gateway failures are not errors at this level: they are recorded as
/// failed outcomes inside the returned `BatchResult`.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The batch was rejected before any gateway call was made.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// An adjustment run attempted an illegal state transition.
    #[error("Invalid adjustment state transition: {from} -> {to}")]
    InvalidTransition {
        from: AdjustmentState,
        to: AdjustmentState,
    },
}

/// Convenience type alias for inventory results.
pub type Result<T> = std::result::Result<T, InventoryError>;
