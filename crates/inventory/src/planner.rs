//! Compensation planning for partially applied batches.

use crate::item::LineItem;
use crate::outcome::{BatchResult, Direction};

/// The reversing batch for a partially applied batch.
///
/// Only built while handling a failure; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationPlan {
    direction: Direction,
    items: Vec<LineItem>,
}

impl CompensationPlan {
    /// Direction the reversing calls run in.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Items to reverse, in the original batch order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds compensation plans from settled batch results.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensationPlanner;

impl CompensationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Selects the succeeded items of `result` and inverts their direction.
    ///
    /// Failed items are left out: the gateway guarantees they changed nothing.
    pub fn plan(&self, result: &BatchResult) -> CompensationPlan {
        let items = result
            .outcomes()
            .iter()
            .filter(|outcome| outcome.is_success())
            .map(|outcome| outcome.item().clone())
            .collect();

        CompensationPlan {
            direction: result.direction().inverse(),
            items,
        }
    }
}
