//! Per-item outcomes and batch results.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::item::LineItem;

/// Direction of a stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Stock is removed (order placement).
    Decrement,
    /// Stock is added back (cancellation or compensation).
    Increment,
}

impl Direction {
    /// Returns the direction that undoes this one.
    pub fn inverse(&self) -> Direction {
        match self {
            Direction::Decrement => Direction::Increment,
            Direction::Increment => Direction::Decrement,
        }
    }

    /// Returns the direction name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Decrement => "Decrement",
            Direction::Increment => "Increment",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a single gateway call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// The recorded result of one item's mutation attempt.
///
/// Fields are private so an outcome cannot change once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    item: LineItem,
    direction: Direction,
    status: OutcomeStatus,
    error_detail: Option<String>,
    settled_at: DateTime<Utc>,
}

impl ItemOutcome {
    /// Records a successful mutation.
    pub fn success(item: LineItem, direction: Direction) -> Self {
        Self {
            item,
            direction,
            status: OutcomeStatus::Success,
            error_detail: None,
            settled_at: Utc::now(),
        }
    }

    /// Records a failed mutation with the gateway's error detail.
    pub fn failure(item: LineItem, direction: Direction, detail: impl Into<String>) -> Self {
        Self {
            item,
            direction,
            status: OutcomeStatus::Failure,
            error_detail: Some(detail.into()),
            settled_at: Utc::now(),
        }
    }

    pub fn item(&self) -> &LineItem {
        &self.item
    }

    pub fn product_id(&self) -> &ProductId {
        &self.item.product_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// When the gateway call settled.
    pub fn settled_at(&self) -> DateTime<Utc> {
        self.settled_at
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregate verdict for one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallStatus {
    /// Every item was applied.
    FullSuccess,
    /// Some items failed, and every applied item was reversed.
    /// Inventory is consistent but the order must be aborted.
    CompensatedFailure,
    /// Some items failed and inventory may not match the order.
    /// Needs manual reconciliation.
    UncompensatedFailure,
}

impl OverallStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::FullSuccess => "FullSuccess",
            OverallStatus::CompensatedFailure => "CompensatedFailure",
            OverallStatus::UncompensatedFailure => "UncompensatedFailure",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcomes of one executed batch, plus its compensation batch if one ran.
///
/// The overall status is derived from the outcomes on every call and is
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    direction: Direction,
    outcomes: Vec<ItemOutcome>,
    compensation: Option<Vec<ItemOutcome>>,
}

impl BatchResult {
    /// Creates a result for a settled batch with no compensation step.
    pub fn settled(direction: Direction, outcomes: Vec<ItemOutcome>) -> Self {
        Self {
            direction,
            outcomes,
            compensation: None,
        }
    }

    /// Returns a new result carrying the outcomes of a compensation batch.
    ///
    /// An empty `compensation` means there was nothing to reverse.
    pub fn with_compensation(self, compensation: Vec<ItemOutcome>) -> Self {
        Self {
            compensation: Some(compensation),
            ..self
        }
    }

    /// Direction of the primary batch.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Outcomes of the primary batch, in input order.
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Outcomes of the compensation batch, in input order. Empty if none ran.
    pub fn compensation(&self) -> &[ItemOutcome] {
        self.compensation.as_deref().unwrap_or_default()
    }

    /// Returns true if a compensation step was part of this result.
    pub fn was_compensated(&self) -> bool {
        self.compensation.is_some()
    }

    /// Consumes the result, returning the primary outcomes.
    pub fn into_outcomes(self) -> Vec<ItemOutcome> {
        self.outcomes
    }

    pub fn overall_status(&self) -> OverallStatus {
        if self.outcomes.iter().all(ItemOutcome::is_success) {
            return OverallStatus::FullSuccess;
        }

        match &self.compensation {
            Some(compensation) if compensation.iter().all(ItemOutcome::is_success) => {
                OverallStatus::CompensatedFailure
            }
            _ => OverallStatus::UncompensatedFailure,
        }
    }

    pub fn is_full_success(&self) -> bool {
        self.overall_status() == OverallStatus::FullSuccess
    }

    /// Returns true if inventory may be inconsistent and an operator must step in.
    pub fn requires_escalation(&self) -> bool {
        self.overall_status() == OverallStatus::UncompensatedFailure
    }

    /// Primary outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Products whose stock may no longer match the order.
    ///
    /// With compensation these are the items whose reversal failed; without
    /// it, the items whose primary mutation failed.
    pub fn inconsistent_products(&self) -> Vec<&ProductId> {
        if self.is_full_success() {
            return Vec::new();
        }

        let source = match &self.compensation {
            Some(compensation) => compensation.as_slice(),
            None => self.outcomes.as_slice(),
        };

        source
            .iter()
            .filter(|o| !o.is_success())
            .map(ItemOutcome::product_id)
            .collect()
    }
}
