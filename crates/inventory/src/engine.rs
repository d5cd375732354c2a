//! Inventory adjustment engine.

use std::time::Instant;

use stock_gateway::StockGateway;

use crate::error::Result;
use crate::executor::BatchExecutor;
use crate::item::OrderBatch;
use crate::outcome::{BatchResult, Direction, OverallStatus};
use crate::planner::CompensationPlanner;
use crate::state::AdjustmentState;

/// Applies and reverses the stock changes of whole orders.
///
/// The engine holds no state between calls: every invocation validates its
/// batch, runs it through the executor and returns a fresh `BatchResult`.
/// Gateway failures are never retried. The only automatic recovery is
/// reversing the items that did succeed when an order's decrement batch
/// partially fails.
pub struct InventoryEngine<G> {
    executor: BatchExecutor<G>,
    planner: CompensationPlanner,
}

impl<G> InventoryEngine<G>
where
    G: StockGateway,
{
    /// Creates a new engine over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self {
            executor: BatchExecutor::new(gateway),
            planner: CompensationPlanner::new(),
        }
    }

    /// Returns the underlying gateway.
    pub fn gateway(&self) -> &G {
        self.executor.gateway()
    }

    /// Decrements stock for every item of a placed order.
    ///
    /// If any decrement fails, the successful ones are reversed before the
    /// result is returned. Only an invalid batch is returned as an error;
    /// gateway failures are reported through the result's outcomes.
    #[tracing::instrument(skip(self, batch), fields(items = batch.len()))]
    pub async fn apply_order(&self, batch: &OrderBatch) -> Result<BatchResult> {
        batch.validate()?;
        let started = Instant::now();
        let mut state = AdjustmentState::Pending;

        state.advance(AdjustmentState::Decrementing)?;
        let result = self
            .executor
            .execute(batch.items(), Direction::Decrement)
            .await;

        if result.is_full_success() {
            state.advance(AdjustmentState::Done(OverallStatus::FullSuccess))?;
            record("apply", &result, started);
            return Ok(result);
        }

        // Compensation starts only after the whole decrement batch settled.
        state.advance(AdjustmentState::Compensating)?;
        let plan = self.planner.plan(&result);
        tracing::warn!(
            failed = result.failures().count(),
            to_reverse = plan.len(),
            "decrement batch partially failed, compensating"
        );

        let compensation = if plan.is_empty() {
            Vec::new()
        } else {
            self.executor
                .execute(plan.items(), plan.direction())
                .await
                .into_outcomes()
        };

        let result = result.with_compensation(compensation);
        state.advance(AdjustmentState::Done(result.overall_status()))?;
        record("apply", &result, started);
        Ok(result)
    }

    /// Restores stock for every item of a cancelled order.
    ///
    /// There is no fallback direction, so failed restores are reported as-is
    /// and the result is `UncompensatedFailure`.
    #[tracing::instrument(skip(self, batch), fields(items = batch.len()))]
    pub async fn reverse_order(&self, batch: &OrderBatch) -> Result<BatchResult> {
        batch.validate()?;
        let started = Instant::now();
        let mut state = AdjustmentState::Pending;

        state.advance(AdjustmentState::Restoring)?;
        let result = self
            .executor
            .execute(batch.items(), Direction::Increment)
            .await;

        state.advance(AdjustmentState::Done(result.overall_status()))?;
        record("reverse", &result, started);
        Ok(result)
    }
}

fn record(operation: &'static str, result: &BatchResult, started: Instant) {
    let status = result.overall_status();

    metrics::counter!(
        "inventory_adjustments_total",
        "operation" => operation,
        "status" => status.as_str()
    )
    .increment(1);
    metrics::histogram!("inventory_adjustment_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());

    match status {
        OverallStatus::FullSuccess => {
            tracing::info!(operation, items = result.outcomes().len(), "stock adjusted");
        }
        OverallStatus::CompensatedFailure => {
            tracing::warn!(
                operation,
                failed = result.failures().count(),
                reversed = result.compensation().len(),
                "stock adjustment failed, compensation restored inventory"
            );
        }
        OverallStatus::UncompensatedFailure => {
            metrics::counter!("inventory_uncompensated_total").increment(1);
            let products: Vec<String> = result
                .inconsistent_products()
                .iter()
                .map(|p| p.to_string())
                .collect();
            tracing::error!(
                operation,
                inconsistent_products = ?products,
                "stock adjustment left inventory inconsistent, manual reconciliation required"
            );
        }
    }
}
