//! Concurrent fan-out of per-item gateway calls.

use futures_util::future::join_all;
use stock_gateway::StockGateway;

use crate::item::LineItem;
use crate::outcome::{BatchResult, Direction, ItemOutcome};

/// Issues one gateway call per line item and collects every outcome.
///
/// All calls of a batch run concurrently. `execute` only returns once every
/// call has settled, so a failure never hides the outcome of its siblings.
pub struct BatchExecutor<G> {
    gateway: G,
}

impl<G> BatchExecutor<G>
where
    G: StockGateway,
{
    /// Creates a new batch executor over the given gateway.
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Returns the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Applies `direction` to every item and returns their outcomes in input order.
    pub async fn execute(&self, items: &[LineItem], direction: Direction) -> BatchResult {
        let calls = items.iter().map(|item| self.apply_item(item, direction));
        let outcomes = join_all(calls).await;
        BatchResult::settled(direction, outcomes)
    }

    async fn apply_item(&self, item: &LineItem, direction: Direction) -> ItemOutcome {
        let result = match direction {
            Direction::Decrement => {
                self.gateway
                    .decrement(&item.product_id, item.quantity)
                    .await
            }
            Direction::Increment => {
                self.gateway
                    .increment(&item.product_id, item.quantity)
                    .await
            }
        };

        match result {
            Ok(()) => {
                metrics::counter!(
                    "inventory_gateway_calls_total",
                    "direction" => direction.as_str(),
                    "status" => "success"
                )
                .increment(1);
                tracing::debug!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    %direction,
                    "stock mutation applied"
                );
                ItemOutcome::success(item.clone(), direction)
            }
            Err(e) => {
                metrics::counter!(
                    "inventory_gateway_calls_total",
                    "direction" => direction.as_str(),
                    "status" => e.kind()
                )
                .increment(1);
                tracing::debug!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    %direction,
                    error = %e,
                    "stock mutation failed"
                );
                ItemOutcome::failure(item.clone(), direction, e.to_string())
            }
        }
    }
}
