use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    GatewayError, ProductId, Result,
    gateway::{StockGateway, validate_level, validate_quantity},
};

#[derive(Debug, Default)]
struct InMemoryStockState {
    levels: HashMap<ProductId, i64>,
    failing_decrements: HashSet<ProductId>,
    failing_increments: HashSet<ProductId>,
    delays: HashMap<ProductId, Duration>,
    calls: usize,
}

/// In-memory stock gateway.
///
/// Every mutation takes the write lock for its check-and-update, so a single
/// product's adjustment is atomic while different calls may interleave.
/// Failure and latency injection hooks make it usable as a test double.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockGateway {
    state: Arc<RwLock<InMemoryStockState>>,
}

impl InMemoryStockGateway {
    /// Creates an empty in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway seeded with the given stock levels.
    pub fn with_stock<I, P>(levels: I) -> Self
    where
        I: IntoIterator<Item = (P, i64)>,
        P: Into<ProductId>,
    {
        let state = InMemoryStockState {
            levels: levels.into_iter().map(|(p, l)| (p.into(), l)).collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Makes every decrement of `product_id` fail with `Unavailable`.
    pub async fn fail_decrements_for(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .await
            .failing_decrements
            .insert(product_id.into());
    }

    /// Makes every increment of `product_id` fail with `Unavailable`.
    pub async fn fail_increments_for(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .await
            .failing_increments
            .insert(product_id.into());
    }

    /// Removes all injected failures.
    pub async fn clear_failures(&self) {
        let mut state = self.state.write().await;
        state.failing_decrements.clear();
        state.failing_increments.clear();
    }

    /// Delays every mutation of `product_id` by `delay` before it is applied.
    pub async fn set_delay(&self, product_id: impl Into<ProductId>, delay: Duration) {
        self.state
            .write()
            .await
            .delays
            .insert(product_id.into(), delay);
    }

    /// Returns the number of mutation calls received, failed ones included.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }

    /// Returns the current level of every known product.
    pub async fn snapshot(&self) -> HashMap<ProductId, i64> {
        self.state.read().await.levels.clone()
    }

    async fn admit_call(&self, product_id: &ProductId) {
        let delay = {
            let mut state = self.state.write().await;
            state.calls += 1;
            state.delays.get(product_id).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl StockGateway for InMemoryStockGateway {
    async fn decrement(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.admit_call(product_id).await;
        validate_quantity(product_id, quantity)?;

        let mut state = self.state.write().await;

        if state.failing_decrements.contains(product_id) {
            return Err(GatewayError::Unavailable(format!(
                "decrement rejected for product {product_id}"
            )));
        }

        let level = state
            .levels
            .get_mut(product_id)
            .ok_or_else(|| GatewayError::ProductNotFound(product_id.clone()))?;

        let requested = i64::from(quantity);
        if *level < requested {
            return Err(GatewayError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available: *level,
            });
        }

        *level -= requested;
        tracing::trace!(%product_id, quantity, level = *level, "stock decremented");
        Ok(())
    }

    async fn increment(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.admit_call(product_id).await;
        validate_quantity(product_id, quantity)?;

        let mut state = self.state.write().await;

        if state.failing_increments.contains(product_id) {
            return Err(GatewayError::Unavailable(format!(
                "increment rejected for product {product_id}"
            )));
        }

        let level = state
            .levels
            .get_mut(product_id)
            .ok_or_else(|| GatewayError::ProductNotFound(product_id.clone()))?;

        let current = *level;
        *level = current
            .checked_add(i64::from(quantity))
            .ok_or_else(|| GatewayError::StockOverflow {
                product_id: product_id.clone(),
                level: current,
                quantity,
            })?;
        tracing::trace!(%product_id, quantity, level = *level, "stock incremented");
        Ok(())
    }

    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>> {
        Ok(self.state.read().await.levels.get(product_id).copied())
    }

    async fn set_stock_level(&self, product_id: &ProductId, level: i64) -> Result<()> {
        validate_level(product_id, level)?;
        self.state
            .write()
            .await
            .levels
            .insert(product_id.clone(), level);
        Ok(())
    }
}
