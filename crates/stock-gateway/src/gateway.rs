use async_trait::async_trait;

use crate::{GatewayError, ProductId, Result};

/// Core trait for stock gateway implementations.
///
/// Each mutation is atomic for the single product it targets: it either
/// applies the full quantity or leaves stock untouched. Mutations are not
/// idempotent; calling `decrement` twice removes stock twice.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait StockGateway: Send + Sync {
    /// Removes `quantity` units from the product's stock.
    ///
    /// Fails with `InsufficientStock` rather than going below zero.
    async fn decrement(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Adds `quantity` units to the product's stock.
    async fn increment(&self, product_id: &ProductId, quantity: u32) -> Result<()>;

    /// Returns the current stock level, or `None` for an unknown product.
    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>>;

    /// Sets the product's stock level, registering the product if needed.
    async fn set_stock_level(&self, product_id: &ProductId, level: i64) -> Result<()>;
}

/// Rejects a zero mutation amount before it reaches a backend.
pub fn validate_quantity(product_id: &ProductId, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(GatewayError::InvalidQuantity {
            product_id: product_id.clone(),
            quantity: 0,
        });
    }
    Ok(())
}

/// Rejects a negative stock level.
pub(crate) fn validate_level(product_id: &ProductId, level: i64) -> Result<()> {
    if level < 0 {
        return Err(GatewayError::InvalidQuantity {
            product_id: product_id.clone(),
            quantity: level,
        });
    }
    Ok(())
}
