use thiserror::Error;

use crate::ProductId;

/// Errors returned by a single stock mutation or lookup.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The product does not hold enough stock for the requested decrement.
    /// Stock is never clamped to zero.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// The product is unknown to the gateway.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The quantity is not a valid mutation amount.
    #[error("Invalid quantity for product {product_id}: {quantity}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// The increment would push the level past what the backend can hold.
    #[error("Stock overflow for product {product_id}: level {level}, increment {quantity}")]
    StockOverflow {
        product_id: ProductId,
        level: i64,
        quantity: u32,
    },

    /// The backend could not be reached or refused the call.
    #[error("Stock gateway unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl GatewayError {
    /// Short machine-readable kind, used for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InsufficientStock { .. } => "insufficient_stock",
            GatewayError::ProductNotFound(_) => "product_not_found",
            GatewayError::InvalidQuantity { .. } => "invalid_quantity",
            GatewayError::StockOverflow { .. } => "stock_overflow",
            GatewayError::Unavailable(_) => "unavailable",
            GatewayError::Database(_) => "database",
            GatewayError::Migration(_) => "migration",
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_product_and_amounts() {
        let err = GatewayError::InsufficientStock {
            product_id: ProductId::new("p2"),
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p2: requested 3, available 1"
        );
        assert_eq!(err.kind(), "insufficient_stock");
    }

    #[test]
    fn product_not_found_kind() {
        let err = GatewayError::ProductNotFound(ProductId::new("ghost"));
        assert_eq!(err.kind(), "product_not_found");
        assert_eq!(err.to_string(), "Product not found: ghost");
    }
}
