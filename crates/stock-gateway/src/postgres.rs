use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    GatewayError, ProductId, Result,
    gateway::{StockGateway, validate_level, validate_quantity},
};

/// PostgreSQL-backed stock gateway.
///
/// Each mutation is a single `UPDATE` statement, so row-level locking gives
/// per-product atomicity and serializes concurrent mutations of one product.
#[derive(Clone)]
pub struct PostgresStockGateway {
    pool: PgPool,
}

impl PostgresStockGateway {
    /// Creates a new PostgreSQL stock gateway.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StockGateway for PostgresStockGateway {
    async fn decrement(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        validate_quantity(product_id, quantity)?;

        // The guard in the WHERE clause makes the check-and-update one statement.
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stock
            SET quantity = quantity - $2, updated_at = NOW()
            WHERE product_id = $1 AND quantity >= $2
            RETURNING quantity
            "#,
        )
        .bind(product_id.as_str())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(level) = remaining {
            tracing::trace!(%product_id, quantity, level, "stock decremented");
            return Ok(());
        }

        match self.stock_level(product_id).await? {
            Some(available) => Err(GatewayError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available,
            }),
            None => Err(GatewayError::ProductNotFound(product_id.clone())),
        }
    }

    async fn increment(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        validate_quantity(product_id, quantity)?;

        let level: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stock
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE product_id = $1
            RETURNING quantity
            "#,
        )
        .bind(product_id.as_str())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        match level {
            Some(level) => {
                tracing::trace!(%product_id, quantity, level, "stock incremented");
                Ok(())
            }
            None => Err(GatewayError::ProductNotFound(product_id.clone())),
        }
    }

    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>> {
        let level: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM stock WHERE product_id = $1")
                .bind(product_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(level)
    }

    async fn set_stock_level(&self, product_id: &ProductId, level: i64) -> Result<()> {
        validate_level(product_id, level)?;

        sqlx::query(
            r#"
            INSERT INTO stock (product_id, quantity, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (product_id) DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product_id.as_str())
        .bind(level)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
