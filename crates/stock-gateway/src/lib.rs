//! Stock mutation gateway.
//!
//! The gateway is the only path through which per-product stock changes.
//! Every mutation is atomic for a single product; nothing is atomic across
//! products, which is why batches are coordinated one level up.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod postgres;

pub use common::ProductId;
pub use error::{GatewayError, Result};
pub use gateway::{StockGateway, validate_quantity};
pub use memory::InMemoryStockGateway;
pub use postgres::PostgresStockGateway;
