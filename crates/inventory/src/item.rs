//! Line items and order batches.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// A single product adjustment within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product whose stock is adjusted.
    pub product_id: ProductId,
    /// Units to adjust. Must be greater than zero.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// The ordered line items of one order, one entry per distinct product.
///
/// The engine does not deduplicate: callers holding raw order lines should
/// build the batch with [`OrderBatch::merged`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBatch {
    items: Vec<LineItem>,
}

impl OrderBatch {
    /// Creates a batch from line items, kept in the given order.
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Creates a batch, summing the quantities of repeated products.
    ///
    /// Each product keeps the position of its first appearance.
    pub fn merged(items: impl IntoIterator<Item = LineItem>) -> Result<Self> {
        let mut merged: Vec<LineItem> = Vec::new();

        for item in items {
            match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                Some(existing) => {
                    existing.quantity =
                        existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                            InventoryError::InvalidBatch(format!(
                                "quantity overflow for product {}",
                                item.product_id
                            ))
                        })?;
                }
                None => merged.push(item),
            }
        }

        Ok(Self { items: merged })
    }

    /// Returns the line items in order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the batch has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checks the batch can be handed to the gateway.
    ///
    /// Rejects an empty batch and any zero quantity.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(InventoryError::InvalidBatch(
                "batch contains no line items".to_string(),
            ));
        }

        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(InventoryError::InvalidBatch(format!(
                "line item for product {} has non-positive quantity",
                item.product_id
            )));
        }

        Ok(())
    }
}

impl FromIterator<LineItem> for OrderBatch {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
