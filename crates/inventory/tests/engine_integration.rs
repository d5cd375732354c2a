//! Integration tests for the inventory adjustment engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use inventory::{
    Direction, InventoryEngine, InventoryError, LineItem, OrderBatch, OutcomeStatus,
    OverallStatus, ProductId,
};
use stock_gateway::{InMemoryStockGateway, StockGateway};

struct TestHarness {
    engine: InventoryEngine<InMemoryStockGateway>,
    gateway: InMemoryStockGateway,
}

impl TestHarness {
    fn new(levels: &[(&str, i64)]) -> Self {
        let gateway = InMemoryStockGateway::with_stock(levels.iter().copied());
        Self {
            engine: InventoryEngine::new(gateway.clone()),
            gateway,
        }
    }

    /// A catalog of `count` products, each holding `level` units.
    fn with_catalog(count: usize, level: i64) -> Self {
        let ids: Vec<String> = (0..count).map(|i| format!("SKU-{i:03}")).collect();
        let gateway = InMemoryStockGateway::with_stock(ids.into_iter().map(|id| (id, level)));
        Self {
            engine: InventoryEngine::new(gateway.clone()),
            gateway,
        }
    }

    async fn levels(&self) -> HashMap<ProductId, i64> {
        self.gateway.snapshot().await
    }

    async fn level(&self, id: &str) -> i64 {
        self.gateway
            .stock_level(&ProductId::new(id))
            .await
            .unwrap()
            .unwrap()
    }
}

fn batch(items: &[(&str, u32)]) -> OrderBatch {
    items
        .iter()
        .map(|&(id, qty)| LineItem::new(id, qty))
        .collect()
}

fn catalog_batch(count: usize) -> OrderBatch {
    (0..count)
        .map(|i| LineItem::new(format!("SKU-{i:03}"), (i % 4 + 1) as u32))
        .collect()
}

#[tokio::test]
async fn full_success_decrements_every_item_by_its_quantity() {
    for size in [1, 2, 5, 12] {
        let harness = TestHarness::with_catalog(size, 100);
        let before = harness.levels().await;
        let order = catalog_batch(size);

        let result = harness.engine.apply_order(&order).await.unwrap();

        assert_eq!(result.overall_status(), OverallStatus::FullSuccess);
        assert_eq!(result.outcomes().len(), size);
        assert!(result.compensation().is_empty());

        let after = harness.levels().await;
        for item in order.items() {
            assert_eq!(
                after[&item.product_id],
                before[&item.product_id] - i64::from(item.quantity)
            );
        }
    }
}

#[tokio::test]
async fn single_failure_is_compensated_to_net_zero() {
    for size in [2, 3, 8] {
        for failing in 0..size {
            let harness = TestHarness::with_catalog(size, 100);
            let failing_id = format!("SKU-{failing:03}");
            harness.gateway.fail_decrements_for(failing_id.as_str()).await;
            let before = harness.levels().await;

            let result = harness.engine.apply_order(&catalog_batch(size)).await.unwrap();

            assert_eq!(result.overall_status(), OverallStatus::CompensatedFailure);
            assert_eq!(result.failures().count(), 1);
            assert_eq!(result.compensation().len(), size - 1);
            assert!(
                result
                    .compensation()
                    .iter()
                    .all(|o| o.product_id().as_str() != failing_id)
            );
            assert_eq!(harness.levels().await, before);
        }
    }
}

#[tokio::test]
async fn failed_compensation_identifies_inconsistent_item() {
    let harness = TestHarness::new(&[("p1", 10), ("p2", 10), ("p3", 1)]);
    harness.gateway.fail_increments_for("p2").await;

    let result = harness
        .engine
        .apply_order(&batch(&[("p1", 2), ("p2", 4), ("p3", 5)]))
        .await
        .unwrap();

    assert_eq!(result.overall_status(), OverallStatus::UncompensatedFailure);
    assert!(result.requires_escalation());

    // Both the original and the compensation outcomes are reported.
    assert_eq!(result.outcomes().len(), 3);
    assert_eq!(result.compensation().len(), 2);
    let failed_restore = result
        .compensation()
        .iter()
        .find(|o| !o.is_success())
        .unwrap();
    assert_eq!(failed_restore.product_id(), &ProductId::new("p2"));
    assert_eq!(failed_restore.direction(), Direction::Increment);
    assert!(failed_restore.error_detail().is_some());
    assert_eq!(result.inconsistent_products(), vec![&ProductId::new("p2")]);

    assert_eq!(harness.level("p1").await, 10);
    assert_eq!(harness.level("p2").await, 6);
    assert_eq!(harness.level("p3").await, 1);
}

#[tokio::test]
async fn reverse_order_twice_yields_independent_results() {
    let harness = TestHarness::new(&[("p1", 0), ("p2", 0)]);
    let order = batch(&[("p1", 2), ("p2", 3)]);

    let first = harness.engine.reverse_order(&order).await.unwrap();
    let second = harness.engine.reverse_order(&order).await.unwrap();

    assert_eq!(first.overall_status(), OverallStatus::FullSuccess);
    assert_eq!(second.overall_status(), OverallStatus::FullSuccess);
    assert_eq!(first.outcomes().len(), 2);
    assert_eq!(second.outcomes().len(), 2);
    assert_eq!(harness.level("p1").await, 4);
    assert_eq!(harness.level("p2").await, 6);
    assert_eq!(harness.gateway.call_count().await, 4);
}

#[tokio::test]
async fn outcome_order_matches_input_under_varied_delays() {
    let size = 10;
    let harness = TestHarness::with_catalog(size, 100);

    // Scrambled delays so calls complete in a different order than issued.
    for i in 0..size {
        let millis = ((i * 7 + 3) % size) as u64 * 5;
        harness
            .gateway
            .set_delay(format!("SKU-{i:03}"), Duration::from_millis(millis))
            .await;
    }
    harness.gateway.fail_decrements_for("SKU-004").await;

    let order = catalog_batch(size);
    let result = harness.engine.apply_order(&order).await.unwrap();

    let outcome_items: Vec<&LineItem> = result.outcomes().iter().map(|o| o.item()).collect();
    let input_items: Vec<&LineItem> = order.items().iter().collect();
    assert_eq!(outcome_items, input_items);

    let expected_compensation: Vec<&LineItem> = order
        .items()
        .iter()
        .filter(|item| item.product_id.as_str() != "SKU-004")
        .collect();
    let compensation_items: Vec<&LineItem> =
        result.compensation().iter().map(|o| o.item()).collect();
    assert_eq!(compensation_items, expected_compensation);
}

#[tokio::test]
async fn invalid_batches_are_rejected_before_any_call() {
    let harness = TestHarness::new(&[("p1", 10)]);

    let empty = harness.engine.apply_order(&batch(&[])).await;
    assert!(matches!(empty, Err(InventoryError::InvalidBatch(_))));

    let zero = harness.engine.apply_order(&batch(&[("p1", 0)])).await;
    assert!(matches!(zero, Err(InventoryError::InvalidBatch(_))));

    assert_eq!(harness.gateway.call_count().await, 0);
    assert_eq!(harness.level("p1").await, 10);
}

#[tokio::test]
async fn insufficient_stock_scenario_end_to_end() {
    let harness = TestHarness::new(&[("p1", 5), ("p2", 2)]);

    let result = harness
        .engine
        .apply_order(&batch(&[("p1", 2), ("p2", 3)]))
        .await
        .unwrap();

    assert_eq!(result.overall_status(), OverallStatus::CompensatedFailure);

    let outcomes = result.outcomes();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].product_id(), &ProductId::new("p1"));
    assert_eq!(outcomes[0].status(), OutcomeStatus::Success);
    assert_eq!(outcomes[1].product_id(), &ProductId::new("p2"));
    assert_eq!(outcomes[1].status(), OutcomeStatus::Failure);
    assert!(
        outcomes[1]
            .error_detail()
            .unwrap()
            .starts_with("Insufficient stock for product p2")
    );

    let compensation = result.compensation();
    assert_eq!(compensation.len(), 1);
    assert_eq!(compensation[0].item(), &LineItem::new("p1", 2));
    assert_eq!(compensation[0].direction(), Direction::Increment);
    assert_eq!(compensation[0].status(), OutcomeStatus::Success);

    assert_eq!(harness.level("p1").await, 5);
    assert_eq!(harness.level("p2").await, 2);
    // Two decrements and one compensating increment.
    assert_eq!(harness.gateway.call_count().await, 3);
}

#[tokio::test]
async fn retry_after_restock_is_a_fresh_invocation() {
    let harness = TestHarness::new(&[("p1", 5), ("p2", 2)]);
    let order = batch(&[("p1", 2), ("p2", 3)]);

    let first = harness.engine.apply_order(&order).await.unwrap();
    assert_eq!(first.overall_status(), OverallStatus::CompensatedFailure);

    harness
        .gateway
        .set_stock_level(&ProductId::new("p2"), 3)
        .await
        .unwrap();
    let second = harness.engine.apply_order(&order).await.unwrap();

    assert_eq!(second.overall_status(), OverallStatus::FullSuccess);
    // The first result is untouched by the retry.
    assert_eq!(first.overall_status(), OverallStatus::CompensatedFailure);
    assert_eq!(harness.level("p1").await, 3);
    assert_eq!(harness.level("p2").await, 0);
}

#[tokio::test]
async fn concurrent_orders_contending_on_one_product() {
    let harness = Arc::new(TestHarness::new(&[("shared", 3), ("a", 10), ("b", 10)]));

    let first = {
        let harness = harness.clone();
        tokio::spawn(async move {
            harness
                .engine
                .apply_order(&batch(&[("a", 1), ("shared", 2)]))
                .await
                .unwrap()
        })
    };
    let second = {
        let harness = harness.clone();
        tokio::spawn(async move {
            harness
                .engine
                .apply_order(&batch(&[("b", 1), ("shared", 2)]))
                .await
                .unwrap()
        })
    };

    let statuses = [
        first.await.unwrap().overall_status(),
        second.await.unwrap().overall_status(),
    ];

    assert!(statuses.contains(&OverallStatus::FullSuccess));
    assert!(statuses.contains(&OverallStatus::CompensatedFailure));
    assert_eq!(harness.level("shared").await, 1);
    // Exactly one of the two side products stays decremented.
    assert_eq!(harness.level("a").await + harness.level("b").await, 19);
}

#[tokio::test]
async fn merged_batch_applies_duplicate_lines_once() {
    let harness = TestHarness::new(&[("p1", 10)]);
    let order = OrderBatch::merged([LineItem::new("p1", 2), LineItem::new("p1", 3)]).unwrap();

    let result = harness.engine.apply_order(&order).await.unwrap();

    assert!(result.is_full_success());
    assert_eq!(result.outcomes().len(), 1);
    assert_eq!(harness.level("p1").await, 5);
    assert_eq!(harness.gateway.call_count().await, 1);
}
