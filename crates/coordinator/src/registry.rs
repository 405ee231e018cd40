//! Instance management for coordinator tasks, keyed by order id.

use std::collections::HashMap;

use common::OrderId;
use domain::{CompletionRecord, Order};
use tokio::sync::RwLock;

use crate::config::ConfigProvider;
use crate::coordinator::{OrderCoordinator, OrderHandle};
use crate::dispatch::FulfillmentHandlers;
use crate::error::CoordinatorError;
use crate::phase::OrderPhase;
use crate::progress::OrderStateSnapshot;

/// Routes submissions, completion notifications, and state reads to the
/// coordinator instance owning each order id.
///
/// Stands in for the durable-execution host's instance management: one
/// instance per order id, with resubmission allowed only after a prior
/// instance ended in failure.
pub struct OrderRegistry<C, H> {
    coordinator: OrderCoordinator<C, H>,
    orders: RwLock<HashMap<OrderId, OrderHandle>>,
}

impl<C, H> OrderRegistry<C, H>
where
    C: ConfigProvider,
    H: FulfillmentHandlers + 'static,
{
    /// Creates an empty registry over the given coordinator.
    pub fn new(coordinator: OrderCoordinator<C, H>) -> Self {
        Self {
            coordinator,
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Accepts an order submission and starts its coordinator.
    ///
    /// A duplicate order id is rejected while its prior instance is active
    /// or resolved; an id whose prior instance ended in `HungFailure` may
    /// be reused. Validation failures from the coordinator leave no state.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn submit(&self, order: Order) -> Result<(), CoordinatorError> {
        // Write lock held across the start so two racing submissions of the
        // same id cannot both pass the duplicate check.
        let mut orders = self.orders.write().await;
        if let Some(existing) = orders.get(order.id()) {
            if existing.state().phase != OrderPhase::HungFailure {
                return Err(CoordinatorError::DuplicateOrder(order.id().clone()));
            }
            tracing::info!("reusing order id after a failed coordinator instance");
        }

        let order_id = order.id().clone();
        let handle = self.coordinator.start(order).await?;
        orders.insert(order_id, handle);
        Ok(())
    }

    /// Routes a completion notification to the owning coordinator.
    pub async fn record_completion(
        &self,
        order_id: &OrderId,
        record: CompletionRecord,
    ) -> Result<(), CoordinatorError> {
        let handle = self.handle(order_id).await?;
        handle.record_completion(record);
        Ok(())
    }

    /// Returns the current state snapshot for an order.
    pub async fn state(&self, order_id: &OrderId) -> Result<OrderStateSnapshot, CoordinatorError> {
        Ok(self.handle(order_id).await?.state())
    }

    /// Returns the handle for an order, if a coordinator instance exists.
    pub async fn handle(&self, order_id: &OrderId) -> Result<OrderHandle, CoordinatorError> {
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::OrderNotFound(order_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfigProvider;
    use crate::dispatch::InMemoryFulfillmentHandlers;
    use chrono::{TimeZone, Utc};
    use common::{ItemId, UserId};
    use domain::{FulfillmentItem, FulfillmentOutcome, ProductCategory};

    fn registry() -> (
        OrderRegistry<StaticConfigProvider, InMemoryFulfillmentHandlers>,
        InMemoryFulfillmentHandlers,
    ) {
        let handlers = InMemoryFulfillmentHandlers::new();
        let coordinator = OrderCoordinator::new(StaticConfigProvider::default(), handlers.clone());
        (OrderRegistry::new(coordinator), handlers)
    }

    fn taxi_order(order_id: &str, item_id: &str) -> Order {
        let pickup = Utc.with_ymd_and_hms(2024, 11, 30, 18, 0, 0).unwrap();
        Order::new(
            OrderId::new(order_id),
            UserId::new("user-1"),
            vec![FulfillmentItem::taxi(
                ItemId::new(item_id),
                "Stockholm Taxi",
                pickup,
            )],
        )
    }

    #[tokio::test]
    async fn unknown_order_reads_not_found() {
        let (registry, _) = registry();
        let result = registry.state(&OrderId::new("missing")).await;
        assert!(matches!(result, Err(CoordinatorError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_submission_is_rejected() {
        let (registry, _) = registry();
        registry.submit(taxi_order("o1", "t1")).await.unwrap();

        let result = registry.submit(taxi_order("o1", "t2")).await;
        assert!(matches!(result, Err(CoordinatorError::DuplicateOrder(_))));
    }

    #[tokio::test]
    async fn rejected_submission_leaves_no_state() {
        let (registry, _) = registry();
        let empty = Order::new(OrderId::new("o1"), UserId::new("u1"), vec![]);

        let result = registry.submit(empty).await;
        assert!(matches!(result, Err(CoordinatorError::InvalidArgs(_))));

        let state = registry.state(&OrderId::new("o1")).await;
        assert!(matches!(state, Err(CoordinatorError::OrderNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn order_id_is_reusable_after_hung_failure() {
        let (registry, handlers) = registry();
        handlers.set_hang_on(ProductCategory::Taxi, true);

        registry.submit(taxi_order("o1", "t1")).await.unwrap();
        let handle = registry.handle(&OrderId::new("o1")).await.unwrap();
        let result = handle.wait_terminal().await;
        assert!(matches!(result, Err(CoordinatorError::HungDispatch { .. })));

        // Resubmission after failure is allowed.
        handlers.set_hang_on(ProductCategory::Taxi, false);
        registry.submit(taxi_order("o1", "t1")).await.unwrap();
        registry
            .record_completion(
                &OrderId::new("o1"),
                CompletionRecord::new(
                    ProductCategory::Taxi,
                    ItemId::new("t1"),
                    FulfillmentOutcome::Succeeded,
                ),
            )
            .await
            .unwrap();

        let handle = registry.handle(&OrderId::new("o1")).await.unwrap();
        let snapshot = handle.wait_terminal().await.unwrap();
        assert!(!snapshot.partially_fulfilled);
    }

    #[tokio::test]
    async fn completion_for_unknown_order_is_not_found() {
        let (registry, _) = registry();
        let result = registry
            .record_completion(
                &OrderId::new("missing"),
                CompletionRecord::new(
                    ProductCategory::Taxi,
                    ItemId::new("t1"),
                    FulfillmentOutcome::Succeeded,
                ),
            )
            .await;
        assert!(matches!(result, Err(CoordinatorError::OrderNotFound(_))));
    }
}
