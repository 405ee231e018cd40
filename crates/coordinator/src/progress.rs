//! Mutable per-order fulfillment state and its immutable snapshots.

use std::collections::{BTreeMap, BTreeSet};

use common::{ItemId, OrderId, UserId};
use domain::{CompletionRecord, Order};
use serde::Serialize;

use crate::phase::OrderPhase;

/// The coordinator-owned aggregate tracking one order's fulfillment.
///
/// Every mutation is linearized through the coordinator's shared lock;
/// this type itself is single-threaded plain data.
#[derive(Debug)]
pub struct OrderProgress {
    order: Order,
    phase: OrderPhase,
    accepted: BTreeSet<ItemId>,
    rejected: BTreeSet<ItemId>,
    completions: BTreeMap<ItemId, CompletionRecord>,
    received_count: usize,
    all_dispatch_attempted: bool,
    timed_out: bool,
    partially_fulfilled: bool,
}

impl OrderProgress {
    /// Creates empty progress for a freshly accepted order.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            phase: OrderPhase::Created,
            accepted: BTreeSet::new(),
            rejected: BTreeSet::new(),
            completions: BTreeMap::new(),
            received_count: 0,
            all_dispatch_attempted: false,
            timed_out: false,
            partially_fulfilled: false,
        }
    }

    /// Returns the order being fulfilled.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Returns the current phase.
    pub fn phase(&self) -> OrderPhase {
        self.phase
    }

    /// Returns true once every item has a dispatch outcome.
    pub fn all_dispatch_attempted(&self) -> bool {
        self.all_dispatch_attempted
    }

    /// Number of completion notifications counted so far.
    pub fn completions_received(&self) -> usize {
        self.received_count
    }

    /// The compound wake condition for the Waiting phase.
    pub fn settled(&self) -> bool {
        self.all_dispatch_attempted && self.received_count == self.order.item_count()
    }

    pub(crate) fn begin_dispatch(&mut self) {
        self.phase = OrderPhase::Dispatching;
    }

    pub(crate) fn begin_waiting(&mut self) {
        self.phase = OrderPhase::Waiting;
    }

    /// Folds one item's dispatch outcome into state.
    ///
    /// Outcomes landing after finalization (e.g. a cancelled attempt
    /// resolving late) are dropped.
    pub(crate) fn record_dispatch_outcome(&mut self, item_id: &ItemId, accepted: bool) {
        if self.phase.is_terminal() {
            return;
        }
        if accepted {
            self.accepted.insert(item_id.clone());
        } else {
            self.rejected.insert(item_id.clone());
        }
        if self.accepted.len() + self.rejected.len() >= self.order.item_count() {
            self.all_dispatch_attempted = true;
        }
    }

    /// Idempotent upsert of a completion notification.
    ///
    /// First write for an item id belonging to the order counts toward the
    /// wake condition; later writes only update the stored outcome.
    /// Notifications for unknown item ids are recorded but never counted.
    /// After a hung-dispatch failure the record is dropped entirely.
    /// Returns true when the notification counted.
    pub(crate) fn record_completion(&mut self, record: CompletionRecord) -> bool {
        if self.phase == OrderPhase::HungFailure {
            return false;
        }
        let known = self.order.contains_item(&record.item_id);
        let first = !self.completions.contains_key(&record.item_id);
        self.completions.insert(record.item_id.clone(), record);
        if first && known {
            self.received_count += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }

    /// Finalizes with a computed disposition.
    ///
    /// Partially fulfilled when not every item completed, or any reported
    /// outcome was FAILED.
    pub(crate) fn finalize_resolved(&mut self) {
        self.partially_fulfilled = self.received_count < self.order.item_count()
            || self
                .completions
                .iter()
                .any(|(id, record)| self.order.contains_item(id) && record.outcome.is_failed());
        self.phase = OrderPhase::Resolved;
    }

    /// Finalizes as a whole-order failure: dispatch itself never finished.
    pub(crate) fn finalize_hung(&mut self) {
        self.phase = OrderPhase::HungFailure;
    }

    /// Number of items still without any dispatch outcome.
    pub fn pending_dispatch_count(&self) -> usize {
        self.order
            .item_count()
            .saturating_sub(self.accepted.len() + self.rejected.len())
    }

    /// Takes an immutable snapshot of the current state.
    pub fn snapshot(&self) -> OrderStateSnapshot {
        OrderStateSnapshot {
            order_id: self.order.id().clone(),
            user_id: self.order.user_id().clone(),
            phase: self.phase,
            item_count: self.order.item_count(),
            dispatch_accepted: self.accepted.iter().cloned().collect(),
            dispatch_rejected: self.rejected.iter().cloned().collect(),
            completions: self.completions.clone(),
            completions_received: self.received_count,
            all_dispatch_attempted: self.all_dispatch_attempted,
            timed_out: self.timed_out,
            partially_fulfilled: self.partially_fulfilled,
        }
    }
}

/// Immutable view of an order's fulfillment state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStateSnapshot {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub phase: OrderPhase,
    pub item_count: usize,
    pub dispatch_accepted: Vec<ItemId>,
    pub dispatch_rejected: Vec<ItemId>,
    pub completions: BTreeMap<ItemId, CompletionRecord>,
    pub completions_received: usize,
    pub all_dispatch_attempted: bool,
    pub timed_out: bool,
    pub partially_fulfilled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::{FulfillmentItem, FulfillmentOutcome, ProductCategory};

    fn two_item_order() -> Order {
        let pickup = Utc.with_ymd_and_hms(2024, 11, 30, 18, 0, 0).unwrap();
        Order::new(
            OrderId::new("order-1"),
            UserId::new("user-1"),
            vec![
                FulfillmentItem::taxi(ItemId::new("t1"), "Stockholm Taxi", pickup),
                FulfillmentItem::accommodation(
                    ItemId::new("a1"),
                    "Comfort Arlanda",
                    pickup,
                    pickup + chrono::Duration::days(1),
                ),
            ],
        )
    }

    fn succeeded(item: &str) -> CompletionRecord {
        CompletionRecord::new(
            ProductCategory::Taxi,
            ItemId::new(item),
            FulfillmentOutcome::Succeeded,
        )
    }

    fn failed(item: &str) -> CompletionRecord {
        CompletionRecord::new(
            ProductCategory::Taxi,
            ItemId::new(item),
            FulfillmentOutcome::Failed,
        )
    }

    #[test]
    fn settles_once_all_dispatched_and_completed() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.begin_dispatch();
        progress.begin_waiting();
        assert!(!progress.settled());

        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        assert!(progress.all_dispatch_attempted());
        assert!(!progress.settled());

        progress.record_completion(succeeded("t1"));
        progress.record_completion(succeeded("a1"));
        assert!(progress.settled());
    }

    #[test]
    fn rejected_dispatch_counts_as_attempted() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), false);
        assert!(progress.all_dispatch_attempted());
        assert_eq!(progress.pending_dispatch_count(), 0);
    }

    #[test]
    fn duplicate_completion_counts_once() {
        let mut progress = OrderProgress::new(two_item_order());
        assert!(progress.record_completion(succeeded("t1")));
        assert!(!progress.record_completion(succeeded("t1")));

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.completions_received, 1);
        assert_eq!(snapshot.completions.len(), 1);
    }

    #[test]
    fn duplicate_completion_updates_stored_outcome() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_completion(succeeded("t1"));
        progress.record_completion(failed("t1"));

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.completions_received, 1);
        assert!(snapshot.completions[&ItemId::new("t1")].outcome.is_failed());
    }

    #[test]
    fn unknown_item_is_recorded_but_not_counted() {
        let mut progress = OrderProgress::new(two_item_order());
        assert!(!progress.record_completion(succeeded("stray")));

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.completions_received, 0);
        assert!(snapshot.completions.contains_key(&ItemId::new("stray")));
    }

    #[test]
    fn completion_before_dispatch_outcome_is_counted() {
        let mut progress = OrderProgress::new(two_item_order());
        assert!(progress.record_completion(succeeded("t1")));
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        progress.record_completion(succeeded("a1"));
        assert!(progress.settled());
    }

    #[test]
    fn failed_outcome_marks_partial_on_finalize() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        progress.record_completion(succeeded("t1"));
        progress.record_completion(failed("a1"));
        progress.finalize_resolved();

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.phase, OrderPhase::Resolved);
        assert!(snapshot.partially_fulfilled);
    }

    #[test]
    fn missing_completion_marks_partial_on_finalize() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        progress.record_completion(succeeded("t1"));
        progress.mark_timed_out();
        progress.finalize_resolved();

        let snapshot = progress.snapshot();
        assert!(snapshot.timed_out);
        assert!(snapshot.partially_fulfilled);
        assert!(!snapshot.completions.contains_key(&ItemId::new("a1")));
    }

    #[test]
    fn fully_fulfilled_is_not_partial() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        progress.record_completion(succeeded("t1"));
        progress.record_completion(succeeded("a1"));
        progress.finalize_resolved();

        let snapshot = progress.snapshot();
        assert!(!snapshot.partially_fulfilled);
        assert!(!snapshot.timed_out);
    }

    #[test]
    fn late_completion_after_resolution_is_absorbed() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_dispatch_outcome(&ItemId::new("a1"), true);
        progress.record_completion(succeeded("t1"));
        progress.mark_timed_out();
        progress.finalize_resolved();
        assert!(progress.snapshot().partially_fulfilled);

        progress.record_completion(succeeded("a1"));

        let snapshot = progress.snapshot();
        assert!(snapshot.completions.contains_key(&ItemId::new("a1")));
        // The finalized disposition never reopens.
        assert!(snapshot.partially_fulfilled);
        assert_eq!(snapshot.phase, OrderPhase::Resolved);
    }

    #[test]
    fn completions_after_hung_failure_are_dropped() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.mark_timed_out();
        progress.finalize_hung();

        assert!(!progress.record_completion(succeeded("t1")));
        let snapshot = progress.snapshot();
        assert!(!snapshot.completions.contains_key(&ItemId::new("t1")));
        assert_eq!(snapshot.phase, OrderPhase::HungFailure);
    }

    #[test]
    fn dispatch_outcome_after_finalization_is_dropped() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.mark_timed_out();
        progress.finalize_hung();

        progress.record_dispatch_outcome(&ItemId::new("a1"), false);
        let snapshot = progress.snapshot();
        assert!(snapshot.dispatch_rejected.is_empty());
        assert_eq!(snapshot.dispatch_accepted.len(), 1);
    }

    #[test]
    fn snapshot_serializes() {
        let mut progress = OrderProgress::new(two_item_order());
        progress.record_dispatch_outcome(&ItemId::new("t1"), true);
        progress.record_completion(succeeded("t1"));

        let json = serde_json::to_value(progress.snapshot()).unwrap();
        assert_eq!(json["order_id"], "order-1");
        assert_eq!(json["phase"], "Created");
        assert_eq!(json["completions_received"], 1);
        assert_eq!(json["completions"]["t1"]["outcome"], "SUCCEEDED");
    }
}
