//! The immutable order submitted by a caller.

use std::collections::BTreeSet;

use common::{ItemId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::category::ProductCategory;
use crate::item::FulfillmentItem;

/// A caller submission comprising one or more fulfillment items.
///
/// Immutable once constructed; all fulfillment progress is tracked by the
/// coordinator, never on the order itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<FulfillmentItem>,
}

impl Order {
    /// Creates an order from caller-supplied parts.
    pub fn new(id: OrderId, user_id: UserId, items: Vec<FulfillmentItem>) -> Self {
        Self { id, user_id, items }
    }

    /// Returns the order id.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the owning user id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the items in submission order.
    pub fn items(&self) -> &[FulfillmentItem] {
        &self.items
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order contains at least one item.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns true if the order contains an item with the given id.
    pub fn contains_item(&self, item_id: &ItemId) -> bool {
        self.items.iter().any(|item| item.id() == item_id)
    }

    /// Returns the distinct set of categories present in the order.
    pub fn categories(&self) -> BTreeSet<ProductCategory> {
        self.items.iter().map(FulfillmentItem::category).collect()
    }
}
