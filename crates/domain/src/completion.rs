//! Completion notifications reported by vendor systems.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::category::ProductCategory;

/// Terminal outcome of a fulfillment item, as reported out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentOutcome {
    Succeeded,
    Failed,
}

impl FulfillmentOutcome {
    /// Returns true for a failed outcome.
    pub fn is_failed(&self) -> bool {
        matches!(self, FulfillmentOutcome::Failed)
    }
}

impl std::fmt::Display for FulfillmentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentOutcome::Succeeded => write!(f, "SUCCEEDED"),
            FulfillmentOutcome::Failed => write!(f, "FAILED"),
        }
    }
}

/// An asynchronous completion notification for one item.
///
/// Delivery is at-least-once; consumers must absorb duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub category: ProductCategory,
    pub item_id: ItemId,
    pub outcome: FulfillmentOutcome,
}

impl CompletionRecord {
    /// Creates a completion record.
    pub fn new(category: ProductCategory, item_id: ItemId, outcome: FulfillmentOutcome) -> Self {
        Self {
            category,
            item_id,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&FulfillmentOutcome::Succeeded).unwrap(),
            "\"SUCCEEDED\""
        );
        let back: FulfillmentOutcome = serde_json::from_str("\"FAILED\"").unwrap();
        assert!(back.is_failed());
    }

    #[test]
    fn record_roundtrip() {
        let record = CompletionRecord::new(
            ProductCategory::Taxi,
            ItemId::new("t1"),
            FulfillmentOutcome::Succeeded,
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: CompletionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
