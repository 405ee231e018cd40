//! The polymorphic fulfillment item and its per-category payloads.

use chrono::{DateTime, Utc};
use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::category::ProductCategory;

/// A flight booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightItem {
    pub id: ItemId,
    pub airline: String,
    pub flight_number: String,
}

/// A taxi ride request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxiItem {
    pub id: ItemId,
    pub name: String,
    pub pickup_at: DateTime<Utc>,
}

/// A lodging request for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccommodationItem {
    pub id: ItemId,
    pub name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

/// One product-category-specific unit of work within an order.
///
/// Internally tagged on the wire, e.g.
/// `{"type": "flight", "id": "...", "airline": "...", "flight_number": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FulfillmentItem {
    Flight(FlightItem),
    Taxi(TaxiItem),
    Accommodation(AccommodationItem),
}

impl FulfillmentItem {
    /// Creates a flight item.
    pub fn flight(
        id: ItemId,
        airline: impl Into<String>,
        flight_number: impl Into<String>,
    ) -> Self {
        FulfillmentItem::Flight(FlightItem {
            id,
            airline: airline.into(),
            flight_number: flight_number.into(),
        })
    }

    /// Creates a taxi item.
    pub fn taxi(id: ItemId, name: impl Into<String>, pickup_at: DateTime<Utc>) -> Self {
        FulfillmentItem::Taxi(TaxiItem {
            id,
            name: name.into(),
            pickup_at,
        })
    }

    /// Creates an accommodation item.
    pub fn accommodation(
        id: ItemId,
        name: impl Into<String>,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Self {
        FulfillmentItem::Accommodation(AccommodationItem {
            id,
            name: name.into(),
            check_in,
            check_out,
        })
    }

    /// Returns the item's unique id within its order.
    pub fn id(&self) -> &ItemId {
        match self {
            FulfillmentItem::Flight(f) => &f.id,
            FulfillmentItem::Taxi(t) => &t.id,
            FulfillmentItem::Accommodation(a) => &a.id,
        }
    }

    /// Returns the category tag this item dispatches on.
    pub fn category(&self) -> ProductCategory {
        match self {
            FulfillmentItem::Flight(_) => ProductCategory::Flight,
            FulfillmentItem::Taxi(_) => ProductCategory::Taxi,
            FulfillmentItem::Accommodation(_) => ProductCategory::Accommodation,
        }
    }
}
