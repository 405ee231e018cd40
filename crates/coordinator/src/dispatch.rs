//! Outbound dispatch boundary to vendor-specific systems.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ItemId;
use domain::{AccommodationItem, FlightItem, ProductCategory, TaxiItem};
use thiserror::Error;

use crate::cancel::CancelToken;

/// A dispatch attempt that could not be accepted.
///
/// Rejection is per-item and recovered locally; it never fails the order.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The vendor handler refused to accept the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The handler never produced an accept/reject outcome.
    #[error("handler unavailable: {0}")]
    Unavailable(String),
}

/// Category-specific remote request handlers.
///
/// Each operation *begins* fulfilling an item: `Ok` means the request was
/// accepted, not that the product is fulfilled. Terminal outcomes arrive
/// later as completion notifications. Handlers receive the order's
/// cancellation token and may check it best-effort.
#[async_trait]
pub trait FulfillmentHandlers: Send + Sync {
    /// Requests a flight booking to be started.
    async fn initiate_flight(
        &self,
        req: &FlightItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError>;

    /// Requests a taxi ride to be started.
    async fn initiate_taxi(
        &self,
        req: &TaxiItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError>;

    /// Requests a lodging reservation to be started.
    async fn initiate_accommodation(
        &self,
        req: &AccommodationItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError>;
}

#[derive(Debug, Default)]
struct HandlerState {
    initiated: Vec<ItemId>,
    fail_categories: HashSet<ProductCategory>,
    hang_categories: HashSet<ProductCategory>,
}

/// In-memory fulfillment handlers for tests and local runs.
///
/// Accepts every request immediately unless told otherwise: a category can
/// be made to reject (`set_fail_on`) or to hang until cancelled
/// (`set_hang_on`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryFulfillmentHandlers {
    state: Arc<RwLock<HandlerState>>,
}

impl InMemoryFulfillmentHandlers {
    /// Creates handlers that accept everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the given category reject every dispatch attempt.
    pub fn set_fail_on(&self, category: ProductCategory, fail: bool) {
        let mut state = self.state.write().unwrap();
        if fail {
            state.fail_categories.insert(category);
        } else {
            state.fail_categories.remove(&category);
        }
    }

    /// Makes the given category hang until the order is cancelled.
    pub fn set_hang_on(&self, category: ProductCategory, hang: bool) {
        let mut state = self.state.write().unwrap();
        if hang {
            state.hang_categories.insert(category);
        } else {
            state.hang_categories.remove(&category);
        }
    }

    /// Returns how many requests were accepted.
    pub fn initiated_count(&self) -> usize {
        self.state.read().unwrap().initiated.len()
    }

    /// Returns true if a request for the given item was accepted.
    pub fn has_initiated(&self, item_id: &ItemId) -> bool {
        self.state.read().unwrap().initiated.contains(item_id)
    }

    async fn initiate(
        &self,
        category: ProductCategory,
        item_id: &ItemId,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        let hang = self.state.read().unwrap().hang_categories.contains(&category);
        if hang {
            cancel.cancelled().await;
            return Err(DispatchError::Unavailable(format!(
                "{category} handler cancelled before accepting"
            )));
        }

        let mut state = self.state.write().unwrap();
        if state.fail_categories.contains(&category) {
            return Err(DispatchError::Rejected(format!(
                "{category} vendor rejected the request"
            )));
        }
        state.initiated.push(item_id.clone());
        Ok(())
    }
}

#[async_trait]
impl FulfillmentHandlers for InMemoryFulfillmentHandlers {
    async fn initiate_flight(
        &self,
        req: &FlightItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        self.initiate(ProductCategory::Flight, &req.id, cancel).await
    }

    async fn initiate_taxi(
        &self,
        req: &TaxiItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        self.initiate(ProductCategory::Taxi, &req.id, cancel).await
    }

    async fn initiate_accommodation(
        &self,
        req: &AccommodationItem,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        self.initiate(ProductCategory::Accommodation, &req.id, cancel)
            .await
    }
}
