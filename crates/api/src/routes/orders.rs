//! Order submission, completion-notification, and state-read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ItemId, OrderId, UserId};
use coordinator::{ConfigProvider, FulfillmentHandlers, OrderRegistry, OrderStateSnapshot};
use domain::{CompletionRecord, FulfillmentItem, FulfillmentOutcome, Order, ProductCategory};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<C, H> {
    pub registry: OrderRegistry<C, H>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct SubmitOrderBody {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<FulfillmentItem>,
}

#[derive(Deserialize)]
pub struct CompletionBody {
    pub category: ProductCategory,
    pub item_id: String,
    pub outcome: FulfillmentOutcome,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderAcceptedResponse {
    pub order_id: String,
    pub status: &'static str,
}

// -- Handlers --

/// PUT /orders/{id} — submit an order for fulfillment.
///
/// Acknowledges with 202: acceptance means the coordinator is running, not
/// that anything is fulfilled yet.
#[tracing::instrument(skip(state, body), fields(order_id = %id))]
pub async fn submit<C, H>(
    State(state): State<Arc<AppState<C, H>>>,
    Path(id): Path<String>,
    Json(body): Json<SubmitOrderBody>,
) -> Result<(StatusCode, Json<OrderAcceptedResponse>), ApiError>
where
    C: ConfigProvider + 'static,
    H: FulfillmentHandlers + 'static,
{
    if body.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let order = Order::new(
        OrderId::new(id.clone()),
        UserId::new(body.user_id),
        body.items,
    );
    state.registry.submit(order).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(OrderAcceptedResponse {
            order_id: id,
            status: "accepted",
        }),
    ))
}

/// GET /orders/{id} — current order state snapshot.
#[tracing::instrument(skip(state), fields(order_id = %id))]
pub async fn get_state<C, H>(
    State(state): State<Arc<AppState<C, H>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderStateSnapshot>, ApiError>
where
    C: ConfigProvider + 'static,
    H: FulfillmentHandlers + 'static,
{
    let snapshot = state.registry.state(&OrderId::new(id)).await?;
    Ok(Json(snapshot))
}

/// POST /orders/{id}/completions — out-of-band completion notification.
///
/// Delivery is at-least-once upstream; the coordinator absorbs duplicates,
/// so this always acknowledges with 202 once routed.
#[tracing::instrument(skip(state, body), fields(order_id = %id))]
pub async fn complete<C, H>(
    State(state): State<Arc<AppState<C, H>>>,
    Path(id): Path<String>,
    Json(body): Json<CompletionBody>,
) -> Result<StatusCode, ApiError>
where
    C: ConfigProvider + 'static,
    H: FulfillmentHandlers + 'static,
{
    let record = CompletionRecord::new(body.category, ItemId::new(body.item_id), body.outcome);
    state
        .registry
        .record_completion(&OrderId::new(id), record)
        .await?;
    Ok(StatusCode::ACCEPTED)
}
