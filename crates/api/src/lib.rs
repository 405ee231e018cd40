//! HTTP surface for the order fulfillment coordinator.
//!
//! Thin request validation and translation in front of the coordinator
//! registry, with structured logging (tracing) and Prometheus metrics.
//! Submission is acknowledged with 202; dispositions are only ever observed
//! through the state-read endpoint, never pushed.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use coordinator::{
    ConfigProvider, FulfillmentHandlers, InMemoryFulfillmentHandlers, OrderCoordinator,
    OrderRegistry, StaticConfigProvider,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, H>(state: Arc<AppState<C, H>>, metrics_handle: PrometheusHandle) -> Router
where
    C: ConfigProvider + 'static,
    H: FulfillmentHandlers + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders/{id}", put(routes::orders::submit::<C, H>))
        .route("/orders/{id}", get(routes::orders::get_state::<C, H>))
        .route(
            "/orders/{id}/completions",
            post(routes::orders::complete::<C, H>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given provider and handlers.
pub fn create_state<C, H>(provider: C, handlers: H) -> Arc<AppState<C, H>>
where
    C: ConfigProvider,
    H: FulfillmentHandlers + 'static,
{
    Arc::new(AppState {
        registry: OrderRegistry::new(OrderCoordinator::new(provider, handlers)),
    })
}

/// Creates default state: static timeout policy and in-memory handlers.
///
/// Returns the handlers alongside the state so callers (tests, local runs)
/// can steer and inspect the vendor boundary.
pub fn create_default_state() -> (
    Arc<AppState<StaticConfigProvider, InMemoryFulfillmentHandlers>>,
    InMemoryFulfillmentHandlers,
) {
    let handlers = InMemoryFulfillmentHandlers::new();
    let state = create_state(StaticConfigProvider::default(), handlers.clone());
    (state, handlers)
}
