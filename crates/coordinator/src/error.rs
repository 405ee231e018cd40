//! Coordinator error types.

use common::OrderId;
use thiserror::Error;

/// Errors surfaced by order submission and finalization.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Order was submitted without any fulfillment items.
    #[error("invalid order: {0}")]
    InvalidArgs(String),

    /// The fulfillment configuration is incomplete or non-positive.
    #[error("invalid fulfillment configuration: {0}")]
    BadConfig(String),

    /// The deadline elapsed before every item received a dispatch outcome.
    #[error("dispatch hung: {pending} item(s) never received a dispatch outcome before the deadline")]
    HungDispatch { pending: usize },

    /// An order with this id already has an active or resolved coordinator.
    #[error("order {0} already has an active or completed coordinator")]
    DuplicateOrder(OrderId),

    /// No coordinator instance exists for this order id.
    #[error("no coordinator found for order {0}")]
    OrderNotFound(OrderId),
}

/// Convenience type alias for coordinator results.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
