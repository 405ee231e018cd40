//! Per-order fulfillment coordination.
//!
//! One coordinator task runs per order: it fans out a dispatch attempt for
//! every item concurrently, then waits for out-of-band completion
//! notifications, bounded by the largest per-category timeout. Late,
//! duplicate, and unexpected notifications are absorbed idempotently, and
//! outstanding dispatch work is cancelled cooperatively when the deadline
//! elapses.
//!
//! Order lifecycle:
//! ```text
//! Created ──► Dispatching ──► Waiting ──┬──► Resolved
//!                                       └──► HungFailure
//! ```

pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod phase;
pub mod progress;
pub mod registry;

pub use cancel::CancelToken;
pub use config::{ConfigProvider, StaticConfigProvider};
pub use coordinator::{OrderCoordinator, OrderHandle};
pub use dispatch::{DispatchError, FulfillmentHandlers, InMemoryFulfillmentHandlers};
pub use error::CoordinatorError;
pub use phase::OrderPhase;
pub use progress::OrderStateSnapshot;
pub use registry::OrderRegistry;
