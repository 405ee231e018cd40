//! The per-order fan-out/fan-in coordinator.

use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use domain::{CompletionRecord, FulfillmentItem, Order};
use tokio::sync::Notify;

use crate::cancel::CancelToken;
use crate::config::ConfigProvider;
use crate::dispatch::{DispatchError, FulfillmentHandlers};
use crate::error::CoordinatorError;
use crate::phase::OrderPhase;
use crate::progress::{OrderProgress, OrderStateSnapshot};

/// Drives one coordinator task per submitted order.
///
/// `start` validates the submission synchronously, then spawns a task that
/// fans out dispatch attempts, waits for completion notifications under the
/// resolved deadline, and finalizes the order's disposition.
pub struct OrderCoordinator<C, H> {
    config: C,
    handlers: Arc<H>,
}

impl<C, H> OrderCoordinator<C, H>
where
    C: ConfigProvider,
    H: FulfillmentHandlers + 'static,
{
    /// Creates a coordinator over the given configuration and handlers.
    pub fn new(config: C, handlers: H) -> Self {
        Self {
            config,
            handlers: Arc::new(handlers),
        }
    }

    /// Validates and accepts an order, spawning its coordinator task.
    ///
    /// Fails before any state is created: with `InvalidArgs` for an empty
    /// order, with `BadConfig` when any category present in the order has a
    /// missing or zero timeout entry. On success the order is already
    /// dispatching; the returned handle only observes and feeds it.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn start(&self, order: Order) -> Result<OrderHandle, CoordinatorError> {
        if !order.has_items() {
            return Err(CoordinatorError::InvalidArgs(
                "order must contain at least one fulfillment item".to_string(),
            ));
        }

        let categories = order.categories();
        let timeouts = self.config.resolve_timeouts(&categories).await;
        let mut max_wait_secs = 0u32;
        for category in &categories {
            match timeouts.get(category).copied() {
                None => {
                    return Err(CoordinatorError::BadConfig(format!(
                        "no fulfillment timeout configured for {category}"
                    )));
                }
                Some(0) => {
                    return Err(CoordinatorError::BadConfig(format!(
                        "fulfillment timeout for {category} must be positive"
                    )));
                }
                Some(seconds) => max_wait_secs = max_wait_secs.max(seconds),
            }
        }

        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(
            items = order.item_count(),
            max_wait_secs,
            "order accepted, dispatching fulfillments"
        );

        let shared = Arc::new(OrderShared {
            progress: Mutex::new(OrderProgress::new(order)),
            changed: Notify::new(),
        });
        tokio::spawn(run(
            shared.clone(),
            self.handlers.clone(),
            Duration::from_secs(u64::from(max_wait_secs)),
        ));

        Ok(OrderHandle { shared })
    }
}

/// Shared state between the coordinator task, dispatch tasks, and handles.
struct OrderShared {
    progress: Mutex<OrderProgress>,
    changed: Notify,
}

impl OrderShared {
    fn lock(&self) -> MutexGuard<'_, OrderProgress> {
        self.progress.lock().unwrap()
    }
}

/// Observing/feeding handle to a running (or finished) coordinator task.
///
/// Cheap to clone; all clones share the same order state.
#[derive(Clone)]
pub struct OrderHandle {
    shared: Arc<OrderShared>,
}

impl OrderHandle {
    /// Returns a snapshot of the order state at this instant.
    ///
    /// Callable at any point in the lifecycle, including mid-dispatch.
    pub fn state(&self) -> OrderStateSnapshot {
        self.shared.lock().snapshot()
    }

    /// Ingests an out-of-band completion notification.
    ///
    /// Idempotent and infallible: duplicates, unknown item ids, and
    /// notifications arriving before dispatch resolves or after
    /// finalization are all absorbed per the progress rules.
    pub fn record_completion(&self, record: CompletionRecord) {
        let counted = {
            let mut progress = self.shared.lock();
            let counted = progress.record_completion(record);
            tracing::debug!(
                order_id = %progress.order().id(),
                received = counted,
                "completion notification ingested"
            );
            counted
        };
        metrics::counter!("fulfillment_completions_total").increment(1);
        if counted {
            metrics::counter!("fulfillment_completions_counted_total").increment(1);
        }
        self.shared.changed.notify_waiters();
    }

    /// Waits until the order reaches a terminal phase.
    ///
    /// Returns the final snapshot, or `HungDispatch` when the coordinator
    /// itself could not obtain a dispatch outcome for every item in time.
    pub async fn wait_terminal(&self) -> Result<OrderStateSnapshot, CoordinatorError> {
        loop {
            let mut notified = pin!(self.shared.changed.notified());
            notified.as_mut().enable();

            {
                let progress = self.shared.lock();
                if progress.phase().is_terminal() {
                    if progress.phase() == OrderPhase::HungFailure {
                        return Err(CoordinatorError::HungDispatch {
                            pending: progress.pending_dispatch_count(),
                        });
                    }
                    return Ok(progress.snapshot());
                }
            }

            notified.await;
        }
    }
}

/// The coordinator task: fan out, wait bounded, finalize.
async fn run<H: FulfillmentHandlers + 'static>(
    shared: Arc<OrderShared>,
    handlers: Arc<H>,
    max_wait: Duration,
) {
    let started = Instant::now();
    let cancel = CancelToken::new();

    let (order_id, items) = {
        let mut progress = shared.lock();
        progress.begin_dispatch();
        (progress.order().id().clone(), progress.order().items().to_vec())
    };
    shared.changed.notify_waiters();

    for item in items {
        tokio::spawn(dispatch_item(
            shared.clone(),
            handlers.clone(),
            cancel.clone(),
            item,
        ));
    }

    shared.lock().begin_waiting();
    shared.changed.notify_waiters();
    tracing::info!(%order_id, wait_secs = max_wait.as_secs(), "waiting for completions");

    let settled = tokio::time::timeout(max_wait, wait_settled(&shared))
        .await
        .is_ok();

    let (hung, completions_received) = {
        let mut progress = shared.lock();
        if settled {
            progress.finalize_resolved();
        } else {
            progress.mark_timed_out();
            if progress.all_dispatch_attempted() {
                progress.finalize_resolved();
            } else {
                progress.finalize_hung();
            }
        }
        (
            progress.phase() == OrderPhase::HungFailure,
            progress.completions_received(),
        )
    };

    if !settled {
        // Advisory only; nothing waits for the cancelled attempts.
        cancel.cancel();
        metrics::counter!("orders_timed_out_total").increment(1);
        tracing::info!(
            %order_id,
            completions_received,
            "deadline elapsed, cancelling outstanding dispatch attempts"
        );
    }
    if hung {
        metrics::counter!("orders_hung_total").increment(1);
        tracing::warn!(%order_id, "order failed: dispatch never finished starting");
    } else {
        metrics::counter!("orders_resolved_total").increment(1);
    }
    metrics::histogram!("order_wait_duration_seconds").record(started.elapsed().as_secs_f64());

    shared.changed.notify_waiters();
}

/// Blocks until the compound condition holds: every item has a dispatch
/// outcome and every item has a counted completion.
async fn wait_settled(shared: &OrderShared) {
    loop {
        let mut notified = pin!(shared.changed.notified());
        notified.as_mut().enable();
        if shared.lock().settled() {
            return;
        }
        notified.await;
    }
}

/// One concurrent dispatch attempt: race the handler against cancellation
/// and fold the outcome back into shared state.
async fn dispatch_item<H: FulfillmentHandlers>(
    shared: Arc<OrderShared>,
    handlers: Arc<H>,
    cancel: CancelToken,
    item: FulfillmentItem,
) {
    let item_id = item.id().clone();
    let category = item.category();

    let result = tokio::select! {
        () = cancel.cancelled() => Err(DispatchError::Unavailable(
            "dispatch cancelled before an outcome was received".to_string(),
        )),
        result = invoke_handler(handlers.as_ref(), &item, &cancel) => result,
    };

    match &result {
        Ok(()) => tracing::debug!(%item_id, %category, "dispatch attempt accepted"),
        Err(error) => {
            tracing::warn!(%item_id, %category, %error, "dispatch attempt rejected")
        }
    }

    shared.lock().record_dispatch_outcome(&item_id, result.is_ok());
    shared.changed.notify_waiters();
}

async fn invoke_handler<H: FulfillmentHandlers>(
    handlers: &H,
    item: &FulfillmentItem,
    cancel: &CancelToken,
) -> Result<(), DispatchError> {
    match item {
        FulfillmentItem::Flight(req) => handlers.initiate_flight(req, cancel).await,
        FulfillmentItem::Taxi(req) => handlers.initiate_taxi(req, cancel).await,
        FulfillmentItem::Accommodation(req) => handlers.initiate_accommodation(req, cancel).await,
    }
}
