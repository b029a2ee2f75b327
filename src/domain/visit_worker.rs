//! Background worker applying visit counter increments.
//!
//! The redirect cache-hit path hands increments to a bounded channel and
//! returns immediately. A single consumer task drains the channel and applies
//! each increment against the store with bounded concurrency. Failures are
//! logged and counted, never surfaced to the redirecting caller and never
//! retried.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info, warn};

use crate::domain::repositories::{StoreError, UrlRepository};
use crate::domain::visit_event::VisitEvent;

/// Reasons an increment could not be handed to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitQueueError {
    /// The queue is at capacity; the event was dropped.
    #[error("visit queue is full")]
    Full,
    /// The worker has stopped; the event was dropped.
    #[error("visit queue is closed")]
    Closed,
}

/// Failure of a detached counter update.
#[derive(Debug, Clone, Error)]
pub enum VisitError {
    #[error("background increment failed for {code}: {source}")]
    BackgroundIncrementFailed { code: String, source: StoreError },
    /// The record was removed (e.g. by retention) after it was cached.
    #[error("record {0} no longer exists")]
    RecordGone(String),
}

/// Producer handle for the visit queue.
///
/// Cheap to clone; all clones feed the same worker. The worker stops once
/// every handle has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct VisitQueue {
    sender: mpsc::Sender<VisitEvent>,
}

impl VisitQueue {
    /// Creates a bounded queue and the receiver to pass to [`run_visit_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<VisitEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueues an increment for `code` without waiting.
    ///
    /// When the queue is full the event is dropped rather than blocking the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`VisitQueueError::Full`] or [`VisitQueueError::Closed`] when
    /// the event could not be enqueued.
    pub fn submit(&self, code: &str) -> Result<(), VisitQueueError> {
        match self.sender.try_send(VisitEvent::new(code)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                metrics::counter!("visit_queue_dropped_total").increment(1);
                Err(VisitQueueError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                metrics::counter!("visit_queue_dropped_total").increment(1);
                Err(VisitQueueError::Closed)
            }
        }
    }

    /// Returns true once the worker has stopped consuming.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Configured size of the queue.
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Consumes visit events until every [`VisitQueue`] handle is dropped.
///
/// At most `concurrency` increments are in flight at once. After the channel
/// closes the worker waits for in-flight increments before returning, so
/// awaiting this future is a complete drain.
pub async fn run_visit_worker<R>(
    mut rx: mpsc::Receiver<VisitEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: UrlRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = apply_visit(repository.as_ref(), &event).await {
                metrics::counter!("visit_increment_failed_total").increment(1);
                match &e {
                    VisitError::RecordGone(_) => warn!(code = %event.code, "{}", e),
                    VisitError::BackgroundIncrementFailed { .. } => {
                        error!(code = %event.code, "{}", e)
                    }
                }
            }
        });
    }

    // Wait for in-flight increments.
    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Visit worker stopped");
}

/// Applies a single increment.
///
/// # Errors
///
/// Returns [`VisitError::RecordGone`] if the code no longer exists and
/// [`VisitError::BackgroundIncrementFailed`] if the store call failed.
pub async fn apply_visit<R>(repository: &R, event: &VisitEvent) -> Result<(), VisitError>
where
    R: UrlRepository + ?Sized,
{
    match repository.increment_visits(&event.code).await {
        Ok(true) => {
            let lag_ms = (chrono::Utc::now() - event.enqueued_at).num_milliseconds();
            debug!(code = %event.code, lag_ms, "Visit recorded");
            Ok(())
        }
        Ok(false) => Err(VisitError::RecordGone(event.code.clone())),
        Err(source) => Err(VisitError::BackgroundIncrementFailed {
            code: event.code.clone(),
            source,
        }),
    }
}
