use crate::application::pipeline::{CheckoutPipeline, OrderOutcome};
use crate::domain::order::QueueItem;
use crate::domain::ports::WorkSource;
use crate::error::{CheckoutError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Counters accumulated by a worker over its lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub processed: u64,
    pub succeeded: u64,
    /// Business failures: out of stock or declined payment.
    pub failed: u64,
    pub faulted: u64,
}

impl WorkerReport {
    fn record(&mut self, outcome: &OrderOutcome) {
        self.processed += 1;
        match outcome {
            OrderOutcome::Succeeded { .. } => self.succeeded += 1,
            OrderOutcome::OutOfStock | OrderOutcome::PaymentDeclined => self.failed += 1,
            OrderOutcome::Faulted { .. } => self.faulted += 1,
        }
    }
}

/// The single background consumer of the checkout queue.
///
/// Orders are processed strictly one at a time in dequeue order. Each order runs
/// in its own task which the worker awaits before dequeuing the next one, so a
/// panicking collaborator only fails that order.
pub struct CheckoutWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<WorkerReport>,
}

impl CheckoutWorker {
    /// Spawns the worker loop on the current tokio runtime.
    pub fn start<S: WorkSource>(pipeline: Arc<CheckoutPipeline>, source: S) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(pipeline, source, shutdown_rx));
        tracing::info!("Checkout worker started");
        Self { shutdown, handle }
    }

    /// Closes intake, processes everything already queued, and returns the totals.
    pub async fn stop(self) -> Result<WorkerReport> {
        // The loop may already be gone if every producer was dropped.
        let _ = self.shutdown.send(true);
        self.join().await
    }

    /// Waits for the loop to end on its own, i.e. all producers dropped and the
    /// queue drained.
    pub async fn join(self) -> Result<WorkerReport> {
        self.handle
            .await
            .map_err(|e| CheckoutError::WorkerError(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn run<S: WorkSource>(
    pipeline: Arc<CheckoutPipeline>,
    mut source: S,
    mut shutdown: watch::Receiver<bool>,
) -> WorkerReport {
    let mut report = WorkerReport::default();
    let mut draining = false;

    loop {
        let next = if draining {
            source.next_item().await
        } else {
            tokio::select! {
                item = source.next_item() => item,
                _ = shutdown.changed() => {
                    tracing::info!("Checkout worker stopping, draining queue");
                    source.close();
                    draining = true;
                    continue;
                }
            }
        };

        let Some(item) = next else {
            break;
        };
        let outcome = process_isolated(&pipeline, item).await;
        report.record(&outcome);
    }

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        faulted = report.faulted,
        "Checkout worker stopped"
    );
    report
}

async fn process_isolated(pipeline: &Arc<CheckoutPipeline>, item: QueueItem) -> OrderOutcome {
    let order_id = item.order_id;
    let customer_id = item.request.customer_id;
    let reported = Arc::new(AtomicBool::new(false));

    let task = {
        let pipeline = Arc::clone(pipeline);
        let reported = Arc::clone(&reported);
        tokio::spawn(async move { pipeline.process_tracked(&item, &reported).await })
    };

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(%order_id, error = %e, "Checkout pipeline panicked");
            if !reported.load(Ordering::SeqCst) {
                let pipeline = Arc::clone(pipeline);
                let report = tokio::spawn(async move {
                    pipeline
                        .report_internal_failure(order_id, customer_id)
                        .await
                });
                if let Err(e) = report.await {
                    tracing::error!(%order_id, error = %e, "Internal error report panicked");
                }
            }
            OrderOutcome::Faulted {
                stage: None,
                message: e.to_string(),
            }
        }
    }
}
