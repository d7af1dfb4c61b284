use crate::application::pipeline::CheckoutPipeline;
use crate::application::queue::{CheckoutQueue, QueueSender};
use crate::application::worker::{CheckoutWorker, WorkerReport};
use crate::config::QueueConfig;
use crate::domain::order::{CheckoutRequest, CheckoutResponse, OrderId, QueueItem};
use crate::error::Result;
use std::sync::Arc;

/// Intake façade for checkout requests.
///
/// Acknowledges a request immediately and hands it to the queue; the outcome is
/// only ever delivered later through the receipt generator.
#[derive(Clone)]
pub struct CheckoutCoordinator {
    queue: QueueSender,
}

impl CheckoutCoordinator {
    pub fn new(queue: QueueSender) -> Self {
        Self { queue }
    }

    /// Accepts a checkout request and returns an in-progress acknowledgment.
    ///
    /// No validation happens here. Fails only when a bounded queue rejects the
    /// order or the worker has shut down.
    pub async fn submit(&self, request: CheckoutRequest) -> Result<CheckoutResponse> {
        let order_id = OrderId::new();
        let response = CheckoutResponse::in_progress(order_id);
        let customer_id = request.customer_id;

        self.queue.enqueue(QueueItem { order_id, request }).await?;
        tracing::info!(%order_id, %customer_id, "Order added to queue");

        Ok(response)
    }
}

/// A running checkout system: one queue, one worker, and the coordinator feeding it.
pub struct CheckoutService {
    coordinator: CheckoutCoordinator,
    worker: CheckoutWorker,
}

impl CheckoutService {
    /// Builds the queue and starts the worker. Must be called inside a tokio runtime.
    pub fn start(queue_config: &QueueConfig, pipeline: CheckoutPipeline) -> Result<Self> {
        let (sender, receiver) = CheckoutQueue::channel(queue_config)?;
        let worker = CheckoutWorker::start(Arc::new(pipeline), receiver);
        Ok(Self {
            coordinator: CheckoutCoordinator::new(sender),
            worker,
        })
    }

    pub fn coordinator(&self) -> CheckoutCoordinator {
        self.coordinator.clone()
    }

    pub async fn submit(&self, request: CheckoutRequest) -> Result<CheckoutResponse> {
        self.coordinator.submit(request).await
    }

    /// Stops intake and waits until every accepted order reached a terminal outcome.
    pub async fn shutdown(self) -> Result<WorkerReport> {
        self.worker.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{IN_PROGRESS_MESSAGE, OrderStatus, PaymentInfo};
    use crate::error::CheckoutError;
    use uuid::Uuid;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer_id: Uuid::new_v4(),
            line_items: Vec::new(),
            payment_info: PaymentInfo::default(),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_in_progress() {
        let (tx, _rx) = CheckoutQueue::unbounded();
        let coordinator = CheckoutCoordinator::new(tx);

        let response = coordinator.submit(request()).await.unwrap();

        assert_eq!(response.status, OrderStatus::InProgress);
        assert_eq!(response.message, IN_PROGRESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_submit_enqueues_exactly_one_item() {
        let (tx, mut rx) = CheckoutQueue::unbounded();
        let coordinator = CheckoutCoordinator::new(tx);
        let request = request();

        let response = coordinator.submit(request.clone()).await.unwrap();

        assert_eq!(rx.len(), 1);
        let item = rx.dequeue().await.unwrap();
        assert_eq!(item.order_id, response.order_id);
        assert_eq!(item.request, request);
    }

    #[tokio::test]
    async fn test_each_submission_gets_a_new_order_id() {
        let (tx, _rx) = CheckoutQueue::unbounded();
        let coordinator = CheckoutCoordinator::new(tx);

        let first = coordinator.submit(request()).await.unwrap();
        let second = coordinator.submit(request()).await.unwrap();

        assert_ne!(first.order_id, second.order_id);
    }

    #[tokio::test]
    async fn test_submit_after_consumer_gone() {
        let (tx, rx) = CheckoutQueue::unbounded();
        drop(rx);
        let coordinator = CheckoutCoordinator::new(tx);

        assert!(matches!(
            coordinator.submit(request()).await,
            Err(CheckoutError::QueueClosed)
        ));
    }
}
