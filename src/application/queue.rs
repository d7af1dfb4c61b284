use crate::config::{OverflowPolicy, QueueConfig};
use crate::domain::order::QueueItem;
use crate::domain::ports::WorkSource;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Multi-producer, single-consumer FIFO queue of pending orders.
///
/// Backed by a `tokio` mpsc channel: unbounded by default, or bounded with an
/// explicit [`OverflowPolicy`] when a capacity is configured.
pub struct CheckoutQueue;

impl CheckoutQueue {
    /// Creates the producer and consumer halves of a queue.
    pub fn channel(config: &QueueConfig) -> Result<(QueueSender, QueueReceiver)> {
        config.validate()?;
        let Some(capacity) = config.capacity else {
            return Ok(Self::unbounded());
        };
        let (tx, rx) = mpsc::channel(capacity);
        Ok((
            QueueSender {
                inner: SenderInner::Bounded {
                    tx,
                    capacity,
                    overflow: config.overflow,
                },
            },
            QueueReceiver {
                inner: ReceiverInner::Bounded(rx),
            },
        ))
    }

    pub fn unbounded() -> (QueueSender, QueueReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            QueueSender {
                inner: SenderInner::Unbounded(tx),
            },
            QueueReceiver {
                inner: ReceiverInner::Unbounded(rx),
            },
        )
    }
}

/// Producer half. Cheap to clone; one per intake path.
#[derive(Clone)]
pub struct QueueSender {
    inner: SenderInner,
}

#[derive(Clone)]
enum SenderInner {
    Unbounded(mpsc::UnboundedSender<QueueItem>),
    Bounded {
        tx: mpsc::Sender<QueueItem>,
        capacity: usize,
        overflow: OverflowPolicy,
    },
}

impl QueueSender {
    /// Appends an item to the back of the queue.
    ///
    /// Only awaits when the queue is bounded, full, and configured to block.
    pub async fn enqueue(&self, item: QueueItem) -> Result<()> {
        match &self.inner {
            SenderInner::Unbounded(tx) => tx.send(item).map_err(|_| CheckoutError::QueueClosed),
            SenderInner::Bounded {
                tx,
                capacity,
                overflow: OverflowPolicy::Reject,
            } => tx.try_send(item).map_err(|e| match e {
                TrySendError::Full(_) => CheckoutError::QueueFull(*capacity),
                TrySendError::Closed(_) => CheckoutError::QueueClosed,
            }),
            SenderInner::Bounded {
                tx,
                overflow: OverflowPolicy::Block,
                ..
            } => tx.send(item).await.map_err(|_| CheckoutError::QueueClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.inner {
            SenderInner::Unbounded(tx) => tx.is_closed(),
            SenderInner::Bounded { tx, .. } => tx.is_closed(),
        }
    }
}

/// Consumer half, owned by the single checkout worker.
pub struct QueueReceiver {
    inner: ReceiverInner,
}

enum ReceiverInner {
    Unbounded(mpsc::UnboundedReceiver<QueueItem>),
    Bounded(mpsc::Receiver<QueueItem>),
}

impl QueueReceiver {
    /// Waits for the next item in FIFO order.
    ///
    /// Returns `None` once the queue is closed (or every sender is gone) and drained.
    pub async fn dequeue(&mut self) -> Option<QueueItem> {
        match &mut self.inner {
            ReceiverInner::Unbounded(rx) => rx.recv().await,
            ReceiverInner::Bounded(rx) => rx.recv().await,
        }
    }

    /// Rejects further enqueues while keeping already queued items available.
    pub fn close(&mut self) {
        match &mut self.inner {
            ReceiverInner::Unbounded(rx) => rx.close(),
            ReceiverInner::Bounded(rx) => rx.close(),
        }
    }

    /// Number of items waiting to be dequeued.
    pub fn len(&self) -> usize {
        match &self.inner {
            ReceiverInner::Unbounded(rx) => rx.len(),
            ReceiverInner::Bounded(rx) => rx.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WorkSource for QueueReceiver {
    async fn next_item(&mut self) -> Option<QueueItem> {
        let item = self.dequeue().await;
        if item.is_some() {
            tracing::debug!(backlog = self.len(), "Dequeued checkout item");
        }
        item
    }

    fn close(&mut self) {
        QueueReceiver::close(self);
    }
}
