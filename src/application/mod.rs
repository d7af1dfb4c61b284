//! Application layer containing the checkout orchestration.
//!
//! `CheckoutCoordinator` acknowledges requests and pushes them onto a `tokio`
//! mpsc-backed `CheckoutQueue`. A single `CheckoutWorker` drains that queue and
//! runs each order through the `CheckoutPipeline`, one order at a time.

pub mod coordinator;
pub mod pipeline;
pub mod queue;
pub mod worker;
