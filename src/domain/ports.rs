use super::order::{CheckoutResponse, CustomerId, OrderLineItem, PaymentInfo, QueueItem};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait StockValidator: Send + Sync {
    /// Returns whether every line item is available.
    async fn validate(&self, line_items: &[OrderLineItem]) -> Result<bool>;
}

#[async_trait]
pub trait TaxCalculator: Send + Sync {
    async fn calculate_tax(
        &self,
        customer_id: CustomerId,
        line_items: &[OrderLineItem],
    ) -> Result<Decimal>;
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Returns whether the charge succeeded.
    async fn process(
        &self,
        customer_id: CustomerId,
        payment_info: &PaymentInfo,
        amount: Decimal,
    ) -> Result<bool>;
}

#[async_trait]
pub trait ReceiptGenerator: Send + Sync {
    async fn report_failure(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
    ) -> Result<()>;

    async fn report_success(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
        amount: Decimal,
    ) -> Result<()>;
}

/// Source of queued work drained by the checkout worker.
#[async_trait]
pub trait WorkSource: Send + 'static {
    /// Waits for the next item. `None` once the source is closed and drained.
    async fn next_item(&mut self) -> Option<QueueItem>;

    /// Stops accepting new items; already queued items are still yielded.
    fn close(&mut self);
}

pub type StockValidatorBox = Box<dyn StockValidator>;
pub type TaxCalculatorBox = Box<dyn TaxCalculator>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
pub type ReceiptGeneratorBox = Box<dyn ReceiptGenerator>;
