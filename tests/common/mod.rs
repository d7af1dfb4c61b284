#![allow(dead_code)]

use async_trait::async_trait;
use checkout_engine::application::coordinator::CheckoutService;
use checkout_engine::application::pipeline::CheckoutPipeline;
use checkout_engine::config::QueueConfig;
use checkout_engine::domain::order::{
    CheckoutRequest, CheckoutResponse, CustomerId, OrderLineItem, PaymentInfo,
};
use checkout_engine::domain::ports::{
    PaymentProcessor, ReceiptGenerator, StockValidator, TaxCalculator,
};
use checkout_engine::error::Result;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Validate,
    Tax(CustomerId),
    Pay(CustomerId, Decimal),
    Failure(CustomerId, CheckoutResponse),
    Success(CustomerId, CheckoutResponse, Decimal),
}

/// Scriptable stand-in for all four collaborators that records every call.
#[derive(Clone)]
pub struct FakeCollaborators {
    in_stock: bool,
    tax: Decimal,
    approve: bool,
    /// When set, stock validation waits for a permit before answering.
    gate: Option<Arc<Semaphore>>,
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for FakeCollaborators {
    fn default() -> Self {
        Self {
            in_stock: true,
            tax: Decimal::ZERO,
            approve: true,
            gate: None,
            calls: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }
}

impl FakeCollaborators {
    pub fn with_tax(mut self, tax: Decimal) -> Self {
        self.tax = tax;
        self
    }

    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    pub fn declining(mut self) -> Self {
        self.approve = false;
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn service(&self, config: &QueueConfig) -> CheckoutService {
        CheckoutService::start(config, self.pipeline()).unwrap()
    }

    pub fn pipeline(&self) -> CheckoutPipeline {
        CheckoutPipeline::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Terminal reports only, in the order they were made.
    pub fn reports(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Failure(..) | Call::Success(..)))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn finish(&self, call: Call) {
        self.log(call);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StockValidator for FakeCollaborators {
    async fn validate(&self, _line_items: &[OrderLineItem]) -> Result<bool> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.log(Call::Validate);
        Ok(self.in_stock)
    }
}

#[async_trait]
impl TaxCalculator for FakeCollaborators {
    async fn calculate_tax(
        &self,
        customer_id: CustomerId,
        _: &[OrderLineItem],
    ) -> Result<Decimal> {
        tokio::task::yield_now().await;
        self.log(Call::Tax(customer_id));
        Ok(self.tax)
    }
}

#[async_trait]
impl PaymentProcessor for FakeCollaborators {
    async fn process(
        &self,
        customer_id: CustomerId,
        _: &PaymentInfo,
        amount: Decimal,
    ) -> Result<bool> {
        tokio::task::yield_now().await;
        self.log(Call::Pay(customer_id, amount));
        Ok(self.approve)
    }
}

#[async_trait]
impl ReceiptGenerator for FakeCollaborators {
    async fn report_failure(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
    ) -> Result<()> {
        self.finish(Call::Failure(customer_id, response));
        Ok(())
    }

    async fn report_success(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
        amount: Decimal,
    ) -> Result<()> {
        self.finish(Call::Success(customer_id, response, amount));
        Ok(())
    }
}

pub fn request(items: &[(&str, u32, Decimal)]) -> CheckoutRequest {
    CheckoutRequest {
        customer_id: Uuid::new_v4(),
        line_items: items
            .iter()
            .map(|&(sku, quantity, price)| OrderLineItem::new(sku, quantity, price).unwrap())
            .collect(),
        payment_info: PaymentInfo {
            card_holder: "Test Customer".to_string(),
            card_number: "4111111111111111".to_string(),
            expiry_month: 12,
            expiry_year: 2030,
        },
    }
}

/// A one-line order for tests that only care about flow, not amounts.
pub fn single_item() -> CheckoutRequest {
    request(&[("sku-1", 1, Decimal::ONE)])
}

pub fn report_customer(call: &Call) -> Option<CustomerId> {
    match call {
        Call::Failure(customer_id, _) | Call::Success(customer_id, ..) => Some(*customer_id),
        _ => None,
    }
}
