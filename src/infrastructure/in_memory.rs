use crate::domain::order::{CheckoutResponse, CustomerId, OrderLineItem, PaymentInfo};
use crate::domain::ports::{PaymentProcessor, ReceiptGenerator, StockValidator, TaxCalculator};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory inventory.
///
/// Uses `Arc<RwLock<HashMap<String, u32>>>` so clones share the same stock levels.
/// Validation never reserves or decrements stock.
#[derive(Default, Clone)]
pub struct InMemoryStockValidator {
    inventory: Arc<RwLock<HashMap<String, u32>>>,
}

impl InMemoryStockValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory<I, K>(inventory: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        let inventory = inventory.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            inventory: Arc::new(RwLock::new(inventory)),
        }
    }

    pub async fn set_stock(&self, item_id: impl Into<String>, units: u32) {
        self.inventory.write().await.insert(item_id.into(), units);
    }
}

#[async_trait]
impl StockValidator for InMemoryStockValidator {
    async fn validate(&self, line_items: &[OrderLineItem]) -> Result<bool> {
        // The same sku can appear on several lines.
        let mut requested: HashMap<&str, u64> = HashMap::new();
        for item in line_items {
            *requested.entry(item.item_id()).or_default() += u64::from(item.quantity());
        }

        let inventory = self.inventory.read().await;
        Ok(requested.into_iter().all(|(item_id, quantity)| {
            inventory
                .get(item_id)
                .is_some_and(|&units| u64::from(units) >= quantity)
        }))
    }
}

/// Applies one flat rate to the subtotal, rounded half-up to cents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRateTaxCalculator {
    rate: Decimal,
}

impl FlatRateTaxCalculator {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl TaxCalculator for FlatRateTaxCalculator {
    async fn calculate_tax(
        &self,
        _customer_id: CustomerId,
        line_items: &[OrderLineItem],
    ) -> Result<Decimal> {
        let subtotal: Decimal = line_items.iter().map(OrderLineItem::line_total).sum();
        let tax = subtotal * self.rate;
        Ok(tax.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub customer_id: CustomerId,
    pub card: String,
    pub amount: Decimal,
}

/// Payment processor that approves any charge within an optional limit.
///
/// Declines when the card number is blank. Approved charges are kept in memory.
#[derive(Default, Clone)]
pub struct SimulatedPaymentProcessor {
    limit: Option<Decimal>,
    charges: Arc<RwLock<Vec<Charge>>>,
}

impl SimulatedPaymentProcessor {
    pub fn new(limit: Option<Decimal>) -> Self {
        Self {
            limit,
            charges: Arc::default(),
        }
    }

    pub async fn charges(&self) -> Vec<Charge> {
        self.charges.read().await.clone()
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    async fn process(
        &self,
        customer_id: CustomerId,
        payment_info: &PaymentInfo,
        amount: Decimal,
    ) -> Result<bool> {
        if payment_info.card_number.trim().is_empty() {
            return Ok(false);
        }
        if self.limit.is_some_and(|limit| amount > limit) {
            return Ok(false);
        }

        self.charges.write().await.push(Charge {
            customer_id,
            card: payment_info.masked_number(),
            amount,
        });
        Ok(true)
    }
}

/// A terminal outcome as seen by the receipt generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRecord {
    pub customer_id: CustomerId,
    pub response: CheckoutResponse,
    /// Charged amount; only present for successful orders.
    pub amount: Option<Decimal>,
}

/// Records every terminal report in arrival order instead of sending email.
#[derive(Default, Clone)]
pub struct InMemoryReceiptGenerator {
    records: Arc<RwLock<Vec<ReceiptRecord>>>,
}

impl InMemoryReceiptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ReceiptRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ReceiptGenerator for InMemoryReceiptGenerator {
    async fn report_failure(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
    ) -> Result<()> {
        tracing::warn!(
            order_id = %response.order_id,
            %customer_id,
            message = %response.message,
            "Order failed"
        );
        self.records.write().await.push(ReceiptRecord {
            customer_id,
            response,
            amount: None,
        });
        Ok(())
    }

    async fn report_success(
        &self,
        customer_id: CustomerId,
        response: CheckoutResponse,
        amount: Decimal,
    ) -> Result<()> {
        tracing::info!(order_id = %response.order_id, %customer_id, %amount, "Receipt generated");
        self.records.write().await.push(ReceiptRecord {
            customer_id,
            response,
            amount: Some(amount),
        });
        Ok(())
    }
}
