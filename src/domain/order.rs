use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const IN_PROGRESS_MESSAGE: &str = "Your order is in progress and you will receive an email with all details once the processing completes.";
pub const OUT_OF_STOCK_MESSAGE: &str = "Item not available in stock";
pub const PAYMENT_FAILURE_MESSAGE: &str = "Payment failure";
pub const SUCCESS_MESSAGE: &str =
    "Order was successfully placed. You will receive the receipt in email";
pub const INTERNAL_ERROR_MESSAGE: &str = "Order could not be processed due to an internal error";

pub type CustomerId = Uuid;

/// Globally unique identity assigned to a checkout request at intake time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generates a fresh random (v4) order identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single line of a shopping cart.
///
/// Quantity is always positive and price is never negative, whether the item was
/// built in code or deserialized from a request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord")]
pub struct OrderLineItem {
    item_id: String,
    quantity: u32,
    price: Decimal,
}

#[derive(Deserialize)]
struct LineItemRecord {
    item_id: String,
    quantity: u32,
    price: Decimal,
}

impl OrderLineItem {
    pub fn new(
        item_id: impl Into<String>,
        quantity: u32,
        price: Decimal,
    ) -> Result<Self, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }
        if price < Decimal::ZERO {
            return Err(CheckoutError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        Ok(Self {
            item_id: item_id.into(),
            quantity,
            price,
        })
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

impl TryFrom<LineItemRecord> for OrderLineItem {
    type Error = CheckoutError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        Self::new(record.item_id, record.quantity, record.price)
    }
}

/// Card details forwarded untouched to the payment processor.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub card_holder: String,
    pub card_number: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
}

impl PaymentInfo {
    /// Card number with everything but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let visible = digits.len().saturating_sub(4);
        let tail: String = digits[visible..].iter().collect();
        format!("{}{}", "*".repeat(visible), tail)
    }
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_holder", &self.card_holder)
            .field("card_number", &self.masked_number())
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish()
    }
}

/// A checkout request as submitted by the caller. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub line_items: Vec<OrderLineItem>,
    pub payment_info: PaymentInfo,
}

impl CheckoutRequest {
    pub fn subtotal(&self) -> Decimal {
        self.line_items.iter().map(OrderLineItem::line_total).sum()
    }
}

/// Unit of work handed from the coordinator to the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub order_id: OrderId,
    pub request: CheckoutRequest,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Successful,
    Failure,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Successful => "successful",
            OrderStatus::Failure => "failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub message: String,
}

impl CheckoutResponse {
    /// The immediate acknowledgment returned to the submitting caller.
    pub fn in_progress(order_id: OrderId) -> Self {
        Self::with_message(order_id, OrderStatus::InProgress, IN_PROGRESS_MESSAGE)
    }

    pub fn out_of_stock(order_id: OrderId) -> Self {
        Self::with_message(order_id, OrderStatus::Failure, OUT_OF_STOCK_MESSAGE)
    }

    pub fn payment_failure(order_id: OrderId) -> Self {
        Self::with_message(order_id, OrderStatus::Failure, PAYMENT_FAILURE_MESSAGE)
    }

    pub fn internal_error(order_id: OrderId) -> Self {
        Self::with_message(order_id, OrderStatus::Failure, INTERNAL_ERROR_MESSAGE)
    }

    pub fn successful(order_id: OrderId) -> Self {
        Self::with_message(order_id, OrderStatus::Successful, SUCCESS_MESSAGE)
    }

    fn with_message(order_id: OrderId, status: OrderStatus, message: &str) -> Self {
        Self {
            order_id,
            status,
            message: message.to_string(),
        }
    }
}

/// Amount charged for an order: `Σ(quantity × price) + tax`.
pub fn order_amount(line_items: &[OrderLineItem], tax: Decimal) -> Decimal {
    line_items
        .iter()
        .map(OrderLineItem::line_total)
        .sum::<Decimal>()
        + tax
}
