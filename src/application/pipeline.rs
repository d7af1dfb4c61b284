use crate::domain::order::{
    CheckoutResponse, CustomerId, OrderId, OrderStatus, QueueItem, order_amount,
};
use crate::domain::ports::{
    PaymentProcessorBox, ReceiptGeneratorBox, StockValidatorBox, TaxCalculatorBox,
};
use crate::error::CheckoutError;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    StockValidation,
    TaxCalculation,
    Payment,
    Reporting,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::StockValidation => "stock_validation",
            PipelineStage::TaxCalculation => "tax_calculation",
            PipelineStage::Payment => "payment",
            PipelineStage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Terminal result of running one order through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Succeeded { amount: Decimal },
    OutOfStock,
    PaymentDeclined,
    /// A collaborator failed unexpectedly. `stage` is `None` when the fault
    /// could not be attributed to a stage (e.g. a panic).
    Faulted {
        stage: Option<PipelineStage>,
        message: String,
    },
}

impl OrderOutcome {
    pub fn status(&self) -> OrderStatus {
        match self {
            OrderOutcome::Succeeded { .. } => OrderStatus::Successful,
            _ => OrderStatus::Failure,
        }
    }
}

struct StageFault {
    stage: PipelineStage,
    error: CheckoutError,
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFault>;
}

impl<T> AtStage<T> for crate::error::Result<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFault> {
        self.map_err(|error| StageFault { stage, error })
    }
}

/// Runs a single order through stock validation, tax, payment and receipt
/// reporting, stopping at the first business failure.
///
/// Every processed order produces exactly one terminal report: a failure report
/// for out-of-stock, declined payment, or an internal fault, otherwise a success
/// report carrying the charged amount.
pub struct CheckoutPipeline {
    stock_validator: StockValidatorBox,
    tax_calculator: TaxCalculatorBox,
    payment_processor: PaymentProcessorBox,
    receipt_generator: ReceiptGeneratorBox,
}

impl CheckoutPipeline {
    pub fn new(
        stock_validator: StockValidatorBox,
        tax_calculator: TaxCalculatorBox,
        payment_processor: PaymentProcessorBox,
        receipt_generator: ReceiptGeneratorBox,
    ) -> Self {
        Self {
            stock_validator,
            tax_calculator,
            payment_processor,
            receipt_generator,
        }
    }

    pub async fn process(&self, item: &QueueItem) -> OrderOutcome {
        self.process_tracked(item, &AtomicBool::new(false)).await
    }

    /// Same as [`process`](Self::process), raising `reported` right before a
    /// terminal report is attempted so a caller recovering from a panic knows
    /// whether the order still needs one.
    pub(crate) async fn process_tracked(
        &self,
        item: &QueueItem,
        reported: &AtomicBool,
    ) -> OrderOutcome {
        let span = tracing::info_span!(
            "checkout",
            order_id = %item.order_id,
            customer_id = %item.request.customer_id,
        );

        async move {
            match self.run_stages(item, reported).await {
                Ok(outcome) => outcome,
                Err(fault) => {
                    tracing::error!(
                        stage = %fault.stage,
                        error = %fault.error,
                        "Checkout stage failed"
                    );
                    if fault.stage != PipelineStage::Reporting {
                        reported.store(true, Ordering::SeqCst);
                        self.report_internal_failure(item.order_id, item.request.customer_id)
                            .await;
                    }
                    OrderOutcome::Faulted {
                        stage: Some(fault.stage),
                        message: fault.error.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        item: &QueueItem,
        reported: &AtomicBool,
    ) -> Result<OrderOutcome, StageFault> {
        let request = &item.request;

        let in_stock = self
            .stock_validator
            .validate(&request.line_items)
            .await
            .at(PipelineStage::StockValidation)?;
        if !in_stock {
            tracing::info!("Items not available in stock");
            reported.store(true, Ordering::SeqCst);
            self.receipt_generator
                .report_failure(
                    request.customer_id,
                    CheckoutResponse::out_of_stock(item.order_id),
                )
                .await
                .at(PipelineStage::Reporting)?;
            return Ok(OrderOutcome::OutOfStock);
        }

        let tax = self
            .tax_calculator
            .calculate_tax(request.customer_id, &request.line_items)
            .await
            .at(PipelineStage::TaxCalculation)?;
        let amount = order_amount(&request.line_items, tax);
        tracing::debug!(%tax, %amount, "Order amount computed");

        let paid = self
            .payment_processor
            .process(request.customer_id, &request.payment_info, amount)
            .await
            .at(PipelineStage::Payment)?;
        if !paid {
            tracing::info!(%amount, "Payment declined");
            reported.store(true, Ordering::SeqCst);
            self.receipt_generator
                .report_failure(
                    request.customer_id,
                    CheckoutResponse::payment_failure(item.order_id),
                )
                .await
                .at(PipelineStage::Reporting)?;
            return Ok(OrderOutcome::PaymentDeclined);
        }

        reported.store(true, Ordering::SeqCst);
        self.receipt_generator
            .report_success(
                request.customer_id,
                CheckoutResponse::successful(item.order_id),
                amount,
            )
            .await
            .at(PipelineStage::Reporting)?;
        tracing::info!(%amount, "Order placed");
        Ok(OrderOutcome::Succeeded { amount })
    }

    /// Best-effort failure report for an order that hit an internal fault.
    pub(crate) async fn report_internal_failure(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
    ) {
        if let Err(e) = self
            .receipt_generator
            .report_failure(customer_id, CheckoutResponse::internal_error(order_id))
            .await
        {
            tracing::error!(%order_id, error = %e, "Failed to report internal error");
        }
    }
}
