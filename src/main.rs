use checkout_engine::application::coordinator::CheckoutService;
use checkout_engine::application::pipeline::CheckoutPipeline;
use checkout_engine::config::{CheckoutConfig, OverflowPolicy};
use checkout_engine::infrastructure::in_memory::{
    FlatRateTaxCalculator, InMemoryReceiptGenerator, InMemoryStockValidator,
    SimulatedPaymentProcessor,
};
use checkout_engine::interfaces::csv::receipt_writer::ReceiptWriter;
use checkout_engine::interfaces::json::request_reader::RequestReader;
use checkout_engine::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checkout requests, one JSON object per line
    input: PathBuf,

    /// JSON configuration file (optional). Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flat tax rate applied to each order subtotal, e.g. 0.1
    #[arg(long)]
    tax_rate: Option<Decimal>,

    /// Maximum number of pending orders. Unbounded when omitted.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// What to do when a bounded queue is full
    #[arg(long, value_enum)]
    overflow: Option<OverflowPolicy>,

    /// Largest single charge the payment processor approves
    #[arg(long)]
    payment_limit: Option<Decimal>,
}

impl Cli {
    fn load_config(&self) -> Result<CheckoutConfig> {
        let mut config = match &self.config {
            Some(path) => CheckoutConfig::from_path(path).into_diagnostic()?,
            None => CheckoutConfig::default(),
        };
        if let Some(rate) = self.tax_rate {
            config.tax_rate = rate;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue.capacity = Some(capacity);
        }
        if let Some(overflow) = self.overflow {
            config.queue.overflow = overflow;
        }
        if let Some(limit) = self.payment_limit {
            config.payment_limit = Some(limit);
        }
        config.validate().into_diagnostic()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let receipts = InMemoryReceiptGenerator::new();
    let pipeline = CheckoutPipeline::new(
        Box::new(InMemoryStockValidator::with_inventory(
            config.inventory.clone(),
        )),
        Box::new(FlatRateTaxCalculator::new(config.tax_rate)),
        Box::new(SimulatedPaymentProcessor::new(config.payment_limit)),
        Box::new(receipts.clone()),
    );
    let service = CheckoutService::start(&config.queue, pipeline).into_diagnostic()?;

    // Submit every request; each one is acknowledged before it is processed
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request in reader.requests() {
        match request {
            Ok(request) => match service.submit(request).await {
                Ok(ack) => {
                    tracing::info!(order_id = %ack.order_id, status = %ack.status, "Order accepted")
                }
                Err(e) => tracing::error!(error = %e, "Error submitting request"),
            },
            Err(e) => tracing::error!(error = %e, "Error reading request"),
        }
    }

    // Drain the queue so every accepted order has a terminal outcome
    let report = service.shutdown().await.into_diagnostic()?;
    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        faulted = report.faulted,
        "All orders processed"
    );

    let records = receipts.records().await;
    let stdout = io::stdout();
    let mut writer = ReceiptWriter::new(stdout.lock());
    writer.write_receipts(&records).into_diagnostic()?;

    Ok(())
}
