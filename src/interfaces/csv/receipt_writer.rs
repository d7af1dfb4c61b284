use crate::error::Result;
use crate::infrastructure::in_memory::ReceiptRecord;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 5] = ["order_id", "customer_id", "status", "amount", "message"];

#[derive(Serialize)]
struct ReceiptRow<'a> {
    order_id: String,
    customer_id: String,
    status: String,
    amount: Option<String>,
    message: &'a str,
}

/// Writes terminal order outcomes as CSV.
pub struct ReceiptWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReceiptWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(sink),
        }
    }

    /// Writes the header and one row per record, then flushes.
    ///
    /// The header is written even when there are no records.
    pub fn write_receipts<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a ReceiptRecord>,
    ) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for record in records {
            self.writer.serialize(ReceiptRow {
                order_id: record.response.order_id.to_string(),
                customer_id: record.customer_id.to_string(),
                status: record.response.status.to_string(),
                amount: record.amount.map(|a| a.normalize().to_string()),
                message: &record.response.message,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
