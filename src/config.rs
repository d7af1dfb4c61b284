//! Runtime configuration for the checkout service.
//!
//! Loaded from an optional JSON file; every field has a default so a partial file
//! (or no file at all) is valid. The CLI applies its flags on top.

use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What a producer experiences when a bounded queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Fail the submission immediately.
    #[default]
    Reject,
    /// Wait until the worker frees a slot.
    Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of pending orders. `None` means unbounded.
    pub capacity: Option<usize>,
    pub overflow: OverflowPolicy,
}

impl QueueConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            capacity: Some(capacity),
            overflow,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == Some(0) {
            return Err(CheckoutError::ValidationError(
                "Queue capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub queue: QueueConfig,
    /// Flat tax rate applied to the order subtotal, e.g. `0.1` for 10%.
    pub tax_rate: Decimal,
    /// Largest single charge the payment processor approves.
    pub payment_limit: Option<Decimal>,
    /// Units in stock per item id.
    pub inventory: BTreeMap<String, u32>,
}

impl CheckoutConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.queue.validate()?;
        if self.tax_rate < Decimal::ZERO {
            return Err(CheckoutError::ValidationError(
                "Tax rate must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
