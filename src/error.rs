use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid request on line {line}: {source}")]
    InvalidRequest {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Collaborator error: {0}")]
    CollaboratorError(String),
    #[error("Checkout queue is full (capacity {0})")]
    QueueFull(usize),
    #[error("Checkout queue is closed")]
    QueueClosed,
    #[error("Worker error: {0}")]
    WorkerError(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
