use crate::domain::order::CheckoutRequest;
use crate::error::{CheckoutError, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads checkout requests from a JSON-lines source.
///
/// Each non-blank line holds one request object. A malformed line yields an error
/// for that line only; reading continues with the next one.
pub struct RequestReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<CheckoutRequest>> {
        self.reader
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|(index, line)| {
                let line = line?;
                serde_json::from_str(&line).map_err(|source| CheckoutError::InvalidRequest {
                    line: index + 1,
                    source,
                })
            })
    }
}
