//! # Probe Error Types
//!
//! Unified error handling for the probe library and CLI.

use thiserror::Error;

/// Probe operation result type
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Comprehensive error types for probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected status {status} (expected {}): {body}", format_expected(.expected))]
    UnexpectedStatus {
        status: u16,
        expected: Vec<u16>,
        body: String,
    },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Field '{field}' mismatch: expected {expected}, got {actual}")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Unexpected response shape: expected {expected}, got {actual}")]
    UnexpectedShape { expected: String, actual: String },

    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    #[error("Backend at {url} not reachable after {attempts} attempts: {last_error}")]
    BackendUnreachable {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("{failed} of {total} probe steps failed")]
    StepsFailed { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_expected(expected: &[u16]) -> String {
    expected
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

impl ProbeError {
    /// Create an unexpected status error, truncating long bodies
    pub fn unexpected_status(status: u16, expected: &[u16], body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_BODY_EXCERPT {
            let mut cut = MAX_BODY_EXCERPT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push_str("...");
        }
        Self::UnexpectedStatus {
            status,
            expected: expected.to_vec(),
            body,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a field mismatch error
    pub fn field_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::FieldMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unexpected shape error
    pub fn unexpected_shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether the error aborts the whole run rather than a single step
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::BackendUnreachable { .. } | ProbeError::Config(_)
        )
    }
}

/// Longest response body kept in an error message
const MAX_BODY_EXCERPT: usize = 512;
