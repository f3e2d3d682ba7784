//! Error types.
//!
//! The store only ever sees [`ReportFetchFailed`]; transport details stay in
//! [`GatewayError`] and are flattened into the reason string at the fan-out.

use crate::models::ReportKind;
use thiserror::Error;

/// A single report could not be fetched for this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} report failed: {reason}")]
pub struct ReportFetchFailed {
    pub kind: ReportKind,
    pub reason: String,
}

impl ReportFetchFailed {
    pub fn new(kind: ReportKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl GatewayError {
    /// Attach the report kind, producing the store-level error.
    pub fn into_report_failure(self, kind: ReportKind) -> ReportFetchFailed {
        ReportFetchFailed::new(kind, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_failure_message() {
        let err = ReportFetchFailed::new(ReportKind::Publicize, "boom");
        assert_eq!(err.to_string(), "Publicize report failed: boom");
    }

    #[test]
    fn test_gateway_error_into_report_failure() {
        let err = GatewayError::Status {
            status: 403,
            body: "forbidden".to_string(),
        };
        let failure = err.into_report_failure(ReportKind::EmailFollowers);
        assert_eq!(failure.kind, ReportKind::EmailFollowers);
        assert_eq!(failure.reason, "API error 403: forbidden");
    }
}
