use std::error::Error as _;

use thiserror::Error;

/// Failure raised by an external AI capability.
///
/// Forwarders never show this to a caller; it only reaches the server log.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl FlowError {
    /// Error message followed by every `source()` in the chain.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            detail.push_str("\n  caused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_includes_status_and_body() {
        let err = FlowError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.detail(), "upstream returned 502: bad gateway");
    }

    #[test]
    fn malformed_detail_is_the_message() {
        let err = FlowError::Malformed("missing `result`".to_string());
        assert_eq!(err.detail(), "malformed upstream response: missing `result`");
    }
}
