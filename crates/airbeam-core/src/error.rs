// ── Core error types ──
//
// Errors surfaced by a device cycle. The `From<airbeam_api::Error>` impl
// folds transport-layer failures into the two classes the supervisor acts
// on: the device could not be reached, or it answered with something we
// could not use.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Device errors ────────────────────────────────────────────────
    #[error("Device returned HTTP {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Malformed device response: {message}")]
    MalformedResponse { message: String },

    #[error("Device request failed: {message}")]
    Request { message: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` when the device was unreachable.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<airbeam_api::Error> for CoreError {
    fn from(err: airbeam_api::Error) -> Self {
        if err.is_connection() {
            let url = match &err {
                airbeam_api::Error::Transport(e) => e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                _ => "<unknown>".into(),
            };
            return CoreError::ConnectionFailed {
                url,
                reason: err.to_string(),
            };
        }

        match err {
            airbeam_api::Error::Status { url, status } => {
                CoreError::UnexpectedStatus { url, status }
            }
            airbeam_api::Error::Xml(message) | airbeam_api::Error::Html(message) => {
                CoreError::MalformedResponse { message }
            }
            airbeam_api::Error::MissingField { field } => CoreError::MalformedResponse {
                message: format!("status document has no `{field}` node"),
            },
            airbeam_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            airbeam_api::Error::Io(e) => CoreError::Storage(e),
            airbeam_api::Error::Transport(e) => CoreError::Request {
                message: e.to_string(),
            },
        }
    }
}
