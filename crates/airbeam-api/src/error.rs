use thiserror::Error;

/// Top-level error type for the `airbeam-api` crate.
///
/// Covers every failure mode of a device interaction: transport, unexpected
/// HTTP status, malformed XML/HTML payloads, and local writes during a
/// download. `airbeam-core` maps these into per-device cycle failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The device answered with something other than HTTP 200.
    #[error("Device returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// The `/info` document is not well-formed XML.
    #[error("Malformed status XML: {0}")]
    Xml(String),

    /// A required node is absent from the `/info` document.
    #[error("Status document has no `{field}` node")]
    MissingField { field: &'static str },

    /// The recordings index could not be parsed.
    #[error("Malformed recordings index: {0}")]
    Html(String),

    // ── Local ───────────────────────────────────────────────────────
    /// Writing a downloaded recording to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if the device could not be reached at all.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
