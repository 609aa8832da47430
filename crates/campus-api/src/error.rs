use thiserror::Error;

/// Top-level error type for the `campus-api` crate.
///
/// Covers every failure mode across all remote surfaces: HTTP transport,
/// the realtime device store, the REST backend, and the media host.
/// `campus-core` maps these into domain errors and toggle outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    // ── Realtime store ──────────────────────────────────────────────
    /// The realtime store refused the read or write (rules / bad secret).
    #[error("Permission denied at '{path}': {message}")]
    PermissionDenied { path: String, message: String },

    /// The realtime store rejected a write or a stream request.
    #[error("Realtime store error at '{path}': {message}")]
    Realtime { path: String, message: String },

    /// The server-push stream ended.
    #[error("Realtime stream for '{path}' closed")]
    StreamClosed { path: String },

    /// The server cancelled the subscription.
    #[error("Realtime subscription for '{path}' cancelled: {reason}")]
    SubscriptionCancelled { path: String, reason: String },

    // ── REST backend ────────────────────────────────────────────────
    /// Non-success response from the REST backend.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    // ── Media host ──────────────────────────────────────────────────
    /// The media host refused the upload or returned no asset URL.
    #[error("Media upload failed: {message}")]
    Upload { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Local file could not be read for upload.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::StreamClosed { .. } => true,
            Self::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Backend { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the remote refused access.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Backend { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Backend {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn backend_404_is_not_found() {
        let err = Error::Backend {
            status: 404,
            message: "missing".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn permission_denied_variants() {
        let rt = Error::PermissionDenied {
            path: "D118".into(),
            message: "Permission denied".into(),
        };
        let backend = Error::Backend {
            status: 401,
            message: "unauthorized".into(),
        };
        assert!(rt.is_permission_denied());
        assert!(backend.is_permission_denied());
    }
}
