// ── Core error types ──
//
// User-facing errors from campus-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<campus_api::Error>`
// impl translates transport-layer errors into domain variants.
//
// Toggle write failures are NOT errors: they come back as
// `ToggleResult::Failed`. Only registry lookups fail a toggle call.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry errors ──────────────────────────────────────────────
    #[error("Unknown group: {group}")]
    UnknownGroup { group: String },

    #[error("Unknown device: {group}/{device}")]
    UnknownDevice { group: String, device: String },

    // ── Realtime errors ──────────────────────────────────────────────
    #[error("Subscription to '{group}' failed: {message}")]
    SubscriptionError { group: String, message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Backend errors (wrapped, not exposed raw) ────────────────────
    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Upload failed: {message}")]
    UploadFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<campus_api::Error> for CoreError {
    fn from(err: campus_api::Error) -> Self {
        match err {
            campus_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            campus_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            campus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            campus_api::Error::ClientSetup(message) => CoreError::Config { message },
            campus_api::Error::PermissionDenied { path, message } => CoreError::PermissionDenied {
                message: format!("{path}: {message}"),
            },
            campus_api::Error::Realtime { path, message } => CoreError::Api {
                message: format!("{path}: {message}"),
                status: None,
            },
            campus_api::Error::StreamClosed { path } => CoreError::SubscriptionError {
                group: path,
                message: "stream closed".into(),
            },
            campus_api::Error::SubscriptionCancelled { path, reason } => {
                CoreError::SubscriptionError {
                    group: path,
                    message: reason,
                }
            }
            campus_api::Error::Backend { status: 404, message } => CoreError::NotFound {
                entity_type: "Document".into(),
                identifier: message,
            },
            campus_api::Error::Backend { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            campus_api::Error::Upload { message } => CoreError::UploadFailed { message },
            campus_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
            campus_api::Error::Io(e) => CoreError::Internal(e.to_string()),
        }
    }
}
