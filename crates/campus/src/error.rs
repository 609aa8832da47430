//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use campus_config::ConfigError;
use campus_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}: {reason}")]
    #[diagnostic(
        code(campus::connection_failed),
        help(
            "Check the URL and your network connection.\n\
             Render-hosted backends may need a minute to wake: campus ping"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Realtime subscription failed: {message}")]
    #[diagnostic(
        code(campus::subscription_failed),
        help("Check the realtime URL and secret, or try --demo for an offline store.")
    )]
    Subscription { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(campus::permission_denied),
        help("Store the database secret with: campus config set-secret")
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(campus::not_found),
        help("Run: campus {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Remote failures ──────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(campus::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("Upload failed: {message}")]
    #[diagnostic(
        code(campus::upload_failed),
        help("Check media_url and media_preset in your profile.")
    )]
    UploadFailed { message: String },

    #[error("{failed} of {total} AC toggles failed")]
    #[diagnostic(
        code(campus::toggle_failed),
        help("Units that failed keep their previous state. Retry the command.")
    )]
    ToggleFailed { failed: usize, total: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(campus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(campus::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: campus config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No {service} URL configured")]
    #[diagnostic(
        code(campus::no_config),
        help(
            "Create a profile with: campus config init\n\
             Or pass --{flag}. Config file: {path}"
        )
    )]
    NotConfigured {
        service: String,
        flag: String,
        path: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(campus::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(campus::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(campus::timeout),
        help("Increase the limit with --timeout, --wait, or --write-timeout.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Subscription { .. } => exit_code::CONNECTION,
            Self::PermissionDenied { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(401 | 403),
                ..
            } => exit_code::AUTH,
            Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::ToggleFailed { .. } => exit_code::PARTIAL,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NotConfigured { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownGroup { group } => CliError::NotFound {
                resource_type: "room".into(),
                identifier: group,
                list_command: "ac status".into(),
            },
            CoreError::UnknownDevice { group, device } => CliError::NotFound {
                resource_type: "AC unit".into(),
                identifier: format!("{group}/{device}"),
                list_command: format!("ac status {group}"),
            },
            CoreError::SubscriptionError { group, message } => CliError::Subscription {
                message: format!("{group}: {message}"),
            },
            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type,
                identifier,
                list_command: "--help".into(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::UploadFailed { message } => CliError::UploadFailed { message },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<campus_api::Error> for CliError {
    fn from(err: campus_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see: campus config profiles)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
