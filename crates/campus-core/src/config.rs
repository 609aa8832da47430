// ── Runtime console configuration ──
//
// These types describe where the console's remote services live and how
// the synchronizer behaves. They carry credential data but never touch
// disk: the CLI constructs a `ConsoleConfig` and hands it in.

use std::time::Duration;

use campus_api::ReconnectConfig;
use secrecy::SecretString;
use url::Url;

use crate::registry::DeviceRegistry;

/// Default bound on a single toggle write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the synchronizer does when a group subscription fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReconnectPolicy {
    /// Stay failed until the caller runs `start()` again.
    #[default]
    Manual,
    /// Resubscribe the failed group with exponential backoff.
    Backoff(ReconnectConfig),
}

/// Synchronizer tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// A toggle whose write is not acknowledged in time fails with
    /// `ToggleFailure::Timeout`.
    pub write_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            reconnect: ReconnectPolicy::Manual,
        }
    }
}

/// Realtime database location and credential.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Database root (e.g. `https://campus-ac-default-rtdb.firebaseio.com`).
    pub url: Url,
    /// Database secret or ID token, sent as the `auth` query parameter.
    pub secret: Option<SecretString>,
}

/// Unsigned-upload settings for the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Full upload endpoint, e.g.
    /// `https://api.cloudinary.com/v1_1/<cloud>/auto/upload`.
    pub upload_url: Url,
    pub preset: String,
    pub folder: Option<String>,
}

/// Everything the console needs to reach its services.
///
/// Built by the CLI, passed to `Console` / `Synchronizer`. Core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// `None` only in offline mode, where an in-memory store stands in.
    pub realtime: Option<RealtimeConfig>,
    pub backend_url: Option<Url>,
    pub media: Option<MediaConfig>,
    /// Request timeout for backend and media calls.
    pub timeout: Duration,
    pub sync: SyncConfig,
    pub registry: DeviceRegistry,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            realtime: None,
            backend_url: None,
            media: None,
            timeout: Duration::from_secs(30),
            sync: SyncConfig::default(),
            registry: DeviceRegistry::default(),
        }
    }
}
