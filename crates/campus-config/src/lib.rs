//! Shared configuration for the campus console.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `campus_core::ConsoleConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use campus_core::{
    ConsoleConfig, DeviceRegistry, GroupDefinition, MediaConfig, RealtimeConfig, ReconnectConfig,
    ReconnectPolicy, SyncConfig,
};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "campusctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named deployment profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// The profile name to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout for backend and media calls, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Toggle write timeout, in seconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            write_timeout: default_write_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_write_timeout() -> u64 {
    campus_core::DEFAULT_WRITE_TIMEOUT.as_secs()
}

/// A named deployment profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Document backend base URL (e.g., "https://campus-api.onrender.com").
    pub backend: Option<String>,

    /// Realtime database URL (e.g., "https://campus-ac-default-rtdb.firebaseio.com").
    pub realtime: Option<String>,

    /// Realtime database secret (plaintext; prefer keyring or env var).
    pub realtime_secret: Option<String>,

    /// Environment variable name containing the realtime secret.
    pub realtime_secret_env: Option<String>,

    /// Media host upload endpoint.
    pub media_url: Option<String>,

    /// Unsigned upload preset on the media host.
    pub media_preset: Option<String>,

    /// Target folder on the media host.
    pub media_folder: Option<String>,

    /// Override request timeout.
    pub timeout: Option<u64>,

    /// Override toggle write timeout.
    pub write_timeout: Option<u64>,

    /// Automatic resubscription; absent means manual restart.
    pub reconnect: Option<ReconnectSettings>,

    /// Device groups; empty means the built-in rooms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDefinition>,
}

/// `[profiles.<name>.reconnect]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReconnectSettings {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Give up after this many attempts; absent retries forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            max_retries: None,
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_max_delay_secs() -> u64 {
    30
}

impl From<&ReconnectSettings> for ReconnectConfig {
    fn from(settings: &ReconnectSettings) -> Self {
        Self {
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_secs(settings.max_delay_secs),
            max_retries: settings.max_retries,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("edu", "campusctl", "campusctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("campusctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment keys use `CAMPUS_` and `__` as the nesting separator, e.g.
/// `CAMPUS_DEFAULTS__TIMEOUT=60` or `CAMPUS_PROFILES__LAB__BACKEND=...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CAMPUS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn secret_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/realtime-secret"))
}

/// Resolve the realtime secret. `None` means the database is accessed
/// unauthenticated.
pub fn resolve_realtime_secret(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's realtime_secret_env → env var lookup
    if let Some(ref env_name) = profile.realtime_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = secret_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .realtime_secret
        .as_ref()
        .map(|s| SecretString::from(s.clone()))
}

/// Store the realtime secret for `profile_name` in the system keyring.
pub fn store_realtime_secret(profile_name: &str, secret: &str) -> Result<(), ConfigError> {
    secret_entry(profile_name)?.set_password(secret)?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

pub fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse()
        .map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))
}

fn media_config(profile: &Profile) -> Result<Option<MediaConfig>, ConfigError> {
    match (&profile.media_url, &profile.media_preset) {
        (None, None) => Ok(None),
        (Some(url), Some(preset)) => Ok(Some(MediaConfig {
            upload_url: parse_url("media_url", url)?,
            preset: preset.clone(),
            folder: profile.media_folder.clone(),
        })),
        (Some(_), None) => Err(invalid("media_preset", "required when media_url is set")),
        (None, Some(_)) => Err(invalid("media_url", "required when media_preset is set")),
    }
}

/// Build the device registry a profile describes.
pub fn profile_registry(profile: &Profile) -> Result<DeviceRegistry, ConfigError> {
    if profile.groups.is_empty() {
        return Ok(DeviceRegistry::default());
    }
    DeviceRegistry::new(profile.groups.clone()).map_err(|e| invalid("groups", e.to_string()))
}

/// Build a `ConsoleConfig` from a profile and global defaults, with no
/// CLI flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let backend_url = profile
        .backend
        .as_deref()
        .map(|raw| parse_url("backend", raw))
        .transpose()?;

    let realtime = profile
        .realtime
        .as_deref()
        .map(|raw| -> Result<RealtimeConfig, ConfigError> {
            Ok(RealtimeConfig {
                url: parse_url("realtime", raw)?,
                secret: resolve_realtime_secret(profile, profile_name),
            })
        })
        .transpose()?;

    let write_timeout = profile.write_timeout.unwrap_or(defaults.write_timeout);
    if write_timeout == 0 {
        return Err(invalid("write_timeout", "must be at least 1 second"));
    }

    let reconnect = profile
        .reconnect
        .as_ref()
        .map_or(ReconnectPolicy::Manual, |settings| {
            ReconnectPolicy::Backoff(settings.into())
        });

    Ok(ConsoleConfig {
        realtime,
        backend_url,
        media: media_config(profile)?,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        sync: SyncConfig {
            write_timeout: Duration::from_secs(write_timeout),
            reconnect,
        },
        registry: profile_registry(profile)?,
    })
}
