//! CLI configuration: thin wrapper around `campus_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--backend, --realtime, --timeout, ...).

use std::time::Duration;

use secrecy::SecretString;

use campus_core::{ConsoleConfig, RealtimeConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use campus_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `ConsoleConfig` from the config file, profile, and CLI overrides.
///
/// Flags take priority over profile values. A missing profile is only an
/// error when it was named explicitly with `--profile`.
pub fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    let mut console =
        campus_config::profile_to_console_config(&profile, &profile_name, &cfg.defaults)?;

    // 1. Backend URL (flag > env > profile)
    if let Some(ref raw) = global.backend {
        console.backend_url = Some(campus_config::parse_url("backend", raw)?);
    }

    // 2. Realtime URL + secret (flag > env > profile)
    if let Some(ref raw) = global.realtime {
        let url = campus_config::parse_url("realtime", raw)?;
        let secret = console
            .realtime
            .take()
            .and_then(|r| r.secret)
            .or_else(|| campus_config::resolve_realtime_secret(&profile, &profile_name));
        console.realtime = Some(RealtimeConfig { url, secret });
    }
    if let (Some(secret), Some(realtime)) = (&global.realtime_secret, console.realtime.as_mut()) {
        realtime.secret = Some(SecretString::from(secret.clone()));
    }

    // 3. Timeouts
    console.timeout = Duration::from_secs(global.timeout);
    if let Some(secs) = global.write_timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "write-timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        console.sync.write_timeout = Duration::from_secs(secs);
    }

    Ok(console)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
