//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for an optional value; an empty answer means `None`.
fn prompt_optional(prompt: &str) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_owned()))
}

/// Ask where to keep the realtime secret. Returns the value to write to the
/// config file: `None` when it went to the keyring.
fn store_secret(profile_name: &str, secret: &str) -> Result<Option<String>, CliError> {
    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the realtime secret?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if store_selection == 0 {
        campus_config::store_realtime_secret(profile_name, secret)?;
        eprintln!("   ✓ Secret stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.realtime_secret.is_some() {
            profile.realtime_secret = Some(REDACTED.into());
        }
    }
    cfg
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "backend" => {
            campus_config::parse_url("backend", &value)?;
            profile.backend = Some(value);
        }
        "realtime" => {
            campus_config::parse_url("realtime", &value)?;
            profile.realtime = Some(value);
        }
        "realtime_secret_env" | "realtime-secret-env" => profile.realtime_secret_env = Some(value),
        "media_url" | "media-url" => {
            campus_config::parse_url("media_url", &value)?;
            profile.media_url = Some(value);
        }
        "media_preset" | "media-preset" => profile.media_preset = Some(value),
        "media_folder" | "media-folder" => profile.media_folder = Some(value),
        "timeout" => profile.timeout = Some(parse_secs("timeout", &value)?),
        "write_timeout" | "write-timeout" => {
            let secs = parse_secs("write_timeout", &value)?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "write_timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.write_timeout = Some(secs);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: backend, realtime, \
                     realtime_secret_env, media_url, media_preset, media_folder, \
                     timeout, write_timeout"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("campus configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Document backend
            let backend: String = Input::new()
                .with_prompt("Document backend URL")
                .interact_text()
                .map_err(prompt_err)?;
            campus_config::parse_url("backend", &backend)?;

            // 3. Realtime database + secret
            let realtime: String = Input::new()
                .with_prompt("Realtime database URL")
                .interact_text()
                .map_err(prompt_err)?;
            campus_config::parse_url("realtime", &realtime)?;

            let secret = rpassword::prompt_password("Realtime secret (empty for none): ")
                .map_err(prompt_err)?;
            let realtime_secret = if secret.is_empty() {
                None
            } else {
                store_secret(&profile_name, &secret)?
            };

            // 4. Media host (optional)
            let media_url = prompt_optional("Media upload URL (empty to skip)")?;
            let media_preset = match media_url {
                Some(ref url) => {
                    campus_config::parse_url("media_url", url)?;
                    Some(
                        Input::<String>::new()
                            .with_prompt("Unsigned upload preset")
                            .interact_text()
                            .map_err(prompt_err)?,
                    )
                }
                None => None,
            };

            // 5. Build profile and merge into existing config
            let profile = Profile {
                backend: Some(backend),
                realtime: Some(realtime),
                realtime_secret,
                media_url,
                media_preset,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            // 6. Write config
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: campus ping && campus ac status");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: campus config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetSecret ───────────────────────────────────────────────
        ConfigCommand::SetSecret { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let secret =
                rpassword::prompt_password("Realtime secret: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            campus_config::store_realtime_secret(&profile_name, &secret)?;
            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
