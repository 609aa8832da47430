//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use crate::error::CliError;

/// An `ac` target: a whole room, or one unit in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Room(String),
    Unit { room: String, unit: String },
}

/// Parse `ROOM` or `ROOM/UNIT`.
pub fn parse_target(raw: &str) -> Result<Target, CliError> {
    let invalid = || CliError::Validation {
        field: "target".into(),
        reason: format!("'{raw}' is not ROOM or ROOM/UNIT"),
    };
    let raw = raw.trim();
    match raw.split_once('/') {
        None if !raw.is_empty() => Ok(Target::Room(raw.to_owned())),
        None => Err(invalid()),
        Some((room, unit)) => {
            if room.is_empty() || unit.is_empty() || unit.contains('/') {
                return Err(invalid());
            }
            Ok(Target::Unit {
                room: room.to_owned(),
                unit: unit.to_owned(),
            })
        }
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read a file for upload, returning its base name and contents.
pub fn read_upload(path: &Path, field: &str) -> Result<(String, Vec<u8>), CliError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("'{}' is not a file path", path.display()),
        })?
        .to_owned();
    let bytes = std::fs::read(path).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })?;
    Ok((file_name, bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn room_and_unit_targets() {
        assert_eq!(parse_target("D118").unwrap(), Target::Room("D118".into()));
        assert_eq!(
            parse_target(" D118/D118-2 ").unwrap(),
            Target::Unit {
                room: "D118".into(),
                unit: "D118-2".into()
            }
        );
    }

    #[test]
    fn malformed_targets_are_rejected() {
        for raw in ["", "/", "D118/", "/D118-1", "D118/a/b"] {
            assert!(
                matches!(parse_target(raw), Err(CliError::Validation { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn read_upload_takes_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.png");
        std::fs::write(&path, b"png").unwrap();

        let (name, bytes) = read_upload(&path, "file").unwrap();
        assert_eq!(name, "poster.png");
        assert_eq!(bytes, b"png");
    }

    #[test]
    fn read_upload_missing_file() {
        let err = read_upload(Path::new("/nonexistent/poster.png"), "file").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "file"));
    }
}
