// ── Class notifications ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::activity::AcademicYear;
use crate::error::CoreError;

/// Default sender when none is given.
pub const DEFAULT_SENDER: &str = "HOD";

/// A class section receiving notifications: `1-a` .. `4-b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassSection {
    pub year: AcademicYear,
    pub section: char,
}

impl ClassSection {
    /// Every valid receiver, in display order.
    pub fn all() -> Vec<Self> {
        AcademicYear::ALL
            .into_iter()
            .flat_map(|year| ['a', 'b'].map(|section| Self { year, section }))
            .collect()
    }
}

impl FromStr for ClassSection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CoreError::validation(format!(
                "invalid receiver '{s}' (expected one of 1-a, 1-b, .. 4-b)"
            ))
        };
        let (year, section) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: u8 = year.parse().map_err(|_| invalid())?;
        let year = AcademicYear::try_from(year).map_err(|_| invalid())?;
        let section = match section.to_ascii_lowercase().as_str() {
            "a" => 'a',
            "b" => 'b',
            _ => return Err(invalid()),
        };
        Ok(Self { year, section })
    }
}

impl fmt::Display for ClassSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year.number(), self.section)
    }
}

impl Serialize for ClassSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A file to attach, uploaded to the media host before sending.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// A validated notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub sender: String,
    pub receiver: ClassSection,
    pub message: String,
    pub attachment: Option<Attachment>,
}

impl NewNotification {
    pub fn new(
        sender: Option<String>,
        receiver: ClassSection,
        message: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let message = message.into().trim().to_owned();
        if message.is_empty() {
            return Err(CoreError::validation("message must not be empty"));
        }
        let sender = sender
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SENDER.to_owned());
        Ok(Self {
            sender,
            receiver,
            message,
            attachment: None,
        })
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// A sent notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub sender: String,
    /// Raw receiver as stored; older records may predate section codes.
    pub receiver: String,
    pub message: String,
    pub media_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
