// Wire types for the document backend.
//
// Documents are Mongo-style: `_id` plus camelCase fields. Fields the
// console does not use are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Academic year as stored. Older documents carry a string (`"2"`), newer
/// ones a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(u8),
    Text(String),
}

impl YearValue {
    /// Numeric year, if the stored value is one.
    pub fn as_number(&self) -> Option<u8> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub year: YearValue,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /api/activities` body. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub name: String,
    pub year: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub sender: String,
    pub receiver: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

/// Response of `POST /api/upload-calendar`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CalendarImport {
    /// Number of activities the backend extracted and stored.
    pub count: u32,
    /// Raw text the backend extracted from the document.
    #[serde(default)]
    pub text: String,
}

/// Creation responses: the stored document, or an acknowledgement.
/// Only the id is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Created {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}
