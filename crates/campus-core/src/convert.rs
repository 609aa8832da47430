// ── API-to-domain type conversions ──
//
// Bridges raw `campus_api::backend` documents into `campus_core::model`
// types. Dates are parsed leniently; unparseable values become `None`
// rather than failing the whole listing.

use chrono::{DateTime, NaiveDate, Utc};

use campus_api::backend::{ActivityDoc, ImageDoc, NotificationDoc};

use crate::model::{AcademicYear, Activity, GalleryImage, Notification};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse `YYYY-MM-DD`, also accepting a full ISO-8601 timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.get(..10)
        .unwrap_or(raw)
        .parse()
        .ok()
}

fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Documents ──────────────────────────────────────────────────────

impl From<ActivityDoc> for Activity {
    fn from(doc: ActivityDoc) -> Self {
        Self {
            year: doc
                .year
                .as_number()
                .and_then(|n| AcademicYear::try_from(n).ok()),
            start_date: parse_date(&doc.start_date),
            end_date: parse_date(&doc.end_date),
            id: doc.id,
            name: doc.name,
            description: doc.description,
        }
    }
}

impl From<ImageDoc> for GalleryImage {
    fn from(doc: ImageDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            url: doc.image_url,
        }
    }
}

impl From<NotificationDoc> for Notification {
    fn from(doc: NotificationDoc) -> Self {
        Self {
            created_at: parse_datetime(doc.created_at.as_deref()),
            id: doc.id,
            sender: doc.sender,
            receiver: doc.receiver,
            message: doc.message,
            media_url: doc.media_url.filter(|u| !u.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_api::backend::YearValue;

    #[test]
    fn activity_dates_accept_timestamps() {
        let activity: Activity = ActivityDoc {
            id: "a1".into(),
            name: "Sports Meet".into(),
            year: YearValue::Text("4".into()),
            start_date: "2025-01-20T00:00:00.000Z".into(),
            end_date: "garbage".into(),
            description: String::new(),
        }
        .into();

        assert_eq!(activity.year, Some(AcademicYear::Fourth));
        assert_eq!(activity.start_date, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(activity.end_date, None);
    }

    #[test]
    fn out_of_range_year_is_none() {
        let activity: Activity = ActivityDoc {
            id: "a2".into(),
            name: "Alumni Day".into(),
            year: YearValue::Number(7),
            start_date: "2025-02-01".into(),
            end_date: "2025-02-01".into(),
            description: "Reunion".into(),
        }
        .into();
        assert_eq!(activity.year, None);
    }
}
