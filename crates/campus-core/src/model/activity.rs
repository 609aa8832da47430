// ── Academic activities ──

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Year of study, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AcademicYear {
    First,
    Second,
    Third,
    Fourth,
}

impl AcademicYear {
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
        }
    }

    /// Ordinal label: "1st" .. "4th".
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
            Self::Fourth => "4th",
        }
    }
}

impl From<AcademicYear> for u8 {
    fn from(year: AcademicYear) -> Self {
        year.number()
    }
}

impl TryFrom<u8> for AcademicYear {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            other => Err(CoreError::validation(format!(
                "year must be between 1 and 4, got {other}"
            ))),
        }
    }
}

impl FromStr for AcademicYear {
    type Err = CoreError;

    /// Accepts `3`, `3rd`, or `third`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(year) = Self::ALL
            .into_iter()
            .find(|y| y.label() == s || format!("{y:?}").to_ascii_lowercase() == s)
        {
            return Ok(year);
        }
        s.parse::<u8>()
            .map_err(|_| CoreError::validation(format!("invalid year '{s}'")))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    /// `None` when the stored year is outside 1-4 or unparseable.
    pub year: Option<AcademicYear>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

impl Activity {
    /// Case-insensitive match on name or description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Filter for listing activities.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub search: Option<String>,
    pub year: Option<AcademicYear>,
}

impl ActivityQuery {
    pub fn accepts(&self, activity: &Activity) -> bool {
        let year_ok = self.year.is_none_or(|y| activity.year == Some(y));
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|needle| activity.matches(needle));
        year_ok && search_ok
    }
}

/// Activities of one year, as listed by the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroup {
    /// `None` collects activities with an unrecognized year.
    pub year: Option<AcademicYear>,
    pub activities: Vec<Activity>,
}

/// A validated activity ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub name: String,
    pub year: AcademicYear,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
}

impl NewActivity {
    pub fn new(
        name: impl Into<String>,
        year: AcademicYear,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let activity = Self {
            name: name.into().trim().to_owned(),
            year,
            start_date,
            end_date,
            description: description.into().trim().to_owned(),
        };
        activity.validate()?;
        Ok(activity)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_empty() {
            return Err(CoreError::validation("activity name must not be empty"));
        }
        if self.description.is_empty() {
            return Err(CoreError::validation(
                "activity description must not be empty",
            ));
        }
        if self.end_date < self.start_date {
            return Err(CoreError::validation(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}
