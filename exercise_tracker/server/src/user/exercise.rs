use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use super::UserStoreError;

/// Format used when rendering exercise dates to clients, e.g. `Mon Jan 01 2024`.
const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y";

/// A single logged activity. Exercises are owned by exactly one user and are never mutated.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Exercise {
    description: String,
    duration: i64,
    date: NaiveDate,
}

impl Exercise {
    pub fn new(description: String, duration: i64, date: NaiveDate) -> Self {
        Self {
            description,
            duration,
            date,
        }
    }

    /// Validates raw submitted fields and builds an exercise, using `today` when no date is given.
    ///
    /// # Arguments
    ///
    /// * `form` - The fields as submitted by the client.
    /// * `today` - The date recorded when the client omits one.
    ///
    /// # Returns
    ///
    /// The built `Exercise`, or a validation error describing the first bad field.
    pub fn from_form(form: ExerciseForm, today: NaiveDate) -> Result<Self, UserStoreError> {
        let description = form.description.filter(|d| !d.is_empty());
        let duration = form.duration.filter(DurationInput::is_present);
        let (Some(description), Some(duration)) = (description, duration) else {
            return Err(UserStoreError::MissingExerciseFields);
        };

        let duration = duration.to_minutes()?;
        let date = match form.date.as_deref() {
            Some(raw) if !raw.is_empty() => parse_date(raw)?,
            _ => today,
        };

        Ok(Self::new(description, duration, date))
    }

    /// Returns the description of the exercise.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the duration in minutes.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Returns the calendar date of the exercise.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the date as shown to clients.
    pub fn display_date(&self) -> String {
        display_date(self.date)
    }
}

/// Renders a date the way every API response shows it.
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Fields submitted when logging an exercise. Every field is optional so that
/// missing values surface as domain validation errors rather than decode failures.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExerciseForm {
    /// What was done
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes spent, as a number or numeric string
    #[serde(default)]
    pub duration: Option<DurationInput>,
    /// Day of the exercise as `YYYY-MM-DD`; defaults to today (UTC)
    #[serde(default)]
    pub date: Option<String>,
}

/// A duration as it arrives on the wire: a JSON number, or text from a form field.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DurationInput {
    Number(f64),
    Text(String),
}

impl DurationInput {
    /// Zero and empty text count as not supplied.
    fn is_present(&self) -> bool {
        match self {
            DurationInput::Number(n) => *n != 0.0 && !n.is_nan(),
            DurationInput::Text(s) => !s.is_empty(),
        }
    }

    /// Coerces the input to whole minutes, truncating any fractional part.
    pub fn to_minutes(&self) -> Result<i64, UserStoreError> {
        let minutes = match self {
            DurationInput::Number(n) if n.is_finite() && *n < i64::MAX as f64 => {
                Some(n.trunc() as i64)
            }
            DurationInput::Number(_) => None,
            DurationInput::Text(s) => parse_integer_prefix(s),
        };

        match minutes {
            Some(m) if m >= 0 => Ok(m),
            _ => Err(UserStoreError::InvalidDuration(self.to_string())),
        }
    }
}

impl std::fmt::Display for DurationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationInput::Number(n) => write!(f, "{}", n),
            DurationInput::Text(s) => f.write_str(s),
        }
    }
}

/// Reads the leading base-10 integer of `raw`, ignoring leading whitespace and
/// anything after the digits. `" 45min"` yields 45, `"abc"` yields nothing.
pub(crate) fn parse_integer_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Parses a calendar date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, UserStoreError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| UserStoreError::InvalidDate(raw.to_string()))
}
