use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use super::exercise::{Exercise, parse_date, parse_integer_prefix};
use super::{UserStoreError, UserSummary};

/// Raw query parameters accepted by the log endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Earliest date to include (`YYYY-MM-DD`, inclusive)
    #[serde(default)]
    pub from: Option<String>,
    /// Latest date to include (`YYYY-MM-DD`, inclusive)
    #[serde(default)]
    pub to: Option<String>,
    /// Maximum number of entries to return
    #[serde(default)]
    pub limit: Option<String>,
}

/// Parsed and validated log filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl TryFrom<LogQuery> for LogFilter {
    type Error = UserStoreError;

    fn try_from(query: LogQuery) -> Result<Self, Self::Error> {
        let from = non_empty(query.from).map(|raw| parse_date(&raw)).transpose()?;
        let to = non_empty(query.to).map(|raw| parse_date(&raw)).transpose()?;
        let limit = non_empty(query.limit)
            .map(|raw| {
                parse_integer_prefix(&raw)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or(UserStoreError::InvalidLimit(raw))
            })
            .transpose()?;

        Ok(Self { from, to, limit })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl LogFilter {
    /// Returns true when `exercise` falls inside the date bounds.
    fn includes(&self, exercise: &Exercise) -> bool {
        let date = exercise.date();
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Applies the date bounds, then the limit, keeping insertion order.
    pub fn apply<'a>(&self, exercises: &'a [Exercise]) -> Vec<&'a Exercise> {
        exercises
            .iter()
            .filter(|exercise| self.includes(exercise))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// The filtered view of a user's exercises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseLog {
    pub user: UserSummary,
    pub entries: Vec<Exercise>,
}

impl ExerciseLog {
    /// Number of entries after filtering and limiting.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
