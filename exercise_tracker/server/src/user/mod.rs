use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub mod api;
pub mod exercise;
pub mod log;

pub use exercise::{DurationInput, Exercise, ExerciseForm};
pub use log::{ExerciseLog, LogFilter, LogQuery};

/// Opaque identifier handed to clients as `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named account owning a sequence of exercises.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct User {
    id: UserId,
    username: String,
    exercises: Vec<Exercise>,
}

impl User {
    pub fn new(id: UserId, username: String) -> Self {
        Self {
            id,
            username,
            exercises: Vec::new(),
        }
    }

    /// Returns the ID of the user.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the exercises in submission order.
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

/// The `{ id, username }` view of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// A freshly appended exercise together with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedExercise {
    pub user: UserSummary,
    pub exercise: Exercise,
}

/// Error type for UserStore operations. The message is shown to clients as-is.
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Username is required")]
    UsernameRequired,
    #[error("Description and duration are required")]
    MissingExerciseFields,
    #[error("Duration must be a whole number of minutes, got '{0}'")]
    InvalidDuration(String),
    #[error("Invalid date '{0}'")]
    InvalidDate(String),
    #[error("Invalid limit '{0}'")]
    InvalidLimit(String),
    #[error("User not found")]
    UserNotFound(UserId),
}

#[derive(Debug, Default)]
struct Users {
    // Creation order; `index` maps an id to its position here.
    entries: Vec<User>,
    index: HashMap<UserId, usize>,
}

impl Users {
    fn get(&self, id: &UserId) -> Option<&User> {
        let position = *self.index.get(id)?;
        self.entries.get(position)
    }

    fn get_mut(&mut self, id: &UserId) -> Option<&mut User> {
        let position = *self.index.get(id)?;
        self.entries.get_mut(position)
    }
}

/// In-memory registry of users and their exercises.
///
/// Created empty and shared by every request handler for the lifetime of the
/// process. Each operation takes the lock once, so it either applies fully or
/// not at all.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Users>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user with no exercises.
    ///
    /// # Arguments
    ///
    /// * `username` - The name of the new user; must not be empty.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new user's `UserSummary`, or `UsernameRequired`.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, username: &str) -> Result<UserSummary, UserStoreError> {
        if username.is_empty() {
            return Err(UserStoreError::UsernameRequired);
        }

        let mut users = self.users.write().await;
        let mut id = UserId::generate();
        while users.index.contains_key(&id) {
            id = UserId::generate();
        }

        let user = User::new(id.clone(), username.to_string());
        let summary = user.summary();
        let position = users.entries.len();
        users.index.insert(id, position);
        users.entries.push(user);

        tracing::info!("Created user {} with ID {}", summary.username, summary.id);
        Ok(summary)
    }

    /// Lists every user in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Vec<UserSummary> {
        let users = self.users.read().await;
        users.entries.iter().map(User::summary).collect()
    }

    #[cfg(test)]
    async fn get_user(&self, id: &UserId) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .get(id)
            .cloned()
            .ok_or_else(|| UserStoreError::UserNotFound(id.clone()))
    }

    /// Appends an exercise dated today (UTC) unless the form carries a date.
    ///
    /// See [`UserStore::add_exercise_on`].
    pub async fn add_exercise(
        &self,
        id: &UserId,
        form: ExerciseForm,
    ) -> Result<LoggedExercise, UserStoreError> {
        self.add_exercise_on(id, form, Utc::now().date_naive()).await
    }

    /// Validates and appends an exercise to a user's log.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the owning user.
    /// * `form` - The submitted exercise fields.
    /// * `today` - The date recorded when the form has none.
    ///
    /// # Returns
    ///
    /// A `Result` containing the owner and the appended exercise. An unknown
    /// user is reported before any field validation.
    #[tracing::instrument(skip(self))]
    pub async fn add_exercise_on(
        &self,
        id: &UserId,
        form: ExerciseForm,
        today: NaiveDate,
    ) -> Result<LoggedExercise, UserStoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            tracing::warn!("Cannot add exercise: user {} not found", id);
            return Err(UserStoreError::UserNotFound(id.clone()));
        };

        let exercise = Exercise::from_form(form, today)?;
        user.exercises.push(exercise.clone());

        tracing::info!(
            "Logged {} minutes of '{}' for user {}",
            exercise.duration(),
            exercise.description(),
            id
        );
        Ok(LoggedExercise {
            user: user.summary(),
            exercise,
        })
    }

    /// Retrieves a user's exercises, filtered by date and limited in count.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the user.
    /// * `query` - Optional inclusive date bounds and entry limit.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ExerciseLog`. An unknown user is reported
    /// before a malformed query.
    #[tracing::instrument(skip(self))]
    pub async fn get_log(
        &self,
        id: &UserId,
        query: LogQuery,
    ) -> Result<ExerciseLog, UserStoreError> {
        let users = self.users.read().await;
        let user = users.get(id).ok_or_else(|| {
            tracing::warn!("Cannot read log: user {} not found", id);
            UserStoreError::UserNotFound(id.clone())
        })?;
        let filter = LogFilter::try_from(query)?;

        Ok(ExerciseLog {
            user: user.summary(),
            entries: filter.apply(user.exercises()).into_iter().cloned().collect(),
        })
    }
}
