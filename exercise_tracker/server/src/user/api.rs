use crate::user::{
    Exercise, ExerciseForm, ExerciseLog, LogQuery, LoggedExercise, UserId, UserStore,
    UserStoreError, UserSummary,
};
use crate::web::api::ErrorResponse;
use crate::web::extract::{BodyRejection, JsonOrForm};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the user API handlers.
#[derive(Clone, Debug)]
pub struct UserState {
    pub store: Arc<UserStore>,
}

impl UserState {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

/// Request payload for creating a user.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Name of the new user
    #[serde(default)]
    username: Option<String>,
}

/// JSON representation of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserJson {
    /// Unique identifier of the user
    #[serde(rename = "_id")]
    id: String,
    /// Name of the user
    username: String,
}

impl From<UserSummary> for UserJson {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
        }
    }
}

/// Response for a freshly logged exercise.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExerciseJson {
    /// Name of the owning user
    username: String,
    /// Unique identifier of the owning user
    #[serde(rename = "_id")]
    id: String,
    description: String,
    /// Duration in minutes
    duration: i64,
    /// Date of the exercise, e.g. `Mon Jan 01 2024`
    date: String,
}

impl From<LoggedExercise> for ExerciseJson {
    fn from(logged: LoggedExercise) -> Self {
        Self {
            username: logged.user.username,
            id: logged.user.id.to_string(),
            description: logged.exercise.description().to_string(),
            duration: logged.exercise.duration(),
            date: logged.exercise.display_date(),
        }
    }
}

/// One entry of an exercise log.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogEntryJson {
    description: String,
    /// Duration in minutes
    duration: i64,
    /// Date of the exercise, e.g. `Mon Jan 01 2024`
    date: String,
}

impl From<Exercise> for LogEntryJson {
    fn from(exercise: Exercise) -> Self {
        Self {
            date: exercise.display_date(),
            duration: exercise.duration(),
            description: exercise.description().to_string(),
        }
    }
}

/// A user's filtered exercise log.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogJson {
    /// Unique identifier of the user
    #[serde(rename = "_id")]
    id: String,
    username: String,
    /// Number of entries in `log`
    count: usize,
    log: Vec<LogEntryJson>,
}

impl From<ExerciseLog> for LogJson {
    fn from(log: ExerciseLog) -> Self {
        let count = log.count();
        Self {
            id: log.user.id.to_string(),
            username: log.user.username,
            count,
            log: log.entries.into_iter().map(LogEntryJson::from).collect(),
        }
    }
}

impl IntoResponse for UserStoreError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            UserStoreError::UserNotFound(id) => {
                tracing::warn!("Request for unknown user ID {}", id);
                StatusCode::NOT_FOUND
            }
            _ => {
                tracing::warn!("Rejected request: {}", self);
                StatusCode::BAD_REQUEST
            }
        };

        (status_code, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Handler for POST /api/users - Creates a user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/users",
    request_body(
        content = CreateUserRequest,
        content_type = "application/json",
        description = "Also accepted as application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "User created", body = UserJson),
        (status = 400, description = "Username missing", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn create_user_handler(
    State(state): State<UserState>,
    body: Result<JsonOrForm<CreateUserRequest>, BodyRejection>,
) -> Result<Json<UserJson>, UserStoreError> {
    let username = JsonOrForm::or_default(body).username.unwrap_or_default();
    let user = state.store.create_user(&username).await?;
    Ok(Json(UserJson::from(user)))
}

/// Handler for GET /api/users - Lists all users in creation order.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserJson>)
    ),
    tag = "Users"
)]
pub async fn list_users_handler(State(state): State<UserState>) -> Json<Vec<UserJson>> {
    let users = state.store.list_users().await;
    Json(users.into_iter().map(UserJson::from).collect())
}

/// Handler for POST /api/users/{_id}/exercises - Logs an exercise for a user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/users/{_id}/exercises",
    params(
        ("_id" = String, Path, description = "ID of the user")
    ),
    request_body(
        content = ExerciseForm,
        content_type = "application/json",
        description = "Also accepted as application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Exercise logged", body = ExerciseJson),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Exercises"
)]
pub async fn add_exercise_handler(
    State(state): State<UserState>,
    Path(id): Path<String>,
    body: Result<JsonOrForm<ExerciseForm>, BodyRejection>,
) -> Result<Json<ExerciseJson>, UserStoreError> {
    // An undecodable body still has to yield 404 for an unknown user.
    let form = JsonOrForm::or_default(body);
    let logged = state.store.add_exercise(&UserId::from(id), form).await?;
    Ok(Json(ExerciseJson::from(logged)))
}

/// Handler for GET /api/users/{_id}/logs - Returns a user's exercise log.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/users/{_id}/logs",
    params(
        ("_id" = String, Path, description = "ID of the user"),
        LogQuery
    ),
    responses(
        (status = 200, description = "Filtered exercise log", body = LogJson),
        (status = 400, description = "Invalid date or limit", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Exercises"
)]
pub async fn get_log_handler(
    State(state): State<UserState>,
    Path(id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogJson>, UserStoreError> {
    let log = state.store.get_log(&UserId::from(id), query).await?;
    Ok(Json(LogJson::from(log)))
}

/// Creates and returns the users API router.
pub fn create_api_router(state: UserState) -> Router {
    Router::new()
        .route("/users", post(create_user_handler).get(list_users_handler))
        .route("/users/{_id}/exercises", post(add_exercise_handler))
        .route("/users/{_id}/logs", get(get_log_handler))
        .with_state(state)
}
