use crate::user::api::UserState;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every rejected API request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable reason, e.g. `User not found`
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(user_state: UserState) -> Router {
    let users_router = crate::user::api::create_api_router(user_state);
    Router::new().nest("/api", users_router)
}
