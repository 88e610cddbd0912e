use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use crate::web::api::ErrorResponse;

/// Extracts a request body sent either as JSON or as an urlencoded HTML form.
///
/// The `Content-Type` header picks the decoder; anything that is not JSON is
/// handed to [`Form`], which rejects unsupported media types itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

impl<T: Default> JsonOrForm<T> {
    /// Unwraps an extracted body, substituting an empty payload when the body
    /// could not be decoded so that domain validation reports what is missing.
    pub fn or_default(extracted: Result<Self, BodyRejection>) -> T {
        match extracted {
            Ok(JsonOrForm(payload)) => payload,
            Err(rejection) => {
                tracing::debug!("Ignoring undecodable body: {}", rejection);
                T::default()
            }
        }
    }
}

/// A body that could not be decoded, reported as a 400 `{error}` JSON object.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BodyRejection(String);

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = BodyRejection;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(payload) = Json::<T>::from_request(request, state)
                .await
                .map_err(|rejection| BodyRejection(rejection.body_text()))?;
            Ok(Self(payload))
        } else {
            let Form(payload) = Form::<T>::from_request(request, state)
                .await
                .map_err(|rejection| BodyRejection(rejection.body_text()))?;
            Ok(Self(payload))
        }
    }
}
