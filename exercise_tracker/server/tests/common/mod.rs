#![allow(dead_code)] // each test binary uses a different subset of helpers

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use exercise_tracker_server::user::UserStore;
use exercise_tracker_server::user::api::UserState;
use exercise_tracker_server::web::api::create_api_router;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

/// HTTP response snapshot for testing JSON endpoints.
#[derive(Debug, Serialize)]
pub struct HttpResponseSnapshot {
    pub test_context: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

impl HttpResponseSnapshot {
    /// Create a new HTTP response snapshot.
    pub fn new(response: &TestResponse, test_context: &str) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: response.status.as_u16(),
            headers: filter_variable_headers(&response.headers),
            body: response.json(),
        }
    }
}

/// Filter out variable headers from response headers for snapshot testing.
fn filter_variable_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let variable_headers = [
        "date",
        "expires",
        "last-modified",
        "etag",
        "server",
        "x-request-id",
        "x-trace-id",
        "content-length",
        "vary",
    ];

    headers
        .iter()
        .filter_map(|(name, value)| {
            let name_str = name.as_str().to_lowercase();
            if variable_headers.contains(&name_str.as_str()) {
                None
            } else {
                value.to_str().ok().map(|v| (name_str, v.to_string()))
            }
        })
        .collect()
}

/// A fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or_else(|err| {
            panic!("Response body is not JSON ({}): {}", err, self.body)
        })
    }
}

/// Test context holding the router and the store behind it.
pub struct TestContext {
    pub store: Arc<UserStore>,
    pub app: Router,
}

/// Setup function for API tests: a fresh, empty store per test.
pub fn setup() -> TestContext {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
    let store = Arc::new(UserStore::new());
    let app = create_api_router(UserState::new(store.clone()));
    TestContext { store, app }
}

impl TestContext {
    /// Sends a request through the router and buffers the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Posts `body` as-is, with a `Content-Type` header only when one is given.
    pub async fn post_raw(
        &self,
        uri: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Creates a user through the API and returns its `_id`.
    pub async fn create_user(&self, username: &str) -> String {
        let response = self
            .post_json("/api/users", serde_json::json!({ "username": username }))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["_id"].as_str().unwrap().to_string()
    }

    /// Logs an exercise through the API and returns the response body.
    pub async fn add_exercise(
        &self,
        user_id: &str,
        description: &str,
        duration: u32,
        date: &str,
    ) -> serde_json::Value {
        let response = self
            .post_json(
                &format!("/api/users/{}/exercises", user_id),
                serde_json::json!({
                    "description": description,
                    "duration": duration,
                    "date": date,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()
    }
}
