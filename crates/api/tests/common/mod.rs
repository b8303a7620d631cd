#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use reetr_api::auth::jwt::JwtConfig;
use reetr_api::config::ServerConfig;
use reetr_api::router::build_app_router;
use reetr_api::state::AppState;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Nothing listens here; backend calls fail with a transport error.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

/// Build a test `ServerConfig` pointing at `backend_api_url`.
pub fn test_config(backend_api_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        backend_api_url: backend_api_url.to_string(),
        admin_claim_namespace: "https://yourapp.com".to_string(),
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            audience: None,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with an unreachable backend.
pub fn build_test_app() -> Router {
    build_test_app_with_backend(UNREACHABLE_BACKEND)
}

pub fn build_test_app_with_backend(backend_api_url: &str) -> Router {
    build_app_router(AppState::new(test_config(backend_api_url)))
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn token(mut claims: Value) -> String {
    if claims.get("exp").is_none() {
        claims["exp"] = json!(chrono::Utc::now().timestamp() + 600);
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encoding should succeed")
}

pub fn admin_token() -> String {
    token(json!({"sub": "auth0|admin", "https://yourapp.com/admin": true}))
}

pub fn other_admin_token() -> String {
    token(json!({"sub": "auth0|other", "app_metadata": {"roles": ["admin"]}}))
}

pub fn user_token() -> String {
    token(json!({"sub": "auth0|user", "role": "member"}))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Open a draft holding `assessment` and return its id.
pub async fn open_draft(app: &Router, token: &str, assessment: Value) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/drafts",
        token,
        json!({ "assessment": assessment }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A two-stage assessment that passes validation.
pub fn valid_assessment() -> Value {
    json!({
        "title": "Discovery Assessment",
        "description": "Understand where you are today",
        "estimatedTime": 15,
        "stages": [
            {
                "id": 1,
                "title": "Family Context",
                "questions": [{
                    "id": 1,
                    "questionText": "Do you have any children?",
                    "inputType": "radio",
                    "options": ["Yes", "No"],
                    "required": true
                }]
            },
            {
                "id": 2,
                "title": "Parenting",
                "questions": [{
                    "id": 1,
                    "questionText": "How old are they?",
                    "inputType": "text",
                    "required": false
                }]
            }
        ],
        "assessmentCTA": {
            "buttonText": "Meet Your Coach",
            "webRoute": "/coach",
            "nativeRoute": "/(tabs)/coach"
        }
    })
}

// ---------------------------------------------------------------------------
// Mock content backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: String,
    pub path: String,
    pub auth: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    requests: Arc<Mutex<Vec<BackendRequest>>>,
    failing: bool,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn mock_handler(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.requests.lock().unwrap().push(BackendRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        auth: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    if mock.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }

    let with_id = |mut value: Value, id: i64| {
        value["id"] = json!(id);
        value
    };

    match (method.as_str(), uri.path()) {
        ("GET", "/v1/assessments/") => {
            Json(json!({"data": [with_id(valid_assessment(), 7)]})).into_response()
        }
        ("GET", "/v1/assessments/7") => Json(with_id(valid_assessment(), 7)).into_response(),
        ("POST", "/v1/assessments/") => {
            (StatusCode::CREATED, Json(with_id(body, 100))).into_response()
        }
        ("PATCH", "/v1/assessments/7") => Json(with_id(body, 7)).into_response(),
        ("DELETE", "/v1/assessments/7") => StatusCode::NO_CONTENT.into_response(),
        ("GET", "/v1/life-hacks/") => Json(json!([
            {"id": 1, "type": "Walk", "category": "fitness"},
            {"id": 2, "type": "Pray", "category": "faith"},
            {"id": 3, "type": "Stretch", "category": "fitness"},
            {"id": 4, "type": "Legacy"}
        ]))
        .into_response(),
        ("POST", "/v1/life-hacks/") => {
            (StatusCode::CREATED, Json(with_id(body, 50))).into_response()
        }
        ("PATCH", "/v1/life-hacks/2") => Json(with_id(body, 2)).into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

async fn spawn(mock: MockBackend) -> (String, MockBackend) {
    let app = Router::new()
        .fallback(mock_handler)
        .with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), mock)
}

/// Start a mock backend on an ephemeral port; returns its base URL.
pub async fn spawn_backend() -> (String, MockBackend) {
    spawn(MockBackend::default()).await
}

/// Start a mock backend that answers every request with 500.
pub async fn spawn_failing_backend() -> (String, MockBackend) {
    spawn(MockBackend {
        failing: true,
        ..MockBackend::default()
    })
    .await
}
