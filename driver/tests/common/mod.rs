//! Common Test Utilities for Integration Tests
//!
//! A mock attendance API served by axum on an ephemeral port. Every request is
//! recorded so tests can assert on order, headers and bodies.

use attendance_load::Config;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
    routing::{patch, post},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

/// Scripted responses
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub login_status: StatusCode,
    pub login_body: String,
    pub check_in: StatusCode,
    pub check_out: StatusCode,
    pub overtime: StatusCode,
    pub reimbursement: StatusCode,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            login_status: StatusCode::OK,
            login_body: r#"{"token":"abc123"}"#.to_string(),
            check_in: StatusCode::OK,
            check_out: StatusCode::OK,
            overtime: StatusCode::OK,
            reimbursement: StatusCode::OK,
        }
    }
}

#[derive(Clone)]
pub struct MockApiState {
    behavior: Arc<MockBehavior>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApiState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        let body = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);

        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body,
        });
    }
}

async fn login(
    State(state): State<MockApiState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, &body);
    (
        state.behavior.login_status,
        [(header::CONTENT_TYPE, "application/json")],
        state.behavior.login_body.clone(),
    )
}

async fn scenario_call(
    State(state): State<MockApiState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    state.record(method, &uri, &headers, &body);
    let behavior = &state.behavior;
    match uri.path() {
        "/api/attendance/checkin" => behavior.check_in,
        "/api/attendance/checkout" => behavior.check_out,
        "/api/attendance/overtime" => behavior.overtime,
        "/api/reimbursement/submit" => behavior.reimbursement,
        _ => StatusCode::NOT_FOUND,
    }
}

/// Create the mock attendance API router
pub fn create_mock_api(behavior: MockBehavior) -> (Router, MockApiState) {
    let state = MockApiState {
        behavior: Arc::new(behavior),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/login", post(login))
        .route("/api/attendance/checkin", post(scenario_call))
        .route("/api/attendance/checkout", patch(scenario_call))
        .route("/api/attendance/overtime", post(scenario_call))
        .route("/api/reimbursement/submit", post(scenario_call))
        .with_state(state.clone());

    (app, state)
}

/// Serve the mock API on an ephemeral port and return its base URL
pub async fn spawn_mock_api(behavior: MockBehavior) -> (String, MockApiState) {
    let (app, state) = create_mock_api(behavior);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

/// Fast config pointed at `base_url`: no pauses, fixed iteration count
pub fn test_config(base_url: &str, vus: usize, iterations: u64) -> Config {
    let mut config = Config::default();
    config.base_url = base_url.to_string();
    config.run.vus = vus;
    config.run.iterations = Some(iterations);
    config.run.duration = Duration::from_secs(30);
    config.run.graceful_stop = Duration::from_secs(5);
    config.run.pause = Duration::ZERO;
    config.run.request_timeout = Duration::from_secs(5);
    config
}

/// Initialize test logging for detailed output
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_load=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
