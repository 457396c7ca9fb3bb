//! Common test utilities for integration tests.
//!
//! Spins up a mock Eventownik backend on an ephemeral port and builds
//! the panel app against it; tests drive the panel router directly with
//! `tower::ServiceExt::oneshot`.

// Allow dead code in this module - these are helper utilities that may not be
// used by all integration tests but are intentionally available.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use backend::BackendClient;
use eventownik_panel_api::app::create_app;
use eventownik_panel_api::config::Config;
use eventownik_panel_api::sessions::SessionStore;
use shared::crypto::sha256_hex;

/// Panel key accepted by the test configuration.
pub const TEST_API_KEY: &str = "ep_testkey12345";

/// Event id used throughout the tests.
pub const EVENT_ID: i64 = 1;

// ============================================================================
// Mock backend
// ============================================================================

/// In-memory stand-in for the Eventownik backend API.
#[derive(Clone, Default)]
pub struct MockBackend {
    pub attributes: Arc<Mutex<Vec<Value>>>,
    pub participants: Arc<Mutex<Vec<Value>>>,
    pub blocks: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    /// When set, delete endpoints answer 500.
    pub fail_deletes: Arc<AtomicBool>,
    /// Artificial latency for delete endpoints, to hold a mutation
    /// in flight while the test pokes at the row.
    pub delete_delay_ms: Arc<AtomicU64>,
    /// How many times the participant list was fetched.
    pub participant_fetches: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.next_id.store(1, Ordering::SeqCst);
        mock
    }

    pub fn seed_attribute(
        &self,
        id: i64,
        slug: &str,
        attribute_type: &str,
        options: Option<Vec<&str>>,
        show_in_list: bool,
    ) {
        let mut attribute = json!({
            "id": id,
            "slug": slug,
            "name": slug,
            "type": attribute_type,
            "showInList": show_in_list,
        });
        if let Some(options) = options {
            attribute["options"] = json!(options);
        }
        self.attributes.lock().unwrap().push(attribute);
    }

    /// Seed a participant; a random email is faked when none is given.
    /// Returns the participant id.
    pub fn seed_participant(&self, email: Option<&str>, values: &[(i64, Value)]) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let email = email
            .map(String::from)
            .unwrap_or_else(|| SafeEmail().fake());
        let attributes: Vec<Value> = values
            .iter()
            .map(|(attribute_id, value)| {
                json!({"attributeId": attribute_id, "value": value})
            })
            .collect();
        let now = Utc::now().to_rfc3339();
        self.participants.lock().unwrap().push(json!({
            "id": id,
            "slug": format!("participant-{}", id),
            "email": email,
            "attributes": attributes,
            "createdAt": now,
            "updatedAt": now,
        }));
        id
    }

    pub fn seed_block(&self, id: i64, name: &str, capacity: Option<u32>) {
        let mut block = json!({"id": id, "name": name});
        if let Some(capacity) = capacity {
            block["capacity"] = json!(capacity);
        }
        self.blocks.lock().unwrap().push(block);
    }

    pub fn participant_count(&self) -> usize {
        self.participants.lock().unwrap().len()
    }
}

async fn list_attributes(State(mock): State<MockBackend>) -> Json<Value> {
    Json(Value::Array(mock.attributes.lock().unwrap().clone()))
}

async fn list_blocks(State(mock): State<MockBackend>) -> Json<Value> {
    Json(Value::Array(mock.blocks.lock().unwrap().clone()))
}

async fn list_participants(State(mock): State<MockBackend>) -> Json<Value> {
    mock.participant_fetches.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(mock.participants.lock().unwrap().clone()))
}

async fn create_participant(
    State(mock): State<MockBackend>,
    Json(body): Json<Value>,
) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let values: Vec<(i64, Value)> = body["values"]
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.parse().unwrap(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    let id = mock.seed_participant(Some(&email), &values);
    let participant = mock
        .participants
        .lock()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .cloned()
        .unwrap();
    (StatusCode::CREATED, Json(participant)).into_response()
}

async fn update_participant(
    State(mock): State<MockBackend>,
    Path((_event, id)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> Response {
    let mut participants = mock.participants.lock().unwrap();
    let Some(participant) = participants.iter_mut().find(|p| p["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(email) = body["email"].as_str() {
        participant["email"] = json!(email);
    }
    if let Some(values) = body["values"].as_object() {
        let attributes = participant["attributes"].as_array_mut().unwrap();
        for (key, value) in values {
            let attribute_id: i64 = key.parse().unwrap();
            match attributes
                .iter_mut()
                .find(|a| a["attributeId"] == attribute_id)
            {
                Some(pair) => pair["value"] = value.clone(),
                None => attributes.push(json!({
                    "attributeId": attribute_id,
                    "value": value,
                })),
            }
        }
    }
    participant["updatedAt"] = json!(Utc::now().to_rfc3339());
    Json(participant.clone()).into_response()
}

async fn delete_participant(
    State(mock): State<MockBackend>,
    Path((_event, id)): Path<(i64, i64)>,
) -> Response {
    let delay = mock.delete_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if mock.fail_deletes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    mock.participants.lock().unwrap().retain(|p| p["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_many_participants(
    State(mock): State<MockBackend>,
    Json(body): Json<Value>,
) -> Response {
    if mock.fail_deletes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let ids: Vec<i64> = body["participantIds"]
        .as_array()
        .map(|ids| ids.iter().filter_map(|v| v.as_i64()).collect())
        .unwrap_or_default();
    mock.participants
        .lock()
        .unwrap()
        .retain(|p| !ids.contains(&p["id"].as_i64().unwrap()));
    StatusCode::NO_CONTENT.into_response()
}

async fn participant_blocks(State(mock): State<MockBackend>) -> Json<Value> {
    Json(Value::Array(mock.blocks.lock().unwrap().clone()))
}

fn mock_router(mock: MockBackend) -> Router {
    Router::new()
        .route("/events/:event_id/attributes", get(list_attributes))
        .route("/events/:event_id/blocks", get(list_blocks))
        .route(
            "/events/:event_id/participants",
            get(list_participants)
                .post(create_participant)
                .delete(delete_many_participants),
        )
        .route(
            "/events/:event_id/participants/:participant_id",
            axum::routing::patch(update_participant).delete(delete_participant),
        )
        .route(
            "/events/:event_id/participants/:participant_id/blocks",
            get(participant_blocks),
        )
        .with_state(mock)
}

/// Serve the mock backend on an ephemeral port; returns its base URL.
pub async fn spawn_mock_backend(mock: MockBackend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().unwrap();
    let app = mock_router(mock);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend died");
    });
    format!("http://{}", addr)
}

// ============================================================================
// Panel app
// ============================================================================

/// Test configuration pointed at the given backend URL.
pub fn test_config(backend_url: &str) -> Config {
    let mut config = Config::load_for_test(&[("backend.base_url", backend_url)])
        .expect("Failed to load test config");
    config.security.api_key_hashes = vec![sha256_hex(TEST_API_KEY)];
    config
}

/// Build the panel app against the given configuration.
pub fn create_test_app(config: Config) -> Router {
    let client = BackendClient::new(
        config.backend.base_url.clone(),
        None,
        config.backend.timeout(),
    )
    .expect("Failed to build backend client");
    let sessions = Arc::new(SessionStore::new(config.limits.default_page_size));
    create_app(config, client, sessions)
}

/// Mock backend + panel app in one call, for the common case.
pub async fn spawn_test_stack(mock: MockBackend) -> Router {
    let backend_url = spawn_mock_backend(mock).await;
    create_test_app(test_config(&backend_url))
}

// ============================================================================
// Requests
// ============================================================================

pub fn fresh_session() -> Uuid {
    Uuid::new_v4()
}

/// GET request with panel key and session headers.
pub fn get_request(path: &str, session: &Uuid) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header("X-API-Key", TEST_API_KEY)
        .header("X-Panel-Session", session.to_string())
        .body(Body::empty())
        .unwrap()
}

/// JSON request with panel key and session headers.
pub fn json_request(method: Method, path: &str, body: Value, session: &Uuid) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("X-API-Key", TEST_API_KEY)
        .header("X-Panel-Session", session.to_string())
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request without any panel headers, for auth tests.
pub fn anonymous_request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
pub async fn parse_response_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}

/// Fetch the table view for the default event.
pub async fn fetch_table(app: &Router, session: &Uuid) -> Value {
    use tower::ServiceExt;
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/events/{}/table", EVENT_ID),
            session,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}
