//! In-process mock of the management API for integration and load testing.
//!
//! Serves the token endpoint plus users, clients, resource-servers and
//! client-grants under `/api/v2`, records every API request, and can inject
//! throttling or stage-specific failures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use auth0_reconcile::config::{GrantScanConfig, ProviderConfig, RetryConfig};
use auth0_reconcile::ManagementClient;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const DOMAIN: &str = "tenant.example.com";
pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const TOKEN: &str = "test-token";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub idempotency_key: Option<String>,
}

/// Periodic 429s followed by a grace period in which nothing is throttled.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    pub every: u64,
    pub grace: Duration,
}

#[derive(Default)]
pub struct MockState {
    collections: DashMap<String, DashMap<String, (u64, Value)>>,
    sequence: AtomicU64,
    requests: Mutex<Vec<Recorded>>,
    api_calls: AtomicU64,
    throttle: Mutex<Option<Throttle>>,
    grace_until: Mutex<Option<Instant>>,
    throttled: AtomicUsize,
    fail_patch_with_field: Mutex<Option<(String, u16)>>,
}

impl MockState {
    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn record(
        &self,
        method: Method,
        path: String,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let idempotency_key = headers
            .get("idempotency-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            query: query.clone(),
            body,
            idempotency_key,
        });
    }

    /// Returns a 429 response when this request should be throttled.
    fn gate(&self) -> Option<Response> {
        let n = self.api_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let throttle = (*self.throttle.lock().unwrap())?;

        let mut grace_until = self.grace_until.lock().unwrap();
        let now = Instant::now();
        if let Some(until) = *grace_until {
            if now < until {
                return None;
            }
        }
        if n % throttle.every == 0 {
            *grace_until = Some(now + throttle.grace);
            self.throttled.fetch_add(1, Ordering::SeqCst);
            return Some(error(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests", "Global limit has been reached"));
        }
        None
    }

    fn store(&self, collection: &str) -> Ref<'_, String, DashMap<String, (u64, Value)>> {
        if let Some(store) = self.collections.get(collection) {
            return store;
        }
        self.collections.entry(collection.to_string()).or_default().downgrade()
    }

    fn sorted(&self, collection: &str) -> Vec<Value> {
        let store = self.store(collection);
        let mut all: Vec<(u64, Value)> = store.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, v)| v).collect()
    }
}

/// Running mock server.
pub struct MockApi {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/oauth/token", post(token))
            .route("/api/v2/{collection}", get(list).post(create))
            .route("/api/v2/{collection}/{id}", get(read).patch(update).delete(remove))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Provider configuration pointing at this mock, with a short retry delay.
    pub fn config(&self) -> ProviderConfig {
        ProviderConfig {
            domain: DOMAIN.to_string(),
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            endpoint: Some(format!("http://{}", self.addr)),
            retries: RetryConfig {
                max_attempts: 3,
                delay_ms: 5,
                max_delay_ms: 5,
            },
            grants: GrantScanConfig {
                page_size: 50,
                max_pages: 20,
            },
            ..Default::default()
        }
    }

    pub async fn client(&self) -> ManagementClient {
        ManagementClient::connect(&self.config()).await.unwrap()
    }

    pub async fn client_with(&self, config: &ProviderConfig) -> ManagementClient {
        ManagementClient::connect(config).await.unwrap()
    }

    pub fn throttle(&self, every: u64, grace: Duration) {
        *self.state.throttle.lock().unwrap() = Some(Throttle { every, grace });
    }

    pub fn throttled(&self) -> usize {
        self.state.throttled.load(Ordering::SeqCst)
    }

    /// Reject any PATCH whose body carries `field` with `status`.
    pub fn fail_patch_with_field(&self, field: &str, status: u16) {
        *self.state.fail_patch_with_field.lock().unwrap() = Some((field.to_string(), status));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: Method) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.method == method).collect()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }

    /// Insert a record directly, bypassing the uniqueness checks of the API.
    pub fn seed(&self, collection: &str, record: Value) {
        let key = id_field(collection);
        let id = record[key].as_str().unwrap().to_string();
        let seq = self.state.next_seq();
        self.state.store(collection).insert(id, (seq, record));
    }

    pub fn stored(&self, collection: &str, id: &str) -> Option<Value> {
        self.state.store(collection).get(id).map(|e| e.value().1.clone())
    }
}

fn error(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"statusCode": status.as_u16(), "error": error, "message": message})),
    )
        .into_response()
}

fn id_field(collection: &str) -> &'static str {
    match collection {
        "users" => "user_id",
        "clients" => "client_id",
        _ => "id",
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, Response> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: body must be an object")),
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn token(Json(body): Json<Value>) -> Response {
    let valid = body["grant_type"] == "client_credentials"
        && body["client_id"] == CLIENT_ID
        && body["client_secret"] == CLIENT_SECRET
        && body["audience"] == format!("https://{}/api/v2/", DOMAIN).as_str();
    if !valid {
        return error(StatusCode::UNAUTHORIZED, "access_denied", "Unauthorized");
    }
    Json(json!({"access_token": TOKEN, "token_type": "Bearer", "expires_in": 86400})).into_response()
}

/// Shared prologue: record, authorize, throttle.
fn prologue(
    state: &MockState,
    method: Method,
    path: String,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
    body: Option<Value>,
) -> Option<Response> {
    state.record(method, path, query, headers, body);
    if !authorized(headers) {
        return Some(error(StatusCode::UNAUTHORIZED, "Unauthorized", "Missing or invalid bearer token"));
    }
    state.gate()
}

async fn list(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(early) = prologue(&state, Method::GET, format!("/{}", collection), &query, &headers, None) {
        return early;
    }

    let mut records: Vec<Value> = state
        .sorted(&collection)
        .into_iter()
        .filter(|r| query.get("client_id").map_or(true, |c| r["client_id"] == c.as_str()))
        .filter(|r| query.get("audience").map_or(true, |a| r["audience"] == a.as_str()))
        .collect();

    if let Some(per_page) = query.get("per_page").and_then(|p| p.parse::<usize>().ok()) {
        let page = query.get("page").and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        records = records.into_iter().skip(page * per_page).take(per_page).collect();
    }

    Json(Value::Array(records)).into_response()
}

async fn read(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/{}/{}", collection, id);
    if let Some(early) = prologue(&state, Method::GET, path, &HashMap::new(), &headers, None) {
        return early;
    }
    if collection == "client-grants" {
        return error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", "client grants cannot be read by id");
    }

    let found = state.store(&collection).get(&id).map(|e| e.value().1.clone());
    match found {
        Some(record) => Json(record).into_response(),
        None => error(StatusCode::NOT_FOUND, "Not Found", "The resource does not exist"),
    }
}

async fn create(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed = serde_json::from_slice::<Value>(&body).ok();
    if let Some(early) = prologue(&state, Method::POST, format!("/{}", collection), &HashMap::new(), &headers, parsed) {
        return early;
    }
    let mut fields = match parse_object(&body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let record = match collection.as_str() {
        "users" => {
            let Some(connection) = fields.remove("connection").and_then(|c| c.as_str().map(String::from)) else {
                return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: Missing required property: connection");
            };
            fields.remove("password");
            let raw_id = uuid::Uuid::new_v4().simple().to_string();
            let mut user = fields;
            user.insert("user_id".into(), json!(format!("auth0|{}", raw_id)));
            user.entry("email_verified").or_insert(json!(false));
            user.insert(
                "identities".into(),
                json!([{"connection": connection, "user_id": raw_id, "provider": "auth0", "isSocial": false}]),
            );
            Value::Object(user)
        }
        "clients" => {
            let mut client = fields;
            client.insert("client_id".into(), json!(new_id("")));
            client.insert("client_secret".into(), json!(new_id("secret_")));
            Value::Object(client)
        }
        "resource-servers" => {
            let Some(identifier) = fields.get("identifier").and_then(Value::as_str).map(String::from) else {
                return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: Missing required property: identifier");
            };
            if state.sorted("resource-servers").iter().any(|r| r["identifier"] == identifier.as_str()) {
                return error(StatusCode::CONFLICT, "Conflict", "A resource server with the same identifier already exists");
            }
            let mut api = fields;
            api.insert("id".into(), json!(new_id("")));
            Value::Object(api)
        }
        "client-grants" => {
            if !fields.get("scope").is_some_and(Value::is_array) {
                return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: scope must be an array");
            }
            let duplicate = state
                .sorted("client-grants")
                .iter()
                .any(|g| g["client_id"] == fields["client_id"] && g["audience"] == fields["audience"]);
            if duplicate {
                return error(StatusCode::CONFLICT, "Conflict", "A client grant for this client and audience already exists");
            }
            let mut grant = fields;
            grant.insert("id".into(), json!(new_id("cgr_")));
            Value::Object(grant)
        }
        _ => return error(StatusCode::NOT_FOUND, "Not Found", "Unknown collection"),
    };

    let id = record[id_field(&collection)].as_str().unwrap_or_default().to_string();
    let seq = state.next_seq();
    state.store(&collection).insert(id, (seq, record.clone()));
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed = serde_json::from_slice::<Value>(&body).ok();
    let path = format!("/{}/{}", collection, id);
    if let Some(early) = prologue(&state, Method::PATCH, path, &HashMap::new(), &headers, parsed) {
        return early;
    }
    let fields = match parse_object(&body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    if fields.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: Too few properties defined (0), minimum 1");
    }

    let injected = state.fail_patch_with_field.lock().unwrap().clone();
    if let Some((field, status)) = injected {
        if fields.contains_key(&field) {
            let status = StatusCode::from_u16(status).unwrap();
            return error(status, "Bad Request", &format!("injected failure for '{}'", field));
        }
    }

    match collection.as_str() {
        "users" => {
            for isolated in ["password", "email_verified"] {
                if fields.contains_key(isolated) && fields.len() > 1 {
                    return error(
                        StatusCode::BAD_REQUEST,
                        "Bad Request",
                        &format!("Cannot update {} together with other properties", isolated),
                    );
                }
            }
        }
        "resource-servers" if fields.contains_key("identifier") => {
            return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: identifier is read-only");
        }
        "client-grants" if fields.keys().any(|k| k != "scope") => {
            return error(StatusCode::BAD_REQUEST, "Bad Request", "Payload validation error: only scope can be updated");
        }
        _ => {}
    }

    let store = state.store(&collection);
    let Some(mut entry) = store.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Not Found", "The resource does not exist");
    };
    if let Value::Object(record) = &mut entry.value_mut().1 {
        for (key, value) in fields {
            match key.as_str() {
                "password" => {}
                "connection" => {
                    record["identities"][0]["connection"] = value;
                }
                _ => {
                    record.insert(key, value);
                }
            }
        }
    }
    let updated = entry.value().1.clone();
    Json(updated).into_response()
}

async fn remove(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/{}/{}", collection, id);
    if let Some(early) = prologue(&state, Method::DELETE, path, &HashMap::new(), &headers, None) {
        return early;
    }

    let removed = state.store(&collection).remove(&id).is_some();
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Not Found", "The resource does not exist")
    }
}
