//! In-process stand-in for the SBM server.
//!
//! Mirrors the server's response shapes: scalar/array/`{}` listings,
//! `{"err": ...}` error bodies, `{"status": "ok"}` on delete.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sbm_common::{template, ResourceKind};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    collections: HashMap<String, Vec<(String, Value)>>,
    requests: Vec<String>,
    next_response: Option<(StatusCode, String)>,
    answers: Vec<(Method, String, StatusCode, String)>,
}

#[derive(Clone, Default)]
pub struct FakeSbm {
    store: Arc<Mutex<Store>>,
}

impl FakeSbm {
    /// Starts the server on an ephemeral port and returns it with its base URL.
    pub async fn start() -> (Self, String) {
        let fake = FakeSbm::default();
        let app = Router::new()
            .route("/api/v1/boot/test/{hostname}/", get(boot_test))
            .route("/api/v1/{kind}/", get(list).put(create))
            .route("/api/v1/{kind}/{key}/", get(fetch).post(update).delete(remove))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (fake, format!("http://{}/", addr))
    }

    pub fn seed(&self, kind: &str, record: Value) {
        let field = key_field(kind).unwrap();
        let key = record[field].as_str().unwrap().to_string();
        let mut store = self.store.lock().unwrap();
        upsert(store.collections.entry(kind.to_string()).or_default(), key, record);
    }

    /// Makes the next request answer with `status` and a raw `body`.
    pub fn fail_next(&self, status: u16, body: &str) {
        let mut store = self.store.lock().unwrap();
        store.next_response = Some((StatusCode::from_u16(status).unwrap(), body.to_string()));
    }

    /// Makes the next `method` request to `path` answer with `status` and a
    /// raw `body`. Other requests are served normally until then.
    pub fn answer_next(&self, method: Method, path: &str, status: u16, body: &str) {
        let mut store = self.store.lock().unwrap();
        store.answers.push((
            method,
            path.to_string(),
            StatusCode::from_u16(status).unwrap(),
            body.to_string(),
        ));
    }

    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    /// Number of requests that were not GETs.
    pub fn writes(&self) -> usize {
        self.requests().iter().filter(|r| !r.starts_with("GET ")).count()
    }

    pub fn record(&self, kind: &str, key: &str) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store
            .collections
            .get(kind)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Logs the request and returns an injected response, if one is pending.
    fn intercept(&self, method: &Method, uri: &Uri) -> Option<Response> {
        let mut store = self.store.lock().unwrap();
        store.requests.push(format!("{} {}", method, uri.path()));
        if let Some((status, body)) = store.next_response.take() {
            return Some((status, body).into_response());
        }
        let pos = store
            .answers
            .iter()
            .position(|(m, path, _, _)| m == method && path == uri.path())?;
        let (_, _, status, body) = store.answers.remove(pos);
        Some((status, body).into_response())
    }
}

fn key_field(kind: &str) -> Option<&'static str> {
    ResourceKind::ALL
        .into_iter()
        .find(|k| k.as_str() == kind)
        .map(|k| k.key_field())
}

fn upsert(records: &mut Vec<(String, Value)>, key: String, record: Value) {
    match records.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = record,
        None => records.push((key, record)),
    }
}

fn err(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "err": message.into() }))).into_response()
}

// One key is sent bare, several as an array, none as an empty object.
fn listing(store: &Store, kind: &str) -> Value {
    let keys: Vec<&String> = store
        .collections
        .get(kind)
        .map(|records| records.iter().map(|(k, _)| k).collect())
        .unwrap_or_default();
    match keys.as_slice() {
        [] => json!({}),
        [only] => json!(only),
        many => json!(many),
    }
}

fn render_record(kind: &str, record: &Value) -> Value {
    let mut record = record.clone();
    if kind == "machine" {
        record["use_alternate"] = json!(false);
        record["last_boot"] = json!("Thu, 01 Jan 1970 00:00:00 GMT");
    }
    record
}

async fn list(State(fake): State<FakeSbm>, method: Method, uri: Uri, Path(kind): Path<String>) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    if key_field(&kind).is_none() {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    let store = fake.store.lock().unwrap();
    Json(listing(&store, &kind)).into_response()
}

async fn create(
    State(fake): State<FakeSbm>,
    method: Method,
    uri: Uri,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    let Some(field) = key_field(&kind) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    let Some(key) = body[field].as_str().map(str::to_string) else {
        return err(StatusCode::NOT_ACCEPTABLE, format!("KeyError: '{}'", field));
    };
    let mut store = fake.store.lock().unwrap();
    upsert(store.collections.entry(kind.clone()).or_default(), key, body);
    Json(listing(&store, &kind)).into_response()
}

async fn fetch(
    State(fake): State<FakeSbm>,
    method: Method,
    uri: Uri,
    Path((kind, key)): Path<(String, String)>,
) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    match fake.record(&kind, &key) {
        Some(record) => Json(render_record(&kind, &record)).into_response(),
        None => err(StatusCode::NOT_FOUND, format!("no {} named {}", kind, key)),
    }
}

async fn update(
    State(fake): State<FakeSbm>,
    method: Method,
    uri: Uri,
    Path((kind, key)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    let Some(field) = key_field(&kind) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    let Some(body_key) = body[field].as_str().map(str::to_string) else {
        return err(StatusCode::NOT_ACCEPTABLE, format!("KeyError: '{}'", field));
    };
    {
        let mut store = fake.store.lock().unwrap();
        upsert(store.collections.entry(kind.clone()).or_default(), body_key, body);
    }
    match fake.record(&kind, &key) {
        Some(record) => Json(render_record(&kind, &record)).into_response(),
        None => err(StatusCode::NOT_FOUND, format!("no {} named {}", kind, key)),
    }
}

async fn remove(
    State(fake): State<FakeSbm>,
    method: Method,
    uri: Uri,
    Path((kind, key)): Path<(String, String)>,
) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    let mut store = fake.store.lock().unwrap();
    let Some(records) = store.collections.get_mut(&kind) else {
        return err(StatusCode::NOT_ACCEPTABLE, format!("no {} named {}", kind, key));
    };
    let before = records.len();
    records.retain(|(k, _)| *k != key);
    if records.len() == before {
        return err(StatusCode::NOT_ACCEPTABLE, format!("no {} named {}", kind, key));
    }
    Json(json!({ "status": "ok" })).into_response()
}

async fn boot_test(State(fake): State<FakeSbm>, method: Method, uri: Uri, Path(hostname): Path<String>) -> Response {
    if let Some(response) = fake.intercept(&method, &uri) {
        return response;
    }
    let Some(machine) = fake.record("machine", &hostname) else {
        return (StatusCode::OK, format!("no machine named {}", hostname)).into_response();
    };
    let title = machine["default_boot"].as_str().unwrap_or_default().to_string();
    let Some(boot_config) = fake.record("boot_config", &title) else {
        return (StatusCode::OK, format!("no boot config named {}", title)).into_response();
    };
    let vars: HashMap<String, String> = {
        let store = fake.store.lock().unwrap();
        store
            .collections
            .get("variable")
            .map(|records| {
                records
                    .iter()
                    .map(|(k, v)| (k.clone(), v["value"].as_str().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    };
    let config = boot_config["config"].as_str().unwrap_or_default();
    match template::render(config, &vars) {
        Ok(script) => (StatusCode::OK, script).into_response(),
        Err(e) => (StatusCode::OK, e.to_string()).into_response(),
    }
}
