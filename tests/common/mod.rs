//! In-process stand-in for the VK Cloud identity and public DNS APIs.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use vkcloud_dns_webhook::config::AppConfig;
use vkcloud_dns_webhook::secrets::{
    KEY_AUTH_URL, KEY_DOMAIN_NAME, KEY_PASSWORD, KEY_PROJECT_ID, KEY_USERNAME, MemorySecretStore,
    SecretData,
};
use vkcloud_dns_webhook::solver::{ChallengeRequest, VkCloudSolver};

pub const TOKEN: &str = "gAAAAABtest-token";
pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "vkcloud-credentials";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    pub uuid: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
}

#[derive(Default)]
pub struct MockState {
    zones: Mutex<Vec<(String, String)>>,
    records: Mutex<BTreeMap<String, Vec<StoredRecord>>>,
    requests: Mutex<Vec<String>>,
    auth_bodies: Mutex<Vec<Value>>,
    create_failure: Mutex<Option<(StatusCode, String)>>,
    zone_list_failure: Mutex<Option<(StatusCode, String)>>,
    txt_list_failure: Mutex<Option<(StatusCode, String)>>,
    delete_failure: Mutex<Option<(StatusCode, String)>>,
    garble_zone_list: AtomicBool,
    withhold_token: AtomicBool,
    next_id: AtomicU64,
}

impl MockState {
    fn log(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("X-Auth-Token")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|t| t == TOKEN)
    }
}

pub struct MockProvider {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockProvider {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/v3/auth/tokens", post(issue_token))
            .route("/dns/", get(list_zones))
            .route("/dns/{zone}/txt/", get(list_txt).post(create_txt))
            .route("/dns/{zone}/txt/{uuid}", delete(delete_txt))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn auth_url(&self) -> String {
        format!("http://{}/v3/auth/tokens", self.addr)
    }

    pub fn dns_base(&self) -> String {
        format!("http://{}/dns/", self.addr)
    }

    pub fn add_zone(&self, uuid: &str, zone: &str) {
        self.state
            .zones
            .lock()
            .unwrap()
            .push((uuid.to_string(), zone.to_string()));
    }

    pub fn seed_record(&self, zone_id: &str, uuid: &str, name: &str, content: &str) {
        self.state
            .records
            .lock()
            .unwrap()
            .entry(zone_id.to_string())
            .or_default()
            .push(StoredRecord {
                uuid: uuid.to_string(),
                name: name.to_string(),
                content: content.to_string(),
                ttl: 60,
            });
    }

    pub fn records(&self, zone_id: &str) -> Vec<StoredRecord> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn dns_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.contains(" /dns/"))
            .collect()
    }

    pub fn auth_bodies(&self) -> Vec<Value> {
        self.state.auth_bodies.lock().unwrap().clone()
    }

    pub fn withhold_token(&self) {
        self.state.withhold_token.store(true, Ordering::SeqCst);
    }

    pub fn fail_creates(&self, status: StatusCode, body: &str) {
        *self.state.create_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn fail_zone_list(&self, status: StatusCode, body: &str) {
        *self.state.zone_list_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Answer the zone list with 200 and a body that is not JSON.
    pub fn garble_zone_list(&self) {
        self.state.garble_zone_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_txt_list(&self, status: StatusCode, body: &str) {
        *self.state.txt_list_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Answer every DELETE with `status` and leave the records in place.
    pub fn fail_deletes(&self, status: StatusCode, body: &str) {
        *self.state.delete_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::new("acme.example.com").with_api_base_url(self.dns_base())
    }

    pub fn secret(&self) -> SecretData {
        credential_secret(&self.auth_url())
    }

    /// Solver wired to this mock with a valid credential secret.
    pub async fn solver(&self) -> VkCloudSolver {
        let store = MemorySecretStore::new();
        store.insert(NAMESPACE, SECRET_NAME, self.secret()).await;
        VkCloudSolver::with_store(self.config(), Arc::new(store))
    }
}

pub fn credential_secret(auth_url: &str) -> SecretData {
    [
        (KEY_AUTH_URL, auth_url),
        (KEY_USERNAME, "user@example.com"),
        (KEY_PASSWORD, "hunter2"),
        (KEY_PROJECT_ID, "project-1"),
        (KEY_DOMAIN_NAME, "users"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
    .collect()
}

pub fn challenge(fqdn: &str, zone: &str, key: &str) -> ChallengeRequest {
    ChallengeRequest {
        uid: "uid-1".into(),
        key: key.into(),
        resource_namespace: NAMESPACE.into(),
        resolved_fqdn: fqdn.into(),
        resolved_zone: zone.into(),
        config: Some(json!({ "secretRef": { "name": SECRET_NAME } })),
        ..Default::default()
    }
}

async fn issue_token(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.log("POST /v3/auth/tokens".into());
    state.auth_bodies.lock().unwrap().push(body);
    if state.withhold_token.load(Ordering::SeqCst) {
        return (StatusCode::CREATED, Json(json!({ "token": {} }))).into_response();
    }
    (
        StatusCode::CREATED,
        [("X-Subject-Token", TOKEN)],
        Json(json!({ "token": {} })),
    )
        .into_response()
}

async fn list_zones(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.log("GET /dns/".into());
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some((status, msg)) = state.zone_list_failure.lock().unwrap().clone() {
        return (status, msg).into_response();
    }
    if state.garble_zone_list.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    let zones: Vec<Value> = state
        .zones
        .lock()
        .unwrap()
        .iter()
        .map(|(uuid, zone)| json!({ "uuid": uuid, "zone": zone }))
        .collect();
    Json(zones).into_response()
}

async fn list_txt(
    State(state): State<Arc<MockState>>,
    Path(zone): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.log(format!("GET /dns/{zone}/txt/"));
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some((status, msg)) = state.txt_list_failure.lock().unwrap().clone() {
        return (status, msg).into_response();
    }
    let records: Vec<Value> = state
        .records
        .lock()
        .unwrap()
        .get(&zone)
        .into_iter()
        .flatten()
        .map(|r| json!({ "uuid": r.uuid, "name": r.name, "content": r.content, "ttl": r.ttl }))
        .collect();
    Json(json!({ "txt_records": records })).into_response()
}

#[derive(Deserialize)]
struct CreateBody {
    name: String,
    content: String,
    ttl: u32,
}

async fn create_txt(
    State(state): State<Arc<MockState>>,
    Path(zone): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Response {
    state.log(format!("POST /dns/{zone}/txt/"));
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some((status, msg)) = state.create_failure.lock().unwrap().clone() {
        return (status, msg).into_response();
    }
    let uuid = format!("rec-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let record = StoredRecord {
        uuid: uuid.clone(),
        name: body.name,
        content: body.content,
        ttl: body.ttl,
    };
    state
        .records
        .lock()
        .unwrap()
        .entry(zone)
        .or_default()
        .push(record.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "uuid": uuid, "name": record.name, "content": record.content, "ttl": record.ttl })),
    )
        .into_response()
}

async fn delete_txt(
    State(state): State<Arc<MockState>>,
    Path((zone, uuid)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.log(format!("DELETE /dns/{zone}/txt/{uuid}"));
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some((status, msg)) = state.delete_failure.lock().unwrap().clone() {
        return (status, msg).into_response();
    }
    let mut records = state.records.lock().unwrap();
    let Some(list) = records.get_mut(&zone) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let before = list.len();
    list.retain(|r| r.uuid != uuid);
    if list.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
