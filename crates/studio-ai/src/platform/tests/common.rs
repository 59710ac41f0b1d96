use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::platform::aggregation::{LocationDirectory, SessionCollector};
use crate::platform::client::PlatformClient;
use crate::platform::router::{directory_router, DirectoryState};
use crate::platform::token::{PlatformCredentials, TokenManager};
use crate::platform::transport::{
    PlatformRequest, PlatformResponse, PlatformTransport, TransportError,
};

/// Transport double returning scripted responses in order and recording
/// every request it sees. An exhausted script answers 500.
pub(super) struct ScriptedTransport {
    responses: Mutex<Vec<PlatformResponse>>,
    requests: Mutex<Vec<PlatformRequest>>,
}

impl ScriptedTransport {
    pub(super) fn new(responses: Vec<PlatformResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<PlatformRequest> {
        self.requests.lock().expect("requests poisoned").clone()
    }

    pub(super) fn request_count(&self) -> usize {
        self.requests.lock().expect("requests poisoned").len()
    }

    pub(super) fn requests_for(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }
}

#[async_trait]
impl PlatformTransport for ScriptedTransport {
    async fn execute(&self, request: PlatformRequest) -> Result<PlatformResponse, TransportError> {
        self.requests
            .lock()
            .expect("requests poisoned")
            .push(request);
        let mut responses = self.responses.lock().expect("responses poisoned");
        if responses.is_empty() {
            return Ok(status(500));
        }
        Ok(responses.remove(0))
    }
}

pub(super) fn ok(body: Value) -> PlatformResponse {
    PlatformResponse { status: 200, body }
}

pub(super) fn status(code: u16) -> PlatformResponse {
    PlatformResponse {
        status: code,
        body: Value::Null,
    }
}

pub(super) fn credentials() -> PlatformCredentials {
    PlatformCredentials {
        base_url: Some("https://platform.example.com".to_string()),
        basic_token: Some("c3R1ZGlvOnNlY3JldA==".to_string()),
        username: Some("desk@studio.example".to_string()),
        password: Some("hunter2".to_string()),
    }
}

pub(super) fn token_grant() -> Value {
    json!({ "access_token": "tok-1", "refresh_token": "ref-1", "token_type": "Bearer" })
}

pub(super) fn refreshed_grant() -> Value {
    json!({ "access_token": "tok-2" })
}

pub(super) fn member_json(id: &str) -> Value {
    json!({
        "id": id,
        "firstName": "Ada",
        "lastName": "Lake",
        "email": "ada@example.com",
        "phone": "+1 555 0100",
        "statistics": { "appointments": 3, "bookings": 9, "openArea": 2, "total": 14 },
        "tags": [{ "id": "tag-1", "name": "early-bird" }],
    })
}

pub(super) fn session_json(id: &str, capacity: u32, bookings: u32) -> Value {
    json!({
        "id": id,
        "name": "Spin 45",
        "startTime": "2026-03-10T07:00:00Z",
        "capacity": capacity,
        "bookingCount": bookings,
        "location": { "id": "8402", "name": "Downtown" },
    })
}

pub(super) fn page_json(payload: Vec<Value>, total: u64, page: u32, page_size: u32) -> Value {
    json!({
        "payload": payload,
        "pagination": { "totalCount": total, "page": page, "pageSize": page_size },
    })
}

pub(super) fn manager_with(
    responses: Vec<PlatformResponse>,
    credentials: PlatformCredentials,
) -> (Arc<TokenManager>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(responses));
    let manager = Arc::new(TokenManager::new(transport.clone(), credentials));
    (manager, transport)
}

pub(super) fn client_with(
    responses: Vec<PlatformResponse>,
) -> (Arc<PlatformClient>, Arc<ScriptedTransport>) {
    client_with_credentials(responses, credentials())
}

pub(super) fn client_with_credentials(
    responses: Vec<PlatformResponse>,
    credentials: PlatformCredentials,
) -> (Arc<PlatformClient>, Arc<ScriptedTransport>) {
    let (tokens, transport) = manager_with(responses, credentials);
    let client = Arc::new(PlatformClient::new(transport.clone(), tokens));
    (client, transport)
}

pub(super) fn collector_with(
    responses: Vec<PlatformResponse>,
) -> (SessionCollector, Arc<ScriptedTransport>) {
    let (client, transport) = client_with(responses);
    (
        SessionCollector::new(client, LocationDirectory::standard()),
        transport,
    )
}

pub(super) fn directory_router_with(
    responses: Vec<PlatformResponse>,
    credentials: PlatformCredentials,
) -> (axum::Router, Arc<ScriptedTransport>) {
    let (client, transport) = client_with_credentials(responses, credentials);
    let state = DirectoryState {
        client: client.clone(),
        collector: SessionCollector::new(client, LocationDirectory::standard()),
    };
    (directory_router(Arc::new(state)), transport)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
