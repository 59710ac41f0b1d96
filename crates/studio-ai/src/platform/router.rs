use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::aggregation::SessionCollector;
use super::client::{PlatformClient, PlatformError};
use super::domain::{Paginated, RawMember, RawMembership, RawSession};
use super::normalize;

pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 50;
pub const DEFAULT_SESSION_PAGES: u32 = 5;

/// Shared state for the directory proxy endpoint.
pub struct DirectoryState {
    pub client: Arc<PlatformClient>,
    pub collector: SessionCollector,
}

/// Action-dispatch request shape used by the intake form's backend layer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    pub action: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

pub fn directory_router(state: Arc<DirectoryState>) -> Router {
    Router::new()
        .route("/api/v1/platform/query", post(query_handler))
        .with_state(state)
}

/// Known actions degrade platform failures to their documented empty value
/// with HTTP 200; only unknown actions and missing parameters surface a 500.
pub(crate) async fn query_handler(
    State(state): State<Arc<DirectoryState>>,
    Json(request): Json<DirectoryQuery>,
) -> Response {
    match request.action.as_str() {
        "searchMembers" => {
            let Some(query) = request.query else {
                return missing_parameter("query");
            };
            let page = request.page.unwrap_or(0);
            let page_size = request.page_size.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE);
            match state.client.search_members(&query, page, page_size).await {
                Ok(envelope) => Json(envelope).into_response(),
                Err(error) => degraded_envelope::<RawMember>("searchMembers", error),
            }
        }
        "getMemberSessions" => {
            let Some(member_id) = request.member_id else {
                return missing_parameter("memberId");
            };
            match state.client.member_sessions(&member_id, None).await {
                Ok(envelope) => Json(envelope).into_response(),
                Err(error) => degraded_envelope::<RawSession>("getMemberSessions", error),
            }
        }
        "getMemberMemberships" => {
            let Some(member_id) = request.member_id else {
                return missing_parameter("memberId");
            };
            match state.client.member_memberships(&member_id).await {
                Ok(envelope) => Json(envelope).into_response(),
                Err(error) => degraded_envelope::<RawMembership>("getMemberMemberships", error),
            }
        }
        "getSessions" => match request.page {
            Some(page) => {
                let page_size = request
                    .page_size
                    .unwrap_or(super::aggregation::SESSION_PAGE_SIZE);
                match state.client.list_sessions(page, page_size, None, None).await {
                    Ok(envelope) => Json(envelope).into_response(),
                    Err(error) => degraded_envelope::<RawSession>("getSessions", error),
                }
            }
            None => match state.collector.collect(DEFAULT_SESSION_PAGES, None, None).await {
                Ok(sessions) => {
                    let views: Vec<_> = sessions.iter().map(normalize::normalize_session).collect();
                    let body = json!({
                        "payload": views,
                        "pagination": {
                            "totalCount": views.len(),
                            "page": 0,
                            "pageSize": views.len(),
                        },
                    });
                    Json(body).into_response()
                }
                Err(error) => degraded_envelope::<RawSession>("getSessions", error),
            },
        },
        "getSessionDetails" => {
            let Some(session_id) = request.session_id else {
                return missing_parameter("sessionId");
            };
            match state.client.session_by_id(&session_id).await {
                Ok(session) => Json(session).into_response(),
                Err(error) => {
                    warn!(
                        action = "getSessionDetails",
                        error = %error,
                        "platform unavailable, returning null detail"
                    );
                    Json(Value::Null).into_response()
                }
            }
        }
        other => {
            let payload = json!({ "error": format!("unsupported action '{other}'") });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn missing_parameter(name: &str) -> Response {
    let payload = json!({ "error": format!("missing required parameter '{name}'") });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

fn degraded_envelope<T: Serialize>(action: &str, error: PlatformError) -> Response {
    warn!(action, error = %error, "platform unavailable, returning empty payload");
    Json(Paginated::<T>::empty()).into_response()
}
