use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{TicketId, TicketSubmission};
use super::repository::{NotificationPublisher, RepositoryError, TicketRepository};
use super::service::{TicketIntakeService, TicketServiceError};

/// Router builder exposing the ticket intake and status endpoints.
pub fn ticket_router<R, N>(service: Arc<TicketIntakeService<R, N>>) -> Router
where
    R: TicketRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/tickets", post(submit_handler::<R, N>))
        .route("/api/v1/tickets/:ticket_id", get(status_handler::<R, N>))
        .with_state(service)
}

/// Always 200 with the stored view; classifier unavailability degrades
/// inside the engine and cannot block creation. Only the repository can
/// fail this endpoint.
pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<TicketIntakeService<R, N>>>,
    axum::Json(submission): axum::Json<TicketSubmission>,
) -> Response
where
    R: TicketRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit(submission).await {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<TicketIntakeService<R, N>>>,
    Path(ticket_id): Path<String>,
) -> Response
where
    R: TicketRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = TicketId(ticket_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(TicketServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "ticket not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
