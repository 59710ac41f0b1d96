use serde::{Deserialize, Serialize};

use super::domain::{RoutingDecision, TicketId, TicketPriority, TicketStatus, TicketSubmission};

/// Stored ticket: the submission, its one-time routing decision, and the
/// effective priority after escalation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket_id: TicketId,
    pub submission: TicketSubmission,
    pub decision: RoutingDecision,
    pub priority: TicketPriority,
    pub status: TicketStatus,
}

impl TicketRecord {
    pub fn view(&self) -> TicketView {
        TicketView {
            ticket_id: self.ticket_id.clone(),
            status: self.status.label(),
            department: self.decision.department.clone(),
            priority: self.priority,
            needs_escalation: self.decision.needs_escalation,
            routing_confidence: self.decision.routing_confidence,
            suggested_tags: self.decision.suggested_tags.clone(),
            analysis: self.decision.analysis.clone(),
        }
    }
}

/// Storage abstraction so the intake service can be exercised in isolation.
/// The real data store stays outside this crate.
pub trait TicketRepository: Send + Sync {
    fn insert(&self, record: TicketRecord) -> Result<TicketRecord, RepositoryError>;
    fn fetch(&self, id: &TicketId) -> Result<Option<TicketRecord>, RepositoryError>;
    fn open(&self, limit: usize) -> Result<Vec<TicketRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound escalation hook (e-mail, chat, paging — an adapter concern).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: EscalationNotice) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationNotice {
    pub ticket_id: TicketId,
    pub department: String,
    pub priority: TicketPriority,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a ticket's exposed state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub ticket_id: TicketId,
    pub status: &'static str,
    pub department: String,
    pub priority: TicketPriority,
    pub needs_escalation: bool,
    pub routing_confidence: f32,
    pub suggested_tags: Vec<String>,
    pub analysis: String,
}
