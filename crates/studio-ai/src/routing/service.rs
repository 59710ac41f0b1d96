use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::domain::{TicketId, TicketPriority, TicketStatus, TicketSubmission};
use super::engine::TicketRouter;
use super::repository::{
    EscalationNotice, NotificationError, NotificationPublisher, RepositoryError, TicketRecord,
    TicketRepository,
};

static TICKET_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_ticket_id() -> TicketId {
    let id = TICKET_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TicketId(format!("tkt-{id:06}"))
}

/// A manually chosen priority is never downgraded by the decision; the
/// decision can only raise it.
pub(crate) fn effective_priority(
    requested: Option<TicketPriority>,
    decided: TicketPriority,
) -> TicketPriority {
    match requested {
        Some(user) => user.max(decided),
        None => decided,
    }
}

/// Service composing the routing engine, ticket store, and escalation hook.
pub struct TicketIntakeService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    router: TicketRouter,
}

impl<R, N> TicketIntakeService<R, N>
where
    R: TicketRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>, router: TicketRouter) -> Self {
        Self {
            repository,
            notifications,
            router,
        }
    }

    /// Route and store a new ticket. Classification failures degrade; they
    /// never block creation.
    pub async fn submit(
        &self,
        submission: TicketSubmission,
    ) -> Result<TicketRecord, TicketServiceError> {
        let decision = self.router.route(&submission).await;
        let priority = effective_priority(submission.priority, decision.priority);
        let status = if decision.needs_escalation {
            TicketStatus::Escalated
        } else {
            TicketStatus::Open
        };

        let record = TicketRecord {
            ticket_id: next_ticket_id(),
            submission,
            decision,
            priority,
            status,
        };

        let stored = self.repository.insert(record)?;

        if stored.decision.needs_escalation {
            self.notifications.publish(EscalationNotice {
                ticket_id: stored.ticket_id.clone(),
                department: stored.decision.department.clone(),
                priority: stored.priority,
                reason: stored
                    .decision
                    .escalation_reason
                    .clone()
                    .unwrap_or_else(|| "flagged by classifier".to_string()),
            })?;
        }

        Ok(stored)
    }

    /// Fetch a ticket for API responses.
    pub fn get(&self, ticket_id: &TicketId) -> Result<TicketRecord, TicketServiceError> {
        let record = self
            .repository
            .fetch(ticket_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum TicketServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}
