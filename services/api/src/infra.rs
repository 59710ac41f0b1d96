use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use studio_ai::routing::{
    EscalationNotice, NotificationError, NotificationPublisher, RepositoryError, TicketId,
    TicketPriority, TicketRecord, TicketRepository, TicketStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTicketRepository {
    records: Arc<Mutex<HashMap<TicketId, TicketRecord>>>,
}

impl TicketRepository for InMemoryTicketRepository {
    fn insert(&self, record: TicketRecord) -> Result<TicketRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.ticket_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.ticket_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &TicketId) -> Result<Option<TicketRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn open(&self, limit: usize) -> Result<Vec<TicketRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == TicketStatus::Open)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEscalationPublisher {
    events: Arc<Mutex<Vec<EscalationNotice>>>,
}

impl NotificationPublisher for InMemoryEscalationPublisher {
    fn publish(&self, notice: EscalationNotice) -> Result<(), NotificationError> {
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryEscalationPublisher {
    pub(crate) fn events(&self) -> Vec<EscalationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

pub(crate) fn parse_priority(raw: &str) -> Result<TicketPriority, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(TicketPriority::Low),
        "medium" => Ok(TicketPriority::Medium),
        "high" => Ok(TicketPriority::High),
        "critical" => Ok(TicketPriority::Critical),
        other => Err(format!(
            "unknown priority '{other}' (expected low|medium|high|critical)"
        )),
    }
}
