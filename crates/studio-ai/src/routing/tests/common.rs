use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::routing::classifier::{ClassifierDecision, ClassifierError, TicketClassifier};
use crate::routing::domain::{TicketId, TicketPriority, TicketSubmission};
use crate::routing::engine::TicketRouter;
use crate::routing::repository::{
    EscalationNotice, NotificationError, NotificationPublisher, RepositoryError, TicketRecord,
    TicketRepository,
};
use crate::routing::rules::RoutingRules;
use crate::routing::service::TicketIntakeService;

/// Classifier double replaying scripted outcomes; a single entry repeats
/// forever, an exhausted script answers `Empty`.
pub(super) struct ScriptedClassifier {
    responses: Mutex<Vec<Result<ClassifierDecision, ClassifierError>>>,
    calls: Mutex<usize>,
}

impl ScriptedClassifier {
    pub(super) fn new(responses: Vec<Result<ClassifierDecision, ClassifierError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(0),
        }
    }

    pub(super) fn always(decision: ClassifierDecision) -> Self {
        Self::new(vec![Ok(decision)])
    }

    pub(super) fn failing(error: ClassifierError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub(super) fn call_count(&self) -> usize {
        *self.calls.lock().expect("call counter poisoned")
    }
}

#[async_trait]
impl TicketClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        _submission: &TicketSubmission,
    ) -> Result<ClassifierDecision, ClassifierError> {
        *self.calls.lock().expect("call counter poisoned") += 1;
        let mut responses = self.responses.lock().expect("responses poisoned");
        if responses.is_empty() {
            return Err(ClassifierError::Empty);
        }
        if responses.len() == 1 {
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}

pub(super) fn classifier_decision(department: Option<&str>, confidence: f32) -> ClassifierDecision {
    ClassifierDecision {
        department: department.map(str::to_string),
        priority: Some(TicketPriority::Low),
        suggested_tags: vec!["auto".to_string()],
        needs_escalation: false,
        escalation_reason: None,
        routing_confidence: confidence,
        analysis: "classifier rationale".to_string(),
    }
}

pub(super) fn submission(category: Option<&str>, subcategory: Option<&str>) -> TicketSubmission {
    TicketSubmission {
        title: "Locker door will not close".to_string(),
        description: "Locker 14 in the Downtown changing room is jammed".to_string(),
        category: category.map(str::to_string),
        subcategory: subcategory.map(str::to_string),
        studio_id: Some("8402".to_string()),
        priority: None,
    }
}

pub(super) fn router_with(classifier: ScriptedClassifier) -> TicketRouter {
    TicketRouter::new(Arc::new(classifier), RoutingRules::standard())
}

#[derive(Default, Clone)]
pub(super) struct MemoryTickets {
    records: Arc<Mutex<HashMap<TicketId, TicketRecord>>>,
}

impl TicketRepository for MemoryTickets {
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
        Ok(guard.values().take(limit).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<EscalationNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<EscalationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotices {
    fn publish(&self, notice: EscalationNotice) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct UnavailableTickets;

impl TicketRepository for UnavailableTickets {
    fn insert(&self, _record: TicketRecord) -> Result<TicketRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TicketId) -> Result<Option<TicketRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn open(&self, _limit: usize) -> Result<Vec<TicketRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    classifier: ScriptedClassifier,
) -> (
    TicketIntakeService<MemoryTickets, MemoryNotices>,
    Arc<MemoryTickets>,
    Arc<MemoryNotices>,
) {
    let repository = Arc::new(MemoryTickets::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = TicketIntakeService::new(
        repository.clone(),
        notices.clone(),
        router_with(classifier),
    );
    (service, repository, notices)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
