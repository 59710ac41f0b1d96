use std::sync::Arc;

use super::common::*;
use crate::routing::classifier::ClassifierError;
use crate::routing::domain::{TicketPriority, TicketStatus};
use crate::routing::service::{effective_priority, TicketIntakeService, TicketServiceError};

#[test]
fn decision_priority_only_ever_raises_the_user_choice() {
    assert_eq!(
        effective_priority(Some(TicketPriority::Medium), TicketPriority::Critical),
        TicketPriority::Critical
    );
    assert_eq!(
        effective_priority(Some(TicketPriority::High), TicketPriority::Low),
        TicketPriority::High
    );
    assert_eq!(
        effective_priority(None, TicketPriority::Low),
        TicketPriority::Low
    );
}

#[tokio::test]
async fn stored_ticket_carries_the_escalated_priority() {
    let mut raw = classifier_decision(Some("Security"), 0.9);
    raw.priority = Some(TicketPriority::Critical);
    let (service, _, _) = build_service(ScriptedClassifier::always(raw));

    let mut ticket = submission(None, None);
    ticket.priority = Some(TicketPriority::Medium);
    let record = service.submit(ticket).await.expect("submission succeeds");

    assert_eq!(record.priority, TicketPriority::Critical);
}

#[tokio::test]
async fn user_priority_survives_a_lower_decision() {
    let (service, _, _) =
        build_service(ScriptedClassifier::always(classifier_decision(Some("Training"), 0.9)));

    let mut ticket = submission(None, None);
    ticket.priority = Some(TicketPriority::High);
    let record = service.submit(ticket).await.expect("submission succeeds");

    assert_eq!(record.priority, TicketPriority::High);
}

#[tokio::test]
async fn escalation_flag_publishes_a_notice() {
    let mut raw = classifier_decision(Some("Security"), 0.9);
    raw.needs_escalation = true;
    raw.escalation_reason = Some("member safety concern".to_string());
    let (service, _, notices) = build_service(ScriptedClassifier::always(raw));

    let record = service
        .submit(submission(None, None))
        .await
        .expect("submission succeeds");

    assert_eq!(record.status, TicketStatus::Escalated);
    let events = notices.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].ticket_id, record.ticket_id);
    assert_eq!(events[0].reason, "member safety concern");
}

#[tokio::test]
async fn degraded_decisions_do_not_escalate() {
    let (service, _, notices) = build_service(ScriptedClassifier::failing(
        ClassifierError::Status(502),
    ));

    let record = service
        .submit(submission(None, None))
        .await
        .expect("submission succeeds");

    assert_eq!(record.status, TicketStatus::Open);
    assert!(notices.events().is_empty());
}

#[tokio::test]
async fn tickets_receive_distinct_sequential_ids() {
    let (service, _, _) =
        build_service(ScriptedClassifier::always(classifier_decision(Some("Training"), 0.9)));

    let first = service
        .submit(submission(None, None))
        .await
        .expect("first submission");
    let second = service
        .submit(submission(None, None))
        .await
        .expect("second submission");

    assert_ne!(first.ticket_id, second.ticket_id);
    assert!(first.ticket_id.0.starts_with("tkt-"));
}

#[tokio::test]
async fn repository_failures_surface() {
    let classifier = ScriptedClassifier::always(classifier_decision(Some("Training"), 0.9));
    let service = TicketIntakeService::new(
        Arc::new(UnavailableTickets),
        Arc::new(MemoryNotices::default()),
        router_with(classifier),
    );

    let result = service.submit(submission(None, None)).await;

    assert!(matches!(
        result,
        Err(TicketServiceError::Repository(_))
    ));
}
