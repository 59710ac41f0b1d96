use crate::infra::{InMemoryEscalationPublisher, InMemoryTicketRepository};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use clap::Args;
use std::sync::{Arc, Mutex};
use studio_ai::config::AppConfig;
use studio_ai::error::AppError;
use studio_ai::platform::{normalize, EnrichedSession, RawSession};
use studio_ai::routing::{
    ClassifierDecision, ClassifierError, HttpTicketClassifier, TicketClassifier,
    TicketIntakeService, TicketPriority, TicketRouter, TicketSubmission,
};

#[derive(Args, Debug)]
pub(crate) struct RouteArgs {
    /// Ticket title
    #[arg(long)]
    pub(crate) title: String,
    /// Ticket description
    #[arg(long)]
    pub(crate) description: String,
    /// Ticket category, e.g. "Facilities"
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Ticket subcategory, e.g. "Broken Equipment"
    #[arg(long)]
    pub(crate) subcategory: Option<String>,
    /// Studio identifier
    #[arg(long)]
    pub(crate) studio: Option<String>,
    /// Requested priority (low|medium|high|critical)
    #[arg(long, value_parser = crate::infra::parse_priority)]
    pub(crate) priority: Option<TicketPriority>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the session roster portion of the demo output.
    #[arg(long)]
    pub(crate) skip_roster: bool,
}

/// Route one ticket against the configured classifier endpoint and print
/// the decision. With no classifier reachable this prints the degraded
/// fallback, which is itself a useful smoke test.
pub(crate) async fn run_route(args: RouteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules = config.routing_rules()?;
    let classifier = Arc::new(HttpTicketClassifier::new(config.classifier.clone())?);
    let router = TicketRouter::new(classifier, rules);

    let requested = args.priority;
    let submission = TicketSubmission {
        title: args.title,
        description: args.description,
        category: args.category,
        subcategory: args.subcategory,
        studio_id: args.studio,
        priority: requested,
    };

    let decision = router.route(&submission).await;
    let effective = requested
        .map(|user| user.max(decision.priority))
        .unwrap_or(decision.priority);

    match serde_json::to_string_pretty(&decision) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("decision unavailable: {err}"),
    }
    println!("Effective ticket priority: {}", effective.label());

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Ticket intake demo (offline classifier)");

    let classifier = CannedClassifier::new(vec![
        Ok(ClassifierDecision {
            department: None,
            priority: Some(TicketPriority::Low),
            suggested_tags: vec!["billing".to_string()],
            needs_escalation: false,
            escalation_reason: None,
            routing_confidence: 0.55,
            analysis: "Looks like a routine refund question.".to_string(),
        }),
        Ok(ClassifierDecision {
            department: Some("Training".to_string()),
            priority: Some(TicketPriority::Low),
            suggested_tags: vec!["incident".to_string()],
            needs_escalation: true,
            escalation_reason: Some("possible repeat incident".to_string()),
            routing_confidence: 0.92,
            analysis: "Report mentions a missing bag from a locker.".to_string(),
        }),
        Err(ClassifierError::Http("connection refused".to_string())),
    ]);

    let repository = Arc::new(InMemoryTicketRepository::default());
    let notices = Arc::new(InMemoryEscalationPublisher::default());
    let rules = studio_ai::routing::RoutingRules::standard();
    let service = TicketIntakeService::new(
        repository,
        notices.clone(),
        TicketRouter::new(Arc::new(classifier), rules),
    );

    let tickets = [
        demo_ticket(
            "Charged twice this month",
            "My card shows two charges for the same membership period",
            Some("Billing & Payments"),
            Some("Refund Request"),
            None,
        ),
        demo_ticket(
            "Bag missing from locker",
            "My gym bag disappeared from locker 22 during the 6pm class",
            Some("Safety & Security"),
            Some("Theft"),
            Some(TicketPriority::Medium),
        ),
        demo_ticket(
            "Fan rattling in studio B",
            "The ceiling fan above the mats makes a loud rattling noise",
            Some("Facilities"),
            None,
            None,
        ),
    ];

    for ticket in tickets {
        match service.submit(ticket).await {
            Ok(record) => {
                let view = record.view();
                println!(
                    "- {} -> {} ({}, priority {})",
                    record.submission.title,
                    view.department,
                    view.status,
                    view.priority.label()
                );
                println!("  {}", view.analysis);
            }
            Err(err) => println!("- submission failed: {err}"),
        }
    }

    let events = notices.events();
    if events.is_empty() {
        println!("Escalation notices: none dispatched");
    } else {
        println!("Escalation notices:");
        for notice in events {
            println!(
                "  - {} -> {} ({}): {}",
                notice.ticket_id.0,
                notice.department,
                notice.priority.label(),
                notice.reason
            );
        }
    }

    if args.skip_roster {
        return Ok(());
    }

    println!("\nSession roster demo (detail-merged, normalized)");
    for session in demo_roster() {
        let view = normalize::normalize_session(&session);
        println!(
            "- {} @ {} | {}/{} booked | {} spots left | {}% utilized",
            view.name,
            view.location,
            view.booking_count,
            view.capacity,
            view.available_spots,
            view.utilization_rate
        );
    }

    Ok(())
}

fn demo_ticket(
    title: &str,
    description: &str,
    category: Option<&str>,
    subcategory: Option<&str>,
    priority: Option<TicketPriority>,
) -> TicketSubmission {
    TicketSubmission {
        title: title.to_string(),
        description: description.to_string(),
        category: category.map(str::to_string),
        subcategory: subcategory.map(str::to_string),
        studio_id: Some("8402".to_string()),
        priority,
    }
}

fn demo_roster() -> Vec<EnrichedSession> {
    let start = Utc.with_ymd_and_hms(2026, 3, 10, 7, 0, 0).single();
    let summary = RawSession {
        id: "ses-demo-1".to_string(),
        name: "Spin 45".to_string(),
        start_time: start,
        duration_minutes: 45,
        capacity: 20,
        booking_count: 5,
        location: Some(studio_ai::platform::domain::SessionLocation {
            id: "8402".to_string(),
            name: "Downtown".to_string(),
        }),
        ..RawSession::default()
    };
    let detail = RawSession {
        booking_count: 17,
        ..summary.clone()
    };

    let open_floor = RawSession {
        id: "ses-demo-2".to_string(),
        name: "Open Floor".to_string(),
        start_time: start,
        duration_minutes: 60,
        capacity: 35,
        booking_count: 12,
        ..RawSession::default()
    };

    vec![
        EnrichedSession {
            summary,
            detail: Some(detail),
        },
        EnrichedSession {
            summary: open_floor,
            detail: None,
        },
    ]
}

/// Offline classifier used by the demo so no network is required.
struct CannedClassifier {
    responses: Mutex<Vec<Result<ClassifierDecision, ClassifierError>>>,
}

impl CannedClassifier {
    fn new(responses: Vec<Result<ClassifierDecision, ClassifierError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl TicketClassifier for CannedClassifier {
    async fn classify(
        &self,
        _submission: &TicketSubmission,
    ) -> Result<ClassifierDecision, ClassifierError> {
        let mut responses = self.responses.lock().expect("responses poisoned");
        if responses.is_empty() {
            return Err(ClassifierError::Empty);
        }
        responses.remove(0)
    }
}
