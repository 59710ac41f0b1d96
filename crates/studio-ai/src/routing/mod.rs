//! Routing decisions for new support tickets: a probabilistic classifier
//! composed with deterministic category/subcategory override tables, plus
//! the intake service that assembles and stores the resulting ticket.

pub mod classifier;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{
    ClassifierConfig, ClassifierDecision, ClassifierError, HttpTicketClassifier, TicketClassifier,
};
pub use domain::{
    RoutingDecision, TicketId, TicketPriority, TicketStatus, TicketSubmission, FALLBACK_DEPARTMENT,
};
pub use engine::TicketRouter;
pub use repository::{
    EscalationNotice, NotificationError, NotificationPublisher, RepositoryError, TicketRecord,
    TicketRepository, TicketView,
};
pub use router::ticket_router;
pub use rules::{RoutingRules, RulesError, SubcategoryOverride};
pub use service::{TicketIntakeService, TicketServiceError};
