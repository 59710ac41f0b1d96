use serde::{Deserialize, Serialize};

/// Ticket priority on the ordered scale used for escalation comparisons.
/// Variant order gives `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub const fn label(self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Critical => "critical",
        }
    }
}

/// Inbound ticket submission from the multi-step intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSubmission {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default, rename = "studioId")]
    pub studio_id: Option<String>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}

pub const FALLBACK_DEPARTMENT: &str = "Operations";

/// Final routing produced once per submission, never recomputed or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub department: String,
    pub priority: TicketPriority,
    pub suggested_tags: Vec<String>,
    pub needs_escalation: bool,
    pub escalation_reason: Option<String>,
    pub routing_confidence: f32,
    pub analysis: String,
}

impl RoutingDecision {
    /// Fixed degraded decision used whenever classification is unavailable,
    /// so ticket creation always completes.
    pub fn degraded(reason: &str) -> Self {
        Self {
            department: FALLBACK_DEPARTMENT.to_string(),
            priority: TicketPriority::Medium,
            suggested_tags: Vec::new(),
            needs_escalation: false,
            escalation_reason: None,
            routing_confidence: 0.0,
            analysis: format!(
                "Automatic classification was unavailable ({reason}); \
                 ticket routed to Operations for manual triage."
            ),
        }
    }
}

/// Identifier wrapper for stored tickets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    Escalated,
}

impl TicketStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Escalated => "escalated",
        }
    }
}
