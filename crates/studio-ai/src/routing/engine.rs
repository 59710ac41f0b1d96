use std::sync::Arc;

use tracing::warn;

use super::classifier::{ClassifierDecision, TicketClassifier};
use super::domain::{RoutingDecision, TicketPriority, TicketSubmission, FALLBACK_DEPARTMENT};
use super::rules::RoutingRules;

/// Routing decision engine: probabilistic classification composed with the
/// deterministic override layer.
pub struct TicketRouter {
    classifier: Arc<dyn TicketClassifier>,
    rules: RoutingRules,
}

impl TicketRouter {
    pub fn new(classifier: Arc<dyn TicketClassifier>, rules: RoutingRules) -> Self {
        Self { classifier, rules }
    }

    pub fn rules(&self) -> &RoutingRules {
        &self.rules
    }

    /// Never fails: any classifier failure produces the fixed degraded
    /// decision so ticket creation always completes.
    pub async fn route(&self, submission: &TicketSubmission) -> RoutingDecision {
        match self.classifier.classify(submission).await {
            Ok(raw) => self.apply_rules(submission, raw),
            Err(error) => {
                warn!(error = %error, "ticket classification unavailable");
                RoutingDecision::degraded(&error.to_string())
            }
        }
    }

    fn apply_rules(
        &self,
        submission: &TicketSubmission,
        raw: ClassifierDecision,
    ) -> RoutingDecision {
        let mut department = raw.department.clone();
        let mut priority = raw.priority.unwrap_or(TicketPriority::Medium);

        // Category default: fills in only when the classifier gave no
        // department or was not confident enough. Never touches priority.
        if let Some(category) = submission.category.as_deref() {
            if let Some(default_department) = self.rules.category_departments.get(category) {
                if department.is_none() || raw.routing_confidence < self.rules.confidence_floor {
                    department = Some(default_department.clone());
                }
            }
        }

        // Subcategory override wins unconditionally, regardless of
        // classifier confidence.
        if let Some(subcategory) = submission.subcategory.as_deref() {
            if let Some(forced) = self.rules.subcategory_overrides.get(subcategory) {
                department = Some(forced.department.clone());
                if let Some(forced_priority) = forced.priority {
                    priority = forced_priority;
                }
            }
        }

        RoutingDecision {
            department: department.unwrap_or_else(|| FALLBACK_DEPARTMENT.to_string()),
            priority,
            suggested_tags: raw.suggested_tags,
            needs_escalation: raw.needs_escalation,
            escalation_reason: raw.escalation_reason,
            routing_confidence: raw.routing_confidence.clamp(0.0, 1.0),
            analysis: raw.analysis,
        }
    }
}
