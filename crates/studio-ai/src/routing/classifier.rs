use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::domain::{TicketPriority, TicketSubmission};

const SYSTEM_PROMPT: &str = "\
You triage support tickets for a fitness-studio chain. Departments: \
Operations, Facilities, Membership Services, Billing, Security, Training. \
Respond with a single JSON object with keys: department (string), priority \
(one of low, medium, high, critical), suggestedTags (array of strings), \
needsEscalation (boolean), escalationReason (string or null), \
routingConfidence (number between 0 and 1), analysis (short rationale).";

/// Classifier endpoint settings. Model and token limit are fixed
/// configuration, not runtime-negotiable.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 600,
            timeout_secs: 30,
        }
    }
}

/// `Clone` so scripted test doubles can replay canned failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Http(String),
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("classifier response was not valid JSON: {0}")]
    InvalidJson(String),
    #[error("classifier returned an empty response")]
    Empty,
}

/// Raw probabilistic output, before the deterministic override layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierDecision {
    pub department: Option<String>,
    pub priority: Option<TicketPriority>,
    pub suggested_tags: Vec<String>,
    pub needs_escalation: bool,
    pub escalation_reason: Option<String>,
    pub routing_confidence: f32,
    pub analysis: String,
}

#[async_trait]
pub trait TicketClassifier: Send + Sync {
    async fn classify(
        &self,
        submission: &TicketSubmission,
    ) -> Result<ClassifierDecision, ClassifierError>;
}

/// Production classifier speaking to an OpenAI-compatible chat-completions
/// endpoint and requesting a JSON-object response.
pub struct HttpTicketClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl HttpTicketClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ClassifierError::Http(error.to_string()))?;
        Ok(Self { config, client })
    }

    fn user_prompt(submission: &TicketSubmission) -> String {
        format!(
            "Title: {}\nDescription: {}\nCategory: {}\nSubcategory: {}\nStudio: {}",
            submission.title,
            submission.description,
            submission.category.as_deref().unwrap_or("(none)"),
            submission.subcategory.as_deref().unwrap_or("(none)"),
            submission.studio_id.as_deref().unwrap_or("(none)"),
        )
    }
}

#[async_trait]
impl TicketClassifier for HttpTicketClassifier {
    async fn classify(
        &self,
        submission: &TicketSubmission,
    ) -> Result<ClassifierDecision, ClassifierError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(submission) },
            ],
            "response_format": { "type": "json_object" },
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|error| ClassifierError::Http(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|error| ClassifierError::InvalidJson(error.to_string()))?;

        let content = payload
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(ClassifierError::Empty)?;

        serde_json::from_str(content)
            .map_err(|error| ClassifierError::InvalidJson(error.to_string()))
    }
}
