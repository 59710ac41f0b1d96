use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    PostForm,
}

/// A single outbound request to the platform, independent of the HTTP stack
/// so the client protocol can be exercised against scripted doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRequest {
    pub method: RequestMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub basic: Option<String>,
}

impl PlatformRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
            bearer: None,
            basic: None,
        }
    }

    pub fn post_form(path: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::PostForm,
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
            bearer: None,
            basic: None,
        }
    }

    pub fn queries(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn basic(mut self, token: impl Into<String>) -> Self {
        self.basic = Some(token.into());
        self
    }

    /// Convenience for assertions and logging.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Status plus decoded JSON body. Non-JSON bodies decode to `null`.
#[derive(Debug, Clone)]
pub struct PlatformResponse {
    pub status: u16,
    pub body: Value,
}

impl PlatformResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {source}")]
    Build { source: reqwest::Error },
    #[error("request to {path} failed: {source}")]
    Request { path: String, source: reqwest::Error },
    #[error("response body from {path} unreadable: {source}")]
    Body { path: String, source: reqwest::Error },
}

/// Seam between the client protocol and the wire. The production
/// implementation wraps `reqwest`; tests substitute scripted doubles.
#[async_trait]
pub trait PlatformTransport: Send + Sync {
    async fn execute(&self, request: PlatformRequest) -> Result<PlatformResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|source| TransportError::Build { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PlatformTransport for ReqwestTransport {
    async fn execute(&self, request: PlatformRequest) -> Result<PlatformResponse, TransportError> {
        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));

        let mut builder = match request.method {
            RequestMethod::Get => self.client.get(&url),
            RequestMethod::PostForm => self.client.post(&url).form(&request.form),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(bearer) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }
        if let Some(basic) = &request.basic {
            builder = builder.header(AUTHORIZATION, format!("Basic {basic}"));
        }

        let response = builder.send().await.map_err(|source| TransportError::Request {
            path: request.path.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|source| TransportError::Body {
            path: request.path.clone(),
            source,
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(PlatformResponse { status, body })
    }
}
