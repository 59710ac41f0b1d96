use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;

use super::domain::{Paginated, RawMember, RawMembership, RawSession};
use super::token::{AuthError, TokenManager};
use super::transport::{PlatformRequest, PlatformTransport, TransportError};

const STATUS_UNAUTHORIZED: u16 = 401;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("platform returned status {status} for {path}")]
    Upstream { path: String, status: u16 },
    #[error("platform response for {path} could not be decoded: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Typed client for the member/session platform. Every operation is
/// 401-aware: one reactive refresh, one retry with identical arguments,
/// then the error stands.
pub struct PlatformClient {
    transport: Arc<dyn PlatformTransport>,
    tokens: Arc<TokenManager>,
}

impl PlatformClient {
    pub fn new(transport: Arc<dyn PlatformTransport>, tokens: Arc<TokenManager>) -> Self {
        Self { transport, tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Bounded request loop. The `refreshed` flag makes a second refresh
    /// attempt structurally impossible.
    async fn authorized_get<T: DeserializeOwned>(
        &self,
        path: String,
        query: Vec<(String, String)>,
    ) -> Result<T, PlatformError> {
        if self.tokens.access_token().is_none() {
            self.tokens.authenticate().await?;
        }

        let mut refreshed = false;
        loop {
            let token = self
                .tokens
                .access_token()
                .ok_or(AuthError::MissingCredentials)?;
            let request = PlatformRequest::get(&path)
                .queries(query.clone())
                .bearer(token);

            let response = self.transport.execute(request).await?;

            if response.status == STATUS_UNAUTHORIZED && !refreshed {
                self.tokens.refresh().await?;
                refreshed = true;
                continue;
            }
            if !response.is_success() {
                return Err(PlatformError::Upstream {
                    path,
                    status: response.status,
                });
            }
            return response
                .decode()
                .map_err(|source| PlatformError::Decode { path, source });
        }
    }

    /// Minimum query length is a caller/UI rule; any string is accepted here.
    pub async fn search_members(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<RawMember>, PlatformError> {
        self.authorized_get(
            "members".to_string(),
            vec![
                ("query".to_string(), query.to_string()),
                ("page".to_string(), page.to_string()),
                ("pageSize".to_string(), page_size.to_string()),
            ],
        )
        .await
    }

    pub async fn member_by_id(&self, member_id: &str) -> Result<RawMember, PlatformError> {
        self.authorized_get(format!("members/{member_id}"), Vec::new())
            .await
    }

    /// Past, non-cancelled sessions for a member. With no explicit bound the
    /// window closes at the current instant.
    pub async fn member_sessions(
        &self,
        member_id: &str,
        starts_before: Option<DateTime<Utc>>,
    ) -> Result<Paginated<RawSession>, PlatformError> {
        let bound = starts_before.unwrap_or_else(Utc::now);
        self.authorized_get(
            format!("members/{member_id}/sessions"),
            vec![
                (
                    "startsBefore".to_string(),
                    bound.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("includeCancelled".to_string(), "false".to_string()),
                ("sortBy".to_string(), "startTime".to_string()),
                ("sortOrder".to_string(), "desc".to_string()),
            ],
        )
        .await
    }

    pub async fn member_memberships(
        &self,
        member_id: &str,
    ) -> Result<Paginated<RawMembership>, PlatformError> {
        self.authorized_get(
            format!("members/{member_id}/memberships"),
            vec![("active".to_string(), "true".to_string())],
        )
        .await
    }

    pub async fn list_sessions(
        &self,
        page: u32,
        page_size: u32,
        starts_before: Option<DateTime<Utc>>,
        location_id: Option<&str>,
    ) -> Result<Paginated<RawSession>, PlatformError> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("pageSize".to_string(), page_size.to_string()),
            ("sortBy".to_string(), "startTime".to_string()),
            ("sortOrder".to_string(), "desc".to_string()),
        ];
        if let Some(bound) = starts_before {
            query.push((
                "startBefore".to_string(),
                bound.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(location) = location_id {
            query.push(("locationId".to_string(), location.to_string()));
        }
        self.authorized_get("sessions".to_string(), query).await
    }

    pub async fn session_by_id(&self, session_id: &str) -> Result<RawSession, PlatformError> {
        self.authorized_get(format!("sessions/{session_id}"), Vec::new())
            .await
    }
}
