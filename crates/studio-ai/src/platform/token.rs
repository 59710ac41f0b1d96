use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::warn;

use super::transport::{PlatformRequest, PlatformTransport, TransportError};

pub const TOKEN_PATH: &str = "auth/token";

/// Credential set for the member/session platform, fixed per deployment.
/// Absence of any field disables authenticated operations instead of
/// failing them.
#[derive(Debug, Clone, Default)]
pub struct PlatformCredentials {
    pub base_url: Option<String>,
    pub basic_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl PlatformCredentials {
    pub fn is_complete(&self) -> bool {
        self.base_url.is_some() && self.grant_fields().is_some()
    }

    fn grant_fields(&self) -> Option<(&str, &str, &str)> {
        match (&self.basic_token, &self.username, &self.password) {
            (Some(basic), Some(username), Some(password)) => {
                Some((basic, username, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Grant response. The upstream contract has produced both `refresh_token`
/// and `refreshToken`; the snake_case spelling is canonical here and the
/// alias keeps either variant from dropping the token.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("platform credentials are not configured")]
    MissingCredentials,
    #[error("token grant rejected with status {status}")]
    Rejected { status: u16 },
    #[error("no refresh token held")]
    MissingRefreshToken,
    #[error("token response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Owns the process's single token pair. Refresh is reactive: callers
/// trigger it on a 401, there is no background renewal.
pub struct TokenManager {
    transport: Arc<dyn PlatformTransport>,
    credentials: PlatformCredentials,
    state: Mutex<TokenState>,
}

impl TokenManager {
    pub fn new(transport: Arc<dyn PlatformTransport>, credentials: PlatformCredentials) -> Self {
        Self {
            transport,
            credentials,
            state: Mutex::new(TokenState::default()),
        }
    }

    pub fn credentials(&self) -> &PlatformCredentials {
        &self.credentials
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("token state poisoned")
            .access_token
            .clone()
    }

    /// Password-grant authentication. A rejected grant leaves any previously
    /// stored token pair untouched.
    pub async fn authenticate(&self) -> Result<(), AuthError> {
        if self.credentials.base_url.is_none() {
            return Err(AuthError::MissingCredentials);
        }
        let Some((basic, username, password)) = self.credentials.grant_fields() else {
            return Err(AuthError::MissingCredentials);
        };

        let request = PlatformRequest::post_form(TOKEN_PATH)
            .basic(basic)
            .form("grant_type", "password")
            .form("username", username)
            .form("password", password);

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "password grant rejected");
            return Err(AuthError::Rejected {
                status: response.status,
            });
        }

        let grant: TokenGrant = response.decode()?;
        self.store(grant);
        Ok(())
    }

    /// Refresh-token grant. On success the access token is replaced in
    /// place; on failure the caller decides whether to re-authenticate.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = self
            .state
            .lock()
            .expect("token state poisoned")
            .refresh_token
            .clone()
            .ok_or(AuthError::MissingRefreshToken)?;
        let basic = self
            .credentials
            .basic_token
            .as_deref()
            .ok_or(AuthError::MissingCredentials)?;

        let request = PlatformRequest::post_form(TOKEN_PATH)
            .basic(basic)
            .form("grant_type", "refresh_token")
            .form("refresh_token", refresh_token);

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "refresh grant rejected");
            return Err(AuthError::Rejected {
                status: response.status,
            });
        }

        let grant: TokenGrant = response.decode()?;
        self.store(grant);
        Ok(())
    }

    /// A grant without a refresh token keeps the one already held.
    fn store(&self, grant: TokenGrant) {
        let mut state = self.state.lock().expect("token state poisoned");
        state.access_token = Some(grant.access_token);
        if grant.refresh_token.is_some() {
            state.refresh_token = grant.refresh_token;
        }
    }
}
