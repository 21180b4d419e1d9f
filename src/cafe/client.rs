use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{
    DashboardStats, ErrorBody, LoginResponse, Machine, MachinesEnvelope, SessionEnvelope,
    SessionRecord, SessionsEnvelope, StartSessionRequest, Transaction, TransactionsEnvelope,
    UserEnvelope, UserProfile,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("cafe-console/", env!("CARGO_PKG_VERSION"));

/// Failures talking to the cafe backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not signed in")]
    Unauthenticated,

    #[error("Insufficient balance. Please top up your account.")]
    InsufficientBalance,

    #[error("machine {0} is not available")]
    MachineUnavailable(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
            || matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Turn a finished response into either the decoded payload or an
/// `ApiError::Status` carrying the backend's message
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(body)?)
}

/// REST client for the cafe backend
#[derive(Debug, Clone)]
pub struct CafeClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CafeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "backend response");
        decode_response(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.authorized(self.http.get(self.url(path)))?;
        self.send(builder).await
    }

    /// Sign in with basic auth and keep the issued bearer token
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let builder = self
            .http
            .post(self.url("/login"))
            .basic_auth(username, Some(password));
        let response: LoginResponse = self.send(builder).await?;
        self.token = Some(response.access_token);
        info!(username, "signed in");

        match response.user {
            Some(user) => Ok(user),
            None => self.profile().await,
        }
    }

    /// Identity of the token holder
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get::<UserEnvelope>("/profile").await.map(|envelope| envelope.user)
    }

    /// Full user record, including the current balance
    pub async fn user(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.get::<UserEnvelope>(&format!("/api/users/{user_id}"))
            .await
            .map(|envelope| envelope.user)
    }

    pub async fn active_sessions(&self) -> Result<Vec<SessionRecord>, ApiError> {
        self.get::<SessionsEnvelope>("/api/sessions/active")
            .await
            .map(|envelope| envelope.sessions)
    }

    /// Every session the backend knows about, ended ones included
    pub async fn all_sessions(&self) -> Result<Vec<SessionRecord>, ApiError> {
        self.get::<SessionsEnvelope>("/api/sessions")
            .await
            .map(|envelope| envelope.sessions)
    }

    pub async fn end_session(&self, session_id: i64) -> Result<(), ApiError> {
        let builder = self.authorized(
            self.http
                .post(self.url(&format!("/api/sessions/{session_id}/end"))),
        )?;
        self.send::<serde_json::Value>(builder).await?;
        info!(session_id, "session ended");
        Ok(())
    }

    pub async fn start_session(
        &self,
        request: &StartSessionRequest,
    ) -> Result<Option<SessionRecord>, ApiError> {
        let builder = self.authorized(self.http.post(self.url("/api/sessions")))?;
        let envelope: SessionEnvelope = self.send(builder.json(request)).await?;
        info!(
            user_id = request.user_id,
            machine_id = request.machine_id,
            "session started"
        );
        Ok(envelope.session)
    }

    pub async fn machines(&self) -> Result<Vec<Machine>, ApiError> {
        self.get::<MachinesEnvelope>("/api/machines")
            .await
            .map(|envelope| envelope.machines)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/api/dashboard/stats").await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        match self.get::<TransactionsEnvelope>("/api/transactions").await {
            Ok(envelope) => Ok(envelope.transactions),
            Err(ApiError::Status { status: 404, .. }) => {
                warn!("transactions endpoint not available");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}
