//! reqwest-backed implementation of `AttendanceApi`

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::service::AttendanceApi;
use super::types::{ApiError, SessionToken};
use crate::config::Config;
use crate::protocol::{
    AttendanceRequest, CheckOutRequest, Endpoint, LoginRequest, OvertimeRequest,
    ReimbursementRequest,
};

/// HTTP client for the attendance API
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpAttendanceClient {
    http: Client,
    base_url: String,
}

impl HttpAttendanceClient {
    /// Build a client sized for the configured number of virtual users
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .pool_max_idle_per_host(config.run.vus.max(1))
            .timeout(config.run.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send an authorized JSON request and return its status
    ///
    /// The response body is drained so the connection can go back to the pool.
    async fn send_json<T: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        token: &SessionToken,
        body: &T,
    ) -> Result<StatusCode, ApiError> {
        let response = self
            .http
            .request(endpoint.method(), self.url(endpoint))
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let _ = response.bytes().await?;
        debug!("{} {} -> {}", endpoint.method(), endpoint.path(), status);
        Ok(status)
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceClient {
    async fn login(&self, request: &LoginRequest) -> Result<SessionToken, ApiError> {
        let response = self
            .http
            .request(Endpoint::Login.method(), self.url(Endpoint::Login))
            .json(request)
            .send()
            .await?;

        // Only the body decides whether setup succeeded
        let status = response.status();
        if !status.is_success() {
            warn!("Login returned HTTP {}", status);
        }

        let body = response.text().await?;
        SessionToken::from_login_body(&body)
    }

    async fn check_in(
        &self,
        token: &SessionToken,
        body: &AttendanceRequest,
    ) -> Result<StatusCode, ApiError> {
        self.send_json(Endpoint::CheckIn, token, body).await
    }

    async fn check_out(
        &self,
        token: &SessionToken,
        body: &CheckOutRequest,
    ) -> Result<StatusCode, ApiError> {
        self.send_json(Endpoint::CheckOut, token, body).await
    }

    async fn request_overtime(
        &self,
        token: &SessionToken,
        body: &OvertimeRequest,
    ) -> Result<StatusCode, ApiError> {
        self.send_json(Endpoint::Overtime, token, body).await
    }

    async fn submit_reimbursement(
        &self,
        token: &SessionToken,
        body: &ReimbursementRequest,
    ) -> Result<StatusCode, ApiError> {
        self.send_json(Endpoint::Reimbursement, token, body).await
    }
}
