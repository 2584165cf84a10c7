//! AttendanceApi trait definition

use async_trait::async_trait;
use reqwest::StatusCode;

use super::types::{ApiError, SessionToken};
use crate::protocol::{
    AttendanceRequest, CheckOutRequest, LoginRequest, OvertimeRequest, ReimbursementRequest,
};

/// Calls the load scenario makes against the attendance API
///
/// Scenario calls return the response status; an `Err` means no status was
/// obtained at all (connection refused, timeout, broken body).
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Authenticate and return the bearer token
    async fn login(&self, request: &LoginRequest) -> Result<SessionToken, ApiError>;

    async fn check_in(
        &self,
        token: &SessionToken,
        body: &AttendanceRequest,
    ) -> Result<StatusCode, ApiError>;

    async fn check_out(
        &self,
        token: &SessionToken,
        body: &CheckOutRequest,
    ) -> Result<StatusCode, ApiError>;

    async fn request_overtime(
        &self,
        token: &SessionToken,
        body: &OvertimeRequest,
    ) -> Result<StatusCode, ApiError>;

    async fn submit_reimbursement(
        &self,
        token: &SessionToken,
        body: &ReimbursementRequest,
    ) -> Result<StatusCode, ApiError>;
}
