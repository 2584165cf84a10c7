use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FixtureConfig;

/// Login body for the setup phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body
///
/// Only `token` is read; any other fields the server sends are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Check-in body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRequest {
    pub user_id: i64,
    pub attendance_period_id: i64,
}

/// Check-out body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckOutRequest {
    pub user_id: i64,
    pub attendance_period_id: i64,
    /// UTC timestamp, millisecond precision, `Z` suffix
    pub check_out_at: String,
}

/// Overtime body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OvertimeRequest {
    pub user_id: i64,
    pub attendance_period_id: i64,
    /// Calendar date, `YYYY-MM-DD`
    pub date: NaiveDate,
    pub hours: i64,
}

/// Reimbursement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReimbursementRequest {
    pub user_id: i64,
    pub attendance_period_id: i64,
    pub title: String,
    pub amount: i64,
}

impl AttendanceRequest {
    pub fn from_fixture(fixture: &FixtureConfig) -> Self {
        Self {
            user_id: fixture.user_id,
            attendance_period_id: fixture.attendance_period_id,
        }
    }
}

impl CheckOutRequest {
    pub fn from_fixture(fixture: &FixtureConfig, now: DateTime<Utc>) -> Self {
        Self {
            user_id: fixture.user_id,
            attendance_period_id: fixture.attendance_period_id,
            check_out_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl OvertimeRequest {
    pub fn from_fixture(fixture: &FixtureConfig, now: DateTime<Utc>) -> Self {
        Self {
            user_id: fixture.user_id,
            attendance_period_id: fixture.attendance_period_id,
            date: now.date_naive(),
            hours: fixture.overtime_hours,
        }
    }
}

impl ReimbursementRequest {
    pub fn from_fixture(fixture: &FixtureConfig) -> Self {
        Self {
            user_id: fixture.user_id,
            attendance_period_id: fixture.attendance_period_id,
            title: fixture.reimbursement_title.clone(),
            amount: fixture.reimbursement_amount,
        }
    }
}
