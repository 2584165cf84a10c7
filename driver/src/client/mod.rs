//! Attendance API client
//!
//! This module provides:
//! - `AttendanceApi` trait for abstracting the API under load
//! - `HttpAttendanceClient` for driving a real server over HTTP
//! - `SessionToken` and `ApiError`

mod http;
mod service;
mod types;

pub use http::HttpAttendanceClient;
pub use service::AttendanceApi;
pub use types::{ApiError, SessionToken};
