//! Attendance Load Driver Library
//!
//! This module exports the driver components for use by the binary and in
//! integration tests.

pub mod client;
pub mod config;
pub mod protocol;
pub mod report;
pub mod scenario;
pub mod stats;

// Re-export commonly used types
pub use client::{ApiError, AttendanceApi, HttpAttendanceClient, SessionToken};
pub use config::{Config, ConfigError};
pub use report::{ReportError, install_prometheus_recorder, publish};
pub use scenario::{Check, LoadRunner, SetupError};
pub use stats::{RunResults, RunSummary};
