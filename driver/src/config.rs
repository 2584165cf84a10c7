//! Driver configuration
//!
//! Configuration is loaded from environment variables layered over defaults.
//! The defaults reproduce a 10 VU / 30 second run against a local API using the
//! seeded `employee1` fixture account.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on concurrent virtual users
pub const MAX_VUS: usize = 10_000;

/// Upper bound on the run duration and on the graceful-stop window
pub const MAX_RUN_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors raised when the loaded configuration cannot drive a run
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Virtual user count must be at least 1")]
    NoVirtualUsers,

    #[error("Virtual user count {vus} exceeds the maximum of {max}")]
    TooManyVirtualUsers { vus: usize, max: usize },

    #[error("Run duration must be greater than zero")]
    ZeroDuration,

    #[error("{field} of {value:?} exceeds the maximum of {max:?}")]
    DurationTooLong {
        field: &'static str,
        value: Duration,
        max: Duration,
    },

    #[error("Iteration cap must be at least 1 when set")]
    ZeroIterations,

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Check threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f64),
}

/// Main driver configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the attendance API
    pub base_url: String,

    /// Run shape (VUs, duration, pacing)
    pub run: RunConfig,

    /// Login credentials for the setup phase
    pub credentials: Credentials,

    /// Fixture values sent in every request body
    pub fixture: FixtureConfig,

    /// Result reporting
    pub report: ReportConfig,
}

/// Run-shape configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of concurrent virtual users
    pub vus: usize,
    /// Wall-clock duration during which VUs start new iterations
    pub duration: Duration,
    /// Optional cap on iterations per VU
    pub iterations: Option<u64>,
    /// Window after the deadline for in-flight iterations to finish
    pub graceful_stop: Duration,
    /// Unconditional pause after each request
    pub pause: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

/// Setup credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Request body fixture values
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureConfig {
    pub user_id: i64,
    pub attendance_period_id: i64,
    pub overtime_hours: i64,
    pub reimbursement_title: String,
    pub reimbursement_amount: i64,
}

/// Reporting configuration
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Minimum overall check pass rate (0.0 to 1.0)
    pub check_threshold: Option<f64>,
    /// Write the JSON summary here instead of stdout
    pub summary_path: Option<PathBuf>,
    /// Write Prometheus text-format metrics here at the end of the run
    pub prometheus_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            run: RunConfig::default(),
            credentials: Credentials::default(),
            fixture: FixtureConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            vus: 10,
            duration: Duration::from_secs(30),
            iterations: None,
            graceful_stop: Duration::from_secs(30),
            pause: Duration::from_secs(1),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "employee1".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            user_id: 1,
            attendance_period_id: 1,
            overtime_hours: 2,
            reimbursement_title: "Meal Allowance".to_string(),
            reimbursement_amount: 30000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LOAD_BASE_URL")
            && !url.is_empty()
        {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        // Run config
        if let Some(val) = lookup("LOAD_VUS")
            && let Ok(v) = val.parse()
        {
            config.run.vus = v;
        }
        if let Some(val) = lookup("LOAD_DURATION_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.run.duration = Duration::from_secs(secs);
        }
        if let Some(val) = lookup("LOAD_ITERATIONS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.run.iterations = Some(n);
        }
        if let Some(val) = lookup("LOAD_GRACEFUL_STOP_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.run.graceful_stop = Duration::from_secs(secs);
        }
        if let Some(val) = lookup("LOAD_PAUSE_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.run.pause = Duration::from_millis(ms);
        }
        if let Some(val) = lookup("LOAD_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.run.request_timeout = Duration::from_secs(secs);
        }

        // Credentials
        if let Some(username) = lookup("LOAD_USERNAME") {
            config.credentials.username = username;
        }
        if let Some(password) = lookup("LOAD_PASSWORD") {
            config.credentials.password = password;
        }

        // Fixture
        if let Some(val) = lookup("LOAD_USER_ID")
            && let Ok(v) = val.parse()
        {
            config.fixture.user_id = v;
        }
        if let Some(val) = lookup("LOAD_ATTENDANCE_PERIOD_ID")
            && let Ok(v) = val.parse()
        {
            config.fixture.attendance_period_id = v;
        }
        if let Some(val) = lookup("LOAD_OVERTIME_HOURS")
            && let Ok(v) = val.parse()
        {
            config.fixture.overtime_hours = v;
        }
        if let Some(title) = lookup("LOAD_REIMBURSEMENT_TITLE")
            && !title.is_empty()
        {
            config.fixture.reimbursement_title = title;
        }
        if let Some(val) = lookup("LOAD_REIMBURSEMENT_AMOUNT")
            && let Ok(v) = val.parse()
        {
            config.fixture.reimbursement_amount = v;
        }

        // Report config
        if let Some(val) = lookup("LOAD_CHECK_THRESHOLD")
            && let Ok(rate) = val.parse::<f64>()
        {
            config.report.check_threshold = Some(rate);
        }
        if let Some(path) = lookup("LOAD_SUMMARY_PATH")
            && !path.is_empty()
        {
            config.report.summary_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LOAD_PROMETHEUS_PATH")
            && !path.is_empty()
        {
            config.report.prometheus_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.vus == 0 {
            return Err(ConfigError::NoVirtualUsers);
        }
        if self.run.vus > MAX_VUS {
            return Err(ConfigError::TooManyVirtualUsers {
                vus: self.run.vus,
                max: MAX_VUS,
            });
        }
        if self.run.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        for (field, value) in [
            ("Run duration", self.run.duration),
            ("Graceful stop", self.run.graceful_stop),
        ] {
            if value > MAX_RUN_DURATION {
                return Err(ConfigError::DurationTooLong {
                    field,
                    value,
                    max: MAX_RUN_DURATION,
                });
            }
        }
        if self.run.iterations == Some(0) {
            return Err(ConfigError::ZeroIterations);
        }
        if let Err(e) = reqwest::Url::parse(&self.base_url) {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            });
        }
        if let Some(rate) = self.report.check_threshold
            && !(0.0..=1.0).contains(&rate)
        {
            return Err(ConfigError::InvalidThreshold(rate));
        }
        Ok(())
    }

}
