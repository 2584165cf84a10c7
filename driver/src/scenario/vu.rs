//! Virtual user: one concurrent client running the attendance iteration

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, histogram};
use reqwest::StatusCode;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::check::Check;
use crate::client::{ApiError, AttendanceApi, SessionToken};
use crate::config::FixtureConfig;
use crate::protocol::{
    AttendanceRequest, CheckOutRequest, Endpoint, OvertimeRequest, ReimbursementRequest,
};
use crate::stats::CheckCounters;

/// Events streamed from VUs to the collector
#[derive(Debug)]
pub enum VuEvent {
    Request {
        endpoint: Endpoint,
        latency: Duration,
        status: Option<u16>,
    },
    IterationComplete { latency: Duration },
}

/// When a VU stops starting new iterations
#[derive(Debug, Clone)]
pub struct VuLimits {
    pub deadline: Instant,
    pub max_iterations: Option<u64>,
    pub pause: Duration,
}

pub struct VirtualUser {
    id: usize,
    api: Arc<dyn AttendanceApi>,
    token: Arc<SessionToken>,
    fixture: Arc<FixtureConfig>,
    counters: Arc<CheckCounters>,
    events: mpsc::Sender<VuEvent>,
}

impl VirtualUser {
    pub fn new(
        id: usize,
        api: Arc<dyn AttendanceApi>,
        token: Arc<SessionToken>,
        fixture: Arc<FixtureConfig>,
        counters: Arc<CheckCounters>,
        events: mpsc::Sender<VuEvent>,
    ) -> Self {
        Self {
            id,
            api,
            token,
            fixture,
            counters,
            events,
        }
    }

    /// Loop iterations until the deadline, the iteration cap, or a stop request
    ///
    /// Returns the number of completed iterations.
    pub async fn run(self, limits: VuLimits, stop: watch::Receiver<bool>) -> u64 {
        let mut completed = 0u64;
        debug!("VU {} started", self.id);

        loop {
            let stop_requested = *stop.borrow();
            if stop_requested
                || Instant::now() >= limits.deadline
                || limits.max_iterations.is_some_and(|max| completed >= max)
            {
                break;
            }

            let start = Instant::now();
            self.run_iteration(limits.pause).await;
            completed += 1;

            counter!("attendance_load_iterations_total").increment(1);
            let _ = self
                .events
                .send(VuEvent::IterationComplete {
                    latency: start.elapsed(),
                })
                .await;
        }

        debug!("VU {} finished after {} iteration(s)", self.id, completed);
        completed
    }

    /// One pass over the four calls, each followed by a pause
    ///
    /// A failed check never skips the remaining calls.
    pub async fn run_iteration(&self, pause: Duration) {
        let token: &SessionToken = &self.token;

        let body = AttendanceRequest::from_fixture(&self.fixture);
        let start = Instant::now();
        let result = self.api.check_in(token, &body).await;
        self.record(Check::CheckIn, start.elapsed(), result).await;
        tokio::time::sleep(pause).await;

        let body = CheckOutRequest::from_fixture(&self.fixture, Utc::now());
        let start = Instant::now();
        let result = self.api.check_out(token, &body).await;
        self.record(Check::CheckOut, start.elapsed(), result).await;
        tokio::time::sleep(pause).await;

        let body = OvertimeRequest::from_fixture(&self.fixture, Utc::now());
        let start = Instant::now();
        let result = self.api.request_overtime(token, &body).await;
        self.record(Check::Overtime, start.elapsed(), result).await;
        tokio::time::sleep(pause).await;

        let body = ReimbursementRequest::from_fixture(&self.fixture);
        let start = Instant::now();
        let result = self.api.submit_reimbursement(token, &body).await;
        self.record(Check::Reimbursement, start.elapsed(), result).await;
        tokio::time::sleep(pause).await;
    }

    async fn record(
        &self,
        check: Check,
        latency: Duration,
        result: Result<StatusCode, ApiError>,
    ) {
        let endpoint = check.endpoint();
        let passed = check.evaluate(&result);
        self.counters.record(check, passed);

        counter!(
            "attendance_load_checks_total",
            "check" => check.name(),
            "result" => if passed { "pass" } else { "fail" }
        )
        .increment(1);
        histogram!(
            "attendance_load_http_req_duration_seconds",
            "endpoint" => endpoint.label()
        )
        .record(latency);

        let status = match result {
            Ok(status) => {
                if !passed {
                    debug!(
                        "VU {}: check {:?} failed with HTTP {}",
                        self.id,
                        check.name(),
                        status
                    );
                }
                Some(status.as_u16())
            }
            Err(e) => {
                warn!(
                    "VU {}: {} {} failed: {}",
                    self.id,
                    endpoint.method(),
                    endpoint.path(),
                    e
                );
                None
            }
        };

        let _ = self
            .events
            .send(VuEvent::Request {
                endpoint,
                latency,
                status,
            })
            .await;
    }
}
