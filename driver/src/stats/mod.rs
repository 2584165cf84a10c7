//! Run statistics
//!
//! VUs bump shared atomic check counters directly and stream request timings
//! to the collector, which folds them into `RunResults`.

mod summary;

pub use summary::{CheckSummary, EndpointSummary, LatencySummary, RunSummary};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::protocol::Endpoint;
use crate::scenario::Check;

/// Latency samples for one series
#[derive(Debug, Default, Clone)]
pub struct LatencyStats {
    pub samples: Vec<Duration>,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in ascending order
    pub fn sorted(&self) -> Vec<Duration> {
        let mut sorted = self.samples.clone();
        sorted.sort();
        sorted
    }

    /// Calculate percentile (0-100)
    ///
    /// Sorts on every call; use `percentile_of` over `sorted()` when reading
    /// several percentiles of the same series.
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        percentile_of(&self.sorted(), p)
    }

    pub fn p50(&self) -> Option<Duration> {
        self.percentile(50.0)
    }

    pub fn p90(&self) -> Option<Duration> {
        self.percentile(90.0)
    }

    pub fn p95(&self) -> Option<Duration> {
        self.percentile(95.0)
    }

    pub fn p99(&self) -> Option<Duration> {
        self.percentile(99.0)
    }

    pub fn min(&self) -> Option<Duration> {
        self.samples.iter().min().copied()
    }

    pub fn max(&self) -> Option<Duration> {
        self.samples.iter().max().copied()
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }
}

/// Percentile (0-100) of already-sorted samples
pub fn percentile_of(sorted: &[Duration], p: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Pass/fail totals for one check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTally {
    pub passes: u64,
    pub fails: u64,
}

impl CheckTally {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// Lock-free check counters shared by all VUs
#[derive(Debug, Default)]
pub struct CheckCounters {
    passes: [AtomicU64; 4],
    fails: [AtomicU64; 4],
}

impl CheckCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, check: Check, passed: bool) {
        let slot = if passed { &self.passes } else { &self.fails };
        slot[check.index()].fetch_add(1, Ordering::SeqCst);
    }

    pub fn tally(&self, check: Check) -> CheckTally {
        CheckTally {
            passes: self.passes[check.index()].load(Ordering::SeqCst),
            fails: self.fails[check.index()].load(Ordering::SeqCst),
        }
    }

    /// Tallies in scenario order
    pub fn snapshot(&self) -> Vec<(Check, CheckTally)> {
        Check::ALL.iter().map(|c| (*c, self.tally(*c))).collect()
    }
}

/// Per-endpoint request statistics
#[derive(Debug, Default, Clone)]
pub struct EndpointStats {
    pub requests: u64,
    /// Requests that produced no HTTP status (transport errors)
    pub transport_errors: u64,
    /// Response count by status code
    pub statuses: BTreeMap<u16, u64>,
    pub latencies: LatencyStats,
}

impl EndpointStats {
    pub fn record(&mut self, latency: Duration, status: Option<u16>) {
        self.requests += 1;
        self.latencies.record(latency);
        match status {
            Some(code) => *self.statuses.entry(code).or_insert(0) += 1,
            None => self.transport_errors += 1,
        }
    }
}

/// Results of one complete run
#[derive(Debug)]
pub struct RunResults {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub vus: usize,
    /// Wall-clock time from the first VU spawn to the last VU stopping
    ///
    /// Excludes setup; see `setup_latency`.
    pub duration: Duration,
    pub setup_latency: Duration,
    pub iterations: u64,
    pub iteration_latencies: LatencyStats,
    /// VUs still running at the end of the graceful-stop window
    pub interrupted_vus: u64,
    pub checks: Vec<(Check, CheckTally)>,
    pub endpoints: BTreeMap<Endpoint, EndpointStats>,
}

impl RunResults {
    pub fn new(vus: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            vus,
            duration: Duration::ZERO,
            setup_latency: Duration::ZERO,
            iterations: 0,
            iteration_latencies: LatencyStats::new(),
            interrupted_vus: 0,
            checks: Check::ALL
                .iter()
                .map(|c| (*c, CheckTally::default()))
                .collect(),
            endpoints: BTreeMap::new(),
        }
    }

    pub fn record_request(&mut self, endpoint: Endpoint, latency: Duration, status: Option<u16>) {
        self.endpoints
            .entry(endpoint)
            .or_default()
            .record(latency, status);
    }

    pub fn record_iteration(&mut self, latency: Duration) {
        self.iterations += 1;
        self.iteration_latencies.record(latency);
    }

    pub fn tally(&self, check: Check) -> CheckTally {
        self.checks
            .iter()
            .find(|(c, _)| *c == check)
            .map(|(_, t)| *t)
            .unwrap_or_default()
    }

    pub fn total_checks(&self) -> u64 {
        self.checks.iter().map(|(_, t)| t.total()).sum()
    }

    /// Overall check pass rate as a fraction (0.0 to 1.0)
    ///
    /// A run that evaluated no checks has a pass rate of 0.0.
    pub fn check_pass_rate(&self) -> f64 {
        let total = self.total_checks();
        if total == 0 {
            return 0.0;
        }
        let passes: u64 = self.checks.iter().map(|(_, t)| t.passes).sum();
        passes as f64 / total as f64
    }

    /// Whether the run meets an optional minimum check pass rate
    pub fn meets_threshold(&self, threshold: Option<f64>) -> bool {
        match threshold {
            Some(min) => self.check_pass_rate() >= min,
            None => true,
        }
    }

    /// Completed iterations per second
    pub fn iteration_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.iterations as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}
