//! End-of-run summary in text and JSON form

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{LatencyStats, RunResults, percentile_of};

/// Latency distribution in milliseconds
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub med_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    fn from_stats(stats: &LatencyStats) -> Option<Self> {
        let sorted = stats.sorted();
        let ms = |d: Option<Duration>| d.map(|d| d.as_secs_f64() * 1000.0);
        let pct = |p: f64| ms(percentile_of(&sorted, p));
        Some(Self {
            min_ms: ms(sorted.first().copied())?,
            avg_ms: ms(stats.mean())?,
            med_ms: pct(50.0)?,
            p90_ms: pct(90.0)?,
            p95_ms: pct(95.0)?,
            p99_ms: pct(99.0)?,
            max_ms: ms(sorted.last().copied())?,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckSummary {
    pub name: &'static str,
    pub passes: u64,
    pub fails: u64,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EndpointSummary {
    pub endpoint: &'static str,
    pub method: String,
    pub path: &'static str,
    pub requests: u64,
    pub transport_errors: u64,
    pub statuses: std::collections::BTreeMap<u16, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySummary>,
}

/// Serializable digest of `RunResults`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub vus: usize,
    pub setup_ms: f64,
    pub iterations: u64,
    pub iteration_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_duration: Option<LatencySummary>,
    pub interrupted_vus: u64,
    pub check_pass_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_threshold: Option<f64>,
    pub passed: bool,
    pub checks: Vec<CheckSummary>,
    pub endpoints: Vec<EndpointSummary>,
}

impl RunSummary {
    pub fn from_results(results: &RunResults, check_threshold: Option<f64>) -> Self {
        let checks = results
            .checks
            .iter()
            .map(|(check, tally)| CheckSummary {
                name: check.name(),
                passes: tally.passes,
                fails: tally.fails,
                pass_rate: if tally.total() > 0 {
                    tally.passes as f64 / tally.total() as f64
                } else {
                    0.0
                },
            })
            .collect();

        let endpoints = results
            .endpoints
            .iter()
            .map(|(endpoint, stats)| EndpointSummary {
                endpoint: endpoint.label(),
                method: endpoint.method().to_string(),
                path: endpoint.path(),
                requests: stats.requests,
                transport_errors: stats.transport_errors,
                statuses: stats.statuses.clone(),
                latency: LatencySummary::from_stats(&stats.latencies),
            })
            .collect();

        Self {
            run_id: results.run_id,
            started_at: results.started_at,
            duration_secs: results.duration.as_secs_f64(),
            vus: results.vus,
            setup_ms: results.setup_latency.as_secs_f64() * 1000.0,
            iterations: results.iterations,
            iteration_rate: results.iteration_rate(),
            iteration_duration: LatencySummary::from_stats(&results.iteration_latencies),
            interrupted_vus: results.interrupted_vus,
            check_pass_rate: results.check_pass_rate(),
            check_threshold,
            passed: results.meets_threshold(check_threshold),
            checks,
            endpoints,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str(&format!(" RUN {}\n", self.run_id));
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!("   VUs:          {}\n", self.vus));
        report.push_str(&format!("   Duration:     {:.2}s\n", self.duration_secs));
        report.push_str(&format!("   Setup:        {:.1}ms\n", self.setup_ms));
        report.push_str(&format!(
            "   Iterations:   {} ({:.2}/s)\n",
            self.iterations, self.iteration_rate
        ));
        if let Some(ref it) = self.iteration_duration {
            report.push_str(&format!(
                "   Iter time:    avg={:.1}ms p95={:.1}ms max={:.1}ms\n",
                it.avg_ms, it.p95_ms, it.max_ms
            ));
        }
        if self.interrupted_vus > 0 {
            report.push_str(&format!(
                "   Interrupted:  {} VU(s) past graceful stop\n",
                self.interrupted_vus
            ));
        }

        report.push_str("\n ─── Checks ──────────────────────────────────────────────────\n\n");
        for check in &self.checks {
            let mark = if check.fails == 0 { "✓" } else { "✗" };
            report.push_str(&format!(
                "   {} {:26} {:>6.2}%  ✓ {:<8} ✗ {}\n",
                mark,
                check.name,
                check.pass_rate * 100.0,
                check.passes,
                check.fails
            ));
        }
        report.push_str(&format!(
            "\n   checks: {:.2}%\n",
            self.check_pass_rate * 100.0
        ));

        report.push_str("\n ─── Requests ────────────────────────────────────────────────\n\n");
        report.push_str(&format!(
            "   {:14} {:>8} {:>8} {:>9} {:>9} {:>9}\n",
            "Endpoint", "Reqs", "NoResp", "Med", "P95", "P99"
        ));
        for ep in &self.endpoints {
            let (med, p95, p99) = match ep.latency {
                Some(ref l) => (
                    format!("{:.1}ms", l.med_ms),
                    format!("{:.1}ms", l.p95_ms),
                    format!("{:.1}ms", l.p99_ms),
                ),
                None => ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()),
            };
            report.push_str(&format!(
                "   {:14} {:>8} {:>8} {:>9} {:>9} {:>9}\n",
                ep.endpoint, ep.requests, ep.transport_errors, med, p95, p99
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");
        let overall = match self.check_threshold {
            Some(min) if self.passed => format!("PASS (checks >= {:.2}%)", min * 100.0),
            Some(min) => format!("FAIL (checks < {:.2}%)", min * 100.0),
            None => "DONE (no threshold)".to_string(),
        };
        report.push_str(&format!(" OVERALL: {}\n", overall));
        report.push_str("═══════════════════════════════════════════════════════════════\n");

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Endpoint;
    use crate::scenario::Check;
    use crate::stats::CheckTally;

    fn sample_results() -> RunResults {
        let mut results = RunResults::new(2);
        results.duration = Duration::from_secs(4);
        results.record_iteration(Duration::from_millis(40));
        results.record_iteration(Duration::from_millis(60));
        results.record_request(Endpoint::CheckIn, Duration::from_millis(10), Some(200));
        results.record_request(Endpoint::CheckIn, Duration::from_millis(20), Some(500));
        results.checks = vec![
            (Check::CheckIn, CheckTally { passes: 1, fails: 1 }),
            (Check::CheckOut, CheckTally { passes: 2, fails: 0 }),
            (Check::Overtime, CheckTally { passes: 2, fails: 0 }),
            (Check::Reimbursement, CheckTally { passes: 2, fails: 0 }),
        ];
        results
    }

    #[test]
    fn test_summary_from_results() {
        let summary = RunSummary::from_results(&sample_results(), Some(0.9));

        assert_eq!(summary.iterations, 2);
        assert!((summary.iteration_rate - 0.5).abs() < 1e-9);
        assert!((summary.check_pass_rate - 0.875).abs() < 1e-9);
        assert!(!summary.passed);
        assert_eq!(summary.checks[0].name, "check-in success");
        assert!((summary.checks[0].pass_rate - 0.5).abs() < 1e-9);

        let iter = summary.iteration_duration.as_ref().unwrap();
        assert!((iter.min_ms - 40.0).abs() < 1e-9);
        assert!((iter.avg_ms - 50.0).abs() < 1e-9);
        assert!((iter.p99_ms - 60.0).abs() < 1e-9);
        assert!((iter.max_ms - 60.0).abs() < 1e-9);

        let checkin = &summary.endpoints[0];
        assert_eq!(checkin.endpoint, "checkin");
        assert_eq!(checkin.method, "POST");
        assert_eq!(checkin.requests, 2);
        assert_eq!(checkin.statuses.get(&500), Some(&1));
    }

    #[test]
    fn test_summary_json_and_report() {
        let summary = RunSummary::from_results(&sample_results(), None);
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(json["vus"], 2);
        assert_eq!(json["passed"], true);
        assert!(json.get("check_threshold").is_none());
        assert_eq!(json["checks"][1]["name"], "check-out success");
        assert_eq!(json["endpoints"][0]["statuses"]["200"], 1);

        let report = summary.report();
        assert!(report.contains("check-in success"));
        assert!(report.contains("checks: 87.50%"));
        assert!(report.contains("DONE (no threshold)"));
    }
}
