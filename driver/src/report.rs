//! Publishing a finished run
//!
//! Prints the text report, writes the JSON summary and the Prometheus
//! snapshot where configured, and turns a missed check threshold into an
//! error so the binary exits non-zero.

use std::path::{Path, PathBuf};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing::info;

use crate::config::ReportConfig;
use crate::stats::RunSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to install Prometheus recorder: {0}")]
    Recorder(#[from] BuildError),

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Check pass rate {:.2}% is below threshold {:.2}%", .rate * 100.0, .threshold * 100.0)]
    ThresholdNotMet { rate: f64, threshold: f64 },
}

/// Install the global Prometheus recorder when an export path is configured
///
/// Must run before any metric is recorded.
pub fn install_prometheus_recorder(
    report: &ReportConfig,
) -> Result<Option<PrometheusHandle>, ReportError> {
    if report.prometheus_path.is_none() {
        return Ok(None);
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(Some(handle))
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Emit every configured output for `summary`, then apply the threshold
///
/// Outputs are written even when the threshold fails.
pub fn publish(
    summary: &RunSummary,
    report: &ReportConfig,
    prometheus: Option<&PrometheusHandle>,
) -> Result<(), ReportError> {
    println!("{}", summary.report());

    let json = summary.to_json()?;
    match report.summary_path {
        Some(ref path) => {
            write_file(path, &json)?;
            info!("Summary written to {:?}", path);
        }
        None => println!("JSON: {}", json),
    }

    if let (Some(handle), Some(path)) = (prometheus, &report.prometheus_path) {
        write_file(path, &handle.render())?;
        info!("Prometheus metrics written to {:?}", path);
    }

    match summary.check_threshold {
        Some(threshold) if !summary.passed => Err(ReportError::ThresholdNotMet {
            rate: summary.check_pass_rate,
            threshold,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Check;
    use crate::stats::{CheckTally, RunResults};
    use metrics::counter;
    use tempfile::TempDir;

    fn summary_with(passes: u64, fails: u64, threshold: Option<f64>) -> RunSummary {
        let mut results = RunResults::new(1);
        results.checks = Check::ALL
            .iter()
            .map(|c| (*c, CheckTally { passes, fails }))
            .collect();
        RunSummary::from_results(&results, threshold)
    }

    #[test]
    fn test_summary_written_to_configured_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        let report = ReportConfig {
            summary_path: Some(path.clone()),
            ..Default::default()
        };

        publish(&summary_with(3, 0, None), &report, None).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["passed"], true);
        assert_eq!(json["checks"][0]["passes"], 3);
    }

    #[test]
    fn test_threshold_not_met_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        let report = ReportConfig {
            check_threshold: Some(0.9),
            summary_path: Some(path.clone()),
            ..Default::default()
        };

        let err = publish(&summary_with(1, 1, Some(0.9)), &report, None).unwrap_err();
        match err {
            ReportError::ThresholdNotMet { rate, threshold } => {
                assert!((rate - 0.5).abs() < 1e-9);
                assert_eq!(threshold, 0.9);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The summary is still written for a failed run
        assert!(path.exists());
    }

    #[test]
    fn test_threshold_met_or_absent_is_ok() {
        let report = ReportConfig::default();
        assert!(publish(&summary_with(9, 1, Some(0.9)), &report, None).is_ok());
        assert!(publish(&summary_with(0, 5, None), &report, None).is_ok());
    }

    #[test]
    fn test_prometheus_snapshot_written() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            counter!("attendance_load_iterations_total").increment(4);
        });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.prom");
        let report = ReportConfig {
            summary_path: Some(dir.path().join("summary.json")),
            prometheus_path: Some(path.clone()),
            ..Default::default()
        };

        publish(&summary_with(1, 0, None), &report, Some(&handle)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("attendance_load_iterations_total 4"));
    }

    #[test]
    fn test_unwritable_summary_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let report = ReportConfig {
            summary_path: Some(dir.path().join("missing").join("summary.json")),
            ..Default::default()
        };

        let err = publish(&summary_with(1, 0, None), &report, None).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }

    #[test]
    fn test_no_recorder_without_prometheus_path() {
        let handle = install_prometheus_recorder(&ReportConfig::default()).unwrap();
        assert!(handle.is_none());
    }
}
