//! Load run orchestration: setup, VU fan-out, collection, graceful stop

use std::sync::Arc;

use metrics::{counter, histogram};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::vu::{VirtualUser, VuEvent, VuLimits};
use crate::client::{ApiError, AttendanceApi, HttpAttendanceClient, SessionToken};
use crate::config::{Config, ConfigError};
use crate::protocol::LoginRequest;
use crate::stats::{CheckCounters, RunResults};

/// Capacity of the VU -> collector event channel
const EVENT_CHANNEL_CAPACITY: usize = 10_000;

/// Fatal errors raised before any VU starts
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup login failed: {0}")]
    Login(#[from] ApiError),
}

/// Drives a complete load run against an `AttendanceApi`
pub struct LoadRunner {
    config: Config,
    api: Arc<dyn AttendanceApi>,
}

impl LoadRunner {
    pub fn new(config: Config, api: Arc<dyn AttendanceApi>) -> Self {
        Self { config, api }
    }

    /// Runner over HTTP using the configured base URL
    pub fn over_http(config: Config) -> Result<Self, ApiError> {
        let client = HttpAttendanceClient::new(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One-time login producing the token shared by every VU
    pub async fn setup(&self) -> Result<SessionToken, SetupError> {
        let request = LoginRequest {
            username: self.config.credentials.username.clone(),
            password: self.config.credentials.password.clone(),
        };

        info!(
            "Logging in as {} at {}",
            request.username, self.config.base_url
        );
        let start = Instant::now();
        let result = self.api.login(&request).await;
        histogram!("attendance_load_setup_duration_seconds").record(start.elapsed());

        match result {
            Ok(token) => Ok(token),
            Err(e) => {
                counter!("attendance_load_setup_failures_total").increment(1);
                Err(SetupError::Login(e))
            }
        }
    }

    /// Run to completion with no external stop signal
    pub async fn run(&self) -> Result<RunResults, SetupError> {
        let (_stop_tx, stop_rx) = watch::channel(false);
        self.run_until(stop_rx).await
    }

    /// Run until the duration elapses, every VU hits its iteration cap, or
    /// `stop` flips to `true`
    ///
    /// The configuration is validated before login, and setup always
    /// completes before the first VU is spawned. After the deadline (or a
    /// stop request) in-flight iterations get the graceful-stop window; VUs
    /// still running after it are aborted.
    pub async fn run_until(
        &self,
        mut stop: watch::Receiver<bool>,
    ) -> Result<RunResults, SetupError> {
        self.config.validate()?;
        let run_config = &self.config.run;
        let mut results = RunResults::new(run_config.vus);

        let setup_start = Instant::now();
        let token = Arc::new(self.setup().await?);
        results.setup_latency = setup_start.elapsed();
        info!("Setup complete in {:?}", results.setup_latency);

        let start = Instant::now();
        let limits = VuLimits {
            deadline: start + run_config.duration,
            max_iterations: run_config.iterations,
            pause: run_config.pause,
        };
        let counters = Arc::new(CheckCounters::new());
        let fixture = Arc::new(self.config.fixture.clone());
        let (tx, mut rx) = mpsc::channel::<VuEvent>(EVENT_CHANNEL_CAPACITY);

        info!(
            "Starting {} VU(s) for {:?} (iterations per VU: {})",
            run_config.vus,
            run_config.duration,
            run_config
                .iterations
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );

        let mut handles = Vec::with_capacity(run_config.vus);
        for id in 0..run_config.vus {
            let vu = VirtualUser::new(
                id,
                self.api.clone(),
                token.clone(),
                fixture.clone(),
                counters.clone(),
                tx.clone(),
            );
            handles.push(tokio::spawn(vu.run(limits.clone(), stop.clone())));
        }

        // Drop the original sender so rx completes when all VUs are done
        drop(tx);

        let hard_stop = tokio::time::sleep_until(limits.deadline + run_config.graceful_stop);
        tokio::pin!(hard_stop);
        let mut watching_stop = true;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => apply_event(&mut results, event),
                    None => break,
                },
                changed = stop.changed(), if watching_stop => {
                    match changed {
                        Ok(()) if *stop.borrow_and_update() => {
                            watching_stop = false;
                            let limit = Instant::now() + run_config.graceful_stop;
                            info!(
                                "Stop requested; waiting up to {:?} for in-flight iterations",
                                run_config.graceful_stop
                            );
                            if limit < hard_stop.deadline() {
                                hard_stop.as_mut().reset(limit);
                            }
                        }
                        Ok(()) => {}
                        Err(_) => watching_stop = false,
                    }
                }
                _ = &mut hard_stop => {
                    warn!(
                        "Graceful stop of {:?} elapsed; aborting remaining VUs",
                        run_config.graceful_stop
                    );
                    break;
                }
            }
        }

        for handle in &handles {
            if !handle.is_finished() {
                handle.abort();
            }
        }
        for handle in handles {
            match handle.await {
                Ok(iterations) => debug!("VU joined after {} iteration(s)", iterations),
                Err(e) if e.is_cancelled() => results.interrupted_vus += 1,
                Err(e) => warn!("VU task failed: {}", e),
            }
        }

        // Events buffered before the abort
        while let Ok(event) = rx.try_recv() {
            apply_event(&mut results, event);
        }

        results.checks = counters.snapshot();
        results.duration = start.elapsed();

        info!(
            "Run finished: {} iteration(s) in {:.2}s, checks {:.2}%",
            results.iterations,
            results.duration.as_secs_f64(),
            results.check_pass_rate() * 100.0
        );

        Ok(results)
    }
}

fn apply_event(results: &mut RunResults, event: VuEvent) {
    match event {
        VuEvent::Request {
            endpoint,
            latency,
            status,
        } => results.record_request(endpoint, latency, status),
        VuEvent::IterationComplete { latency } => results.record_iteration(latency),
    }
}
