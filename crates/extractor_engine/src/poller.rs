use std::sync::Arc;
use std::time::Duration;

use extractor_logging::{extractor_debug, extractor_info, extractor_warn};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{JobBackend, StatusReport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Non-terminal status observed.
    Update { job_id: String, report: StatusReport },
    /// `completed` or `failed` observed; the loop has already ended.
    Terminal { job_id: String, report: StatusReport },
}

pub trait PollSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}

impl<F> PollSink for F
where
    F: Fn(PollEvent) + Send + Sync,
{
    fn emit(&self, event: PollEvent) {
        self(event)
    }
}

struct ActivePoll {
    job_id: String,
    cancel: CancellationToken,
}

/// Polls one job at a time on a tokio runtime.
///
/// The first query goes out immediately, then one per `interval`. Failed queries are
/// logged and retried on the next tick; only a terminal status ends the loop on its own.
pub struct Poller {
    backend: Arc<dyn JobBackend>,
    runtime: Handle,
    interval: Duration,
    active: Option<ActivePoll>,
}

impl Poller {
    pub fn new(backend: Arc<dyn JobBackend>, runtime: Handle, interval: Duration) -> Self {
        Self {
            backend,
            runtime,
            interval,
            active: None,
        }
    }

    /// Starts polling `job_id`, replacing any loop already running.
    pub fn start(&mut self, job_id: &str, sink: Arc<dyn PollSink>) {
        self.stop();
        let job_id = job_id.trim();
        if job_id.is_empty() {
            extractor_warn!("Refusing to poll without a job id");
            return;
        }

        extractor_info!("Polling job {} every {:?}", job_id, self.interval);
        let cancel = CancellationToken::new();
        self.runtime.spawn(poll_loop(
            self.backend.clone(),
            job_id.to_string(),
            self.interval,
            cancel.clone(),
            sink,
        ));
        self.active = Some(ActivePoll {
            job_id: job_id.to_string(),
            cancel,
        });
    }

    /// Stops the current loop. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.cancel.is_cancelled() {
                extractor_debug!("Stopping poller for job {}", active.job_id);
            }
            active.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.cancel.is_cancelled())
    }

    pub fn current_job(&self) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|active| !active.cancel.is_cancelled())
            .map(|active| active.job_id.as_str())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    backend: Arc<dyn JobBackend>,
    job_id: String,
    interval: Duration,
    cancel: CancellationToken,
    sink: Arc<dyn PollSink>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Dropping the request future on cancel discards any late response.
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = backend.status(&job_id) => result,
        };

        match result {
            Ok(report) => {
                consecutive_failures = 0;
                if cancel.is_cancelled() {
                    break;
                }
                if report.is_terminal() {
                    extractor_info!("Job {} reached terminal status {}", job_id, report.status);
                    cancel.cancel();
                    sink.emit(PollEvent::Terminal { job_id, report });
                    return;
                }
                extractor_debug!(
                    "Job {} status={} progress={}",
                    job_id,
                    report.status,
                    report.progress
                );
                sink.emit(PollEvent::Update {
                    job_id: job_id.clone(),
                    report,
                });
            }
            Err(err) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
                extractor_warn!(
                    "Status poll for job {} failed ({} in a row): {}",
                    job_id,
                    consecutive_failures,
                    err
                );
            }
        }
    }
    extractor_debug!("Poller for job {} stopped", job_id);
}
