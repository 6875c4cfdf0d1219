use std::sync::{mpsc, Arc};
use std::time::Duration;

use extractor_core::{Effect, JobId, JobSnapshot, JobStatus, Msg, Quality};
use extractor_engine::{JobBackend, PollEvent, Poller, SessionStore, SettingsStore};
use extractor_logging::{extractor_error, extractor_info, extractor_warn};
use tokio::runtime::Handle;

use super::HostPlatform;

/// Executes core effects against the engine, the stores and the host.
/// Asynchronous results come back as `Msg`s on `msg_tx`.
pub struct EffectRunner {
    backend: Arc<dyn JobBackend>,
    poller: Poller,
    runtime: Handle,
    settings: SettingsStore,
    session: SessionStore,
    host: Arc<dyn HostPlatform>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        runtime: Handle,
        poll_interval: Duration,
        settings: SettingsStore,
        session: SessionStore,
        host: Arc<dyn HostPlatform>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let poller = Poller::new(backend.clone(), runtime.clone(), poll_interval);
        Self {
            backend,
            poller,
            runtime,
            settings,
            session,
            host,
            msg_tx,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { url, quality } => self.submit(url, quality),
                Effect::PersistSession { job_id } => {
                    if let Err(err) = self.session.set_job_id(job_id.as_str()) {
                        extractor_error!("Failed to persist session for {}: {}", job_id, err);
                    }
                }
                Effect::ClearSession => {
                    if let Err(err) = self.session.clear() {
                        extractor_error!("Failed to clear session: {}", err);
                    }
                }
                Effect::StartPolling { job_id } => self.start_polling(&job_id),
                Effect::StopPolling => self.poller.stop(),
                Effect::PersistQuality(quality) => {
                    if let Err(err) = self.settings.set_quality(quality.as_str()) {
                        extractor_error!("Failed to persist quality {}: {}", quality, err);
                    }
                }
                Effect::OpenArtifact { job_id } => self.open_artifact(&job_id),
            }
        }
    }

    /// Releases the polling loop. Called on detach.
    pub fn shutdown(&mut self) {
        self.poller.stop();
    }

    fn submit(&self, url: String, quality: Quality) {
        extractor_info!("Submitting {} at {}", url, quality);
        let backend = self.backend.clone();
        let msg_tx = self.msg_tx.clone();
        self.runtime.spawn(async move {
            let msg = match backend.submit(&url, quality.as_str()).await {
                Ok(raw) => match JobId::new(raw) {
                    Some(job_id) => Msg::SubmissionSucceeded { job_id },
                    None => Msg::SubmissionFailed {
                        reason: "backend returned an empty job id".to_string(),
                    },
                },
                Err(err) => {
                    extractor_warn!("Submission rejected: {}", err);
                    Msg::SubmissionFailed {
                        reason: err.to_string(),
                    }
                }
            };
            let _ = msg_tx.send(msg);
        });
    }

    fn start_polling(&mut self, job_id: &JobId) {
        let msg_tx = self.msg_tx.clone();
        self.poller.start(
            job_id.as_str(),
            Arc::new(move |event: PollEvent| {
                if let Some(msg) = map_poll_event(event) {
                    let _ = msg_tx.send(msg);
                }
            }),
        );
    }

    fn open_artifact(&self, job_id: &JobId) {
        let url = match self.backend.download_url(job_id.as_str()) {
            Ok(url) => url,
            Err(err) => {
                extractor_error!("No download url for {}: {}", job_id, err);
                return;
            }
        };
        extractor_info!("Opening artifact for {} at {}", job_id, url);
        if let Err(err) = self.host.open_url(&url) {
            extractor_error!("{}", err);
        }
    }
}

fn map_poll_event(event: PollEvent) -> Option<Msg> {
    let (job_id, report) = match event {
        PollEvent::Update { job_id, report } | PollEvent::Terminal { job_id, report } => {
            (job_id, report)
        }
    };
    let job_id = JobId::new(job_id)?;
    Some(Msg::StatusReceived {
        job_id,
        snapshot: JobSnapshot::new(
            JobStatus::parse(&report.status),
            report.progress,
            report.message,
            report.error,
        ),
    })
}
