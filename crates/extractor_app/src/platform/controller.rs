use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::Context;
use extractor_core::{update, AppState, AppViewModel, JobId, Msg, Quality};
use extractor_engine::{
    JobBackend, LocalStore, ReqwestBackend, SessionStore, SettingsStore,
};
use extractor_logging::{extractor_debug, extractor_info, extractor_warn};
use tokio::runtime::Handle;

use super::{AppConfig, EffectRunner, HostPlatform};

/// Builds a controller for `config`: installs first-run defaults and resolves the
/// backend url from the override or the settings store. Store failures are logged and
/// fall back to defaults; only an unusable backend url is an error.
pub fn bootstrap(
    config: &AppConfig,
    runtime: Handle,
    host: Arc<dyn HostPlatform>,
) -> anyhow::Result<JobController> {
    let store = LocalStore::new(config.state_dir.clone());
    let settings = SettingsStore::new(store.clone());
    if let Err(err) = settings.install_defaults() {
        extractor_warn!("Failed to install defaults in {:?}: {}", store.path(), err);
    }
    let stored_api_url = settings.api_url().unwrap_or_else(|err| {
        extractor_warn!("Failed to read api url from {:?}: {}", store.path(), err);
        None
    });

    let backend_settings = config.backend_settings(stored_api_url);
    extractor_info!("Using backend {}", backend_settings.base_url);
    let backend = ReqwestBackend::new(backend_settings).context("building backend client")?;

    Ok(JobController::new(
        config,
        store,
        Arc::new(backend),
        host,
        runtime,
    ))
}

/// The job lifecycle controller: owns the state, the effect runner (and with it the
/// poller) and the inbox every asynchronous result is delivered to.
///
/// Lifetime: `attach()` once the UI is up, `detach()` (or drop) when it goes away.
/// Messages are applied one at a time on the thread that calls into the controller.
pub struct JobController {
    state: AppState,
    runner: EffectRunner,
    settings: SettingsStore,
    session: SessionStore,
    host: Arc<dyn HostPlatform>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl JobController {
    pub fn new(
        config: &AppConfig,
        store: LocalStore,
        backend: Arc<dyn JobBackend>,
        host: Arc<dyn HostPlatform>,
        runtime: Handle,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let settings = SettingsStore::new(store.clone());
        let session = SessionStore::new(store);
        let runner = EffectRunner::new(
            backend,
            runtime,
            config.poll_interval,
            settings.clone(),
            session.clone(),
            host.clone(),
            msg_tx,
        );
        Self {
            state: AppState::new(),
            runner,
            settings,
            session,
            host,
            msg_rx,
        }
    }

    /// Reads the stores and the host, then resumes any persisted job.
    pub fn attach(&mut self) -> AppViewModel {
        let quality = match self.settings.quality() {
            Ok(Some(raw)) => raw.parse::<Quality>().unwrap_or_else(|err| {
                extractor_warn!("Ignoring stored quality: {}", err);
                Quality::default()
            }),
            Ok(None) => Quality::default(),
            Err(err) => {
                extractor_warn!("Failed to read quality: {}", err);
                Quality::default()
            }
        };
        let session_job = match self.session.job_id() {
            Ok(raw) => raw.and_then(JobId::new),
            Err(err) => {
                extractor_warn!("Failed to read session: {}", err);
                None
            }
        };
        let tab_url = self.host.current_url().unwrap_or_else(|err| {
            extractor_warn!("{}", err);
            None
        });

        self.dispatch(Msg::Attached {
            session_job,
            quality,
            tab_url,
        });
        self.state.view()
    }

    /// Stops polling. The persisted session is kept so the next attach resumes it.
    pub fn detach(&mut self) {
        if self.state.is_attached() {
            self.dispatch(Msg::Detached);
        }
        self.runner.shutdown();
    }

    /// Applies one message and runs its effects. Returns the view if anything changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        extractor_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.run(effects);
        was_dirty.then_some(view)
    }

    /// Applies everything already waiting in the inbox.
    pub fn process_pending(&mut self) -> Option<AppViewModel> {
        let mut latest = None;
        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(view) = self.dispatch(msg) {
                latest = Some(view);
            }
        }
        latest
    }

    /// Blocks on the inbox, applying messages until `done` holds for the current view or
    /// `timeout` elapses. `on_change` sees every changed view. Returns whether `done` held.
    pub fn run_until(
        &mut self,
        timeout: Duration,
        mut done: impl FnMut(&AppViewModel) -> bool,
        mut on_change: impl FnMut(&AppViewModel),
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.state.view()) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    if let Some(view) = self.dispatch(msg) {
                        on_change(&view);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => return done(&self.state.view()),
                Err(mpsc::RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn is_polling(&self) -> bool {
        self.runner.is_polling()
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        self.runner.shutdown();
    }
}
