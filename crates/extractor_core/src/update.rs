use extractor_logging::{extractor_debug, extractor_info};

use crate::{
    resolve, AppState, Effect, JobId, JobSnapshot, JobStatus, Msg, Phase, UrlMode, UrlSource,
    UserError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Attached {
            session_job,
            quality,
            tab_url,
        } => {
            state.set_attached(true);
            state.set_quality(quality);
            state.set_tab_url(tab_url);
            match session_job {
                Some(job_id) => resume(&mut state, job_id),
                None => Vec::new(),
            }
        }
        Msg::Detached => {
            state.set_attached(false);
            vec![Effect::StopPolling]
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            state.set_error(None);
            Vec::new()
        }
        Msg::ManualInputChanged(input) => {
            state.set_manual_input(input);
            Vec::new()
        }
        Msg::QualitySelected(quality) => {
            if state.quality() == quality {
                Vec::new()
            } else {
                state.set_quality(quality);
                vec![Effect::PersistQuality(quality)]
            }
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::SubmissionSucceeded { job_id } => {
            if state.phase() != &Phase::Submitting {
                extractor_debug!("Ignoring submission result for {} outside Submitting", job_id);
                return (state, Vec::new());
            }
            extractor_info!("Extraction job {} accepted", job_id);
            state.set_session_job(Some(job_id.clone()));
            state.set_phase(Phase::Active {
                job_id: job_id.clone(),
                snapshot: JobSnapshot::starting(),
            });
            vec![
                Effect::PersistSession {
                    job_id: job_id.clone(),
                },
                Effect::StartPolling { job_id },
            ]
        }
        Msg::SubmissionFailed { reason } => {
            if state.phase() == &Phase::Submitting {
                state.set_phase(Phase::Idle);
                state.set_error(Some(UserError::SubmissionRejected { reason }));
            }
            Vec::new()
        }
        Msg::StatusReceived { job_id, snapshot } => apply_status(&mut state, job_id, snapshot),
        Msg::DownloadClicked => match state.phase() {
            Phase::Completed { job_id, .. } => vec![Effect::OpenArtifact {
                job_id: job_id.clone(),
            }],
            _ => Vec::new(),
        },
    };

    (state, effects)
}

fn resume(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    if let Phase::Active { job_id: current, .. } = state.phase() {
        if *current == job_id {
            return vec![Effect::StartPolling { job_id }];
        }
    }
    extractor_info!("Resuming extraction job {}", job_id);
    state.set_session_job(Some(job_id.clone()));
    state.set_error(None);
    state.set_phase(Phase::Active {
        job_id: job_id.clone(),
        snapshot: JobSnapshot::resuming(),
    });
    vec![Effect::StartPolling { job_id }]
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.phase() == &Phase::Submitting {
        return Vec::new();
    }
    if state.session_job().is_some() || !state.phase().accepts_submit() {
        state.set_error(Some(UserError::ActiveJobExists));
        return Vec::new();
    }

    let source = match state.mode() {
        UrlMode::ActiveTab => UrlSource::ActiveTab(state.tab_url()),
        UrlMode::Manual => UrlSource::Manual(state.manual_input()),
    };
    match resolve(source) {
        Ok(url) => {
            state.set_error(None);
            state.set_phase(Phase::Submitting);
            vec![Effect::SubmitJob {
                url,
                quality: state.quality(),
            }]
        }
        Err(err) => {
            state.set_error(Some(err.into()));
            Vec::new()
        }
    }
}

fn apply_status(state: &mut AppState, job_id: JobId, snapshot: JobSnapshot) -> Vec<Effect> {
    let current = match state.phase() {
        Phase::Active { job_id: current, .. } => current.clone(),
        _ => {
            // Nothing is being tracked, so whatever is still polling has to stop.
            extractor_debug!("Status for {} with no active job; stopping poller", job_id);
            return vec![Effect::StopPolling];
        }
    };
    if current != job_id {
        extractor_debug!("Dropping stale status for {} (tracking {})", job_id, current);
        return Vec::new();
    }

    match snapshot.status {
        JobStatus::Completed => {
            extractor_info!("Extraction job {} completed", job_id);
            state.set_session_job(None);
            state.set_phase(Phase::Completed { job_id, snapshot });
            vec![Effect::StopPolling, Effect::ClearSession]
        }
        JobStatus::Failed => {
            let error = snapshot
                .error
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| "Extraction failed".to_string());
            extractor_info!("Extraction job {} failed: {}", job_id, error);
            state.set_session_job(None);
            state.set_error(Some(UserError::JobFailed(error.clone())));
            state.set_phase(Phase::Failed { error });
            vec![Effect::StopPolling, Effect::ClearSession]
        }
        _ => {
            state.set_phase(Phase::Active { job_id, snapshot });
            Vec::new()
        }
    }
}
