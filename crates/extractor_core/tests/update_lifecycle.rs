use std::sync::Once;

use extractor_core::{
    update, AppState, Effect, JobId, JobSnapshot, JobStatus, Msg, Phase, PhaseKind, Quality,
    UrlMode, UserError, ValidationError,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(extractor_logging::initialize_for_tests);
}

fn job(raw: &str) -> JobId {
    JobId::new(raw).expect("non-empty job id")
}

fn attached(session_job: Option<JobId>, tab_url: Option<&str>) -> (AppState, Vec<Effect>) {
    update(
        AppState::new(),
        Msg::Attached {
            session_job,
            quality: Quality::P720,
            tab_url: tab_url.map(ToOwned::to_owned),
        },
    )
}

fn status(job_id: &JobId, status: &str, progress: i64, message: &str) -> Msg {
    Msg::StatusReceived {
        job_id: job_id.clone(),
        snapshot: JobSnapshot::new(JobStatus::parse(status), progress, message, None),
    }
}

/// Drives a fresh state through a successful submission of `j1`.
fn active_job() -> (AppState, JobId) {
    let (state, _) = attached(None, Some("https://www.youtube.com/watch?v=abc123"));
    let (state, _) = update(state, Msg::SubmitClicked);
    let job_id = job("j1");
    let (state, _) = update(
        state,
        Msg::SubmissionSucceeded {
            job_id: job_id.clone(),
        },
    );
    (state, job_id)
}

#[test]
fn submit_from_tab_then_first_poll_shows_queued() {
    init_logging();
    let (state, effects) = attached(None, Some("https://www.youtube.com/watch?v=abc123"));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(state.view().phase, PhaseKind::Submitting);
    assert!(!state.view().submit_enabled);
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            url: "https://www.youtube.com/watch?v=abc123".to_string(),
            quality: Quality::P720,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::SubmissionSucceeded {
            job_id: job("j1"),
        },
    );
    assert_eq!(state.session_job(), Some(&job("j1")));
    assert_eq!(
        effects,
        vec![
            Effect::PersistSession { job_id: job("j1") },
            Effect::StartPolling { job_id: job("j1") },
        ]
    );

    let (state, effects) = update(state, status(&job("j1"), "queued", 0, "Starting..."));
    assert!(effects.is_empty());
    let view = state.view();
    let status = view.status.expect("status shown");
    assert_eq!(status.label, "Queued");
    assert_eq!(status.progress, 0);
    assert_eq!(status.message, "Starting...");
    assert!(status.pulsing);
}

#[test]
fn progress_sequence_ends_in_completed_with_download() {
    init_logging();
    let (mut state, job_id) = active_job();
    let steps = [
        ("queued", 0),
        ("extracting", 35),
        ("ocr", 80),
    ];
    for (name, progress) in steps {
        let (next, effects) = update(state, status(&job_id, name, progress, "working"));
        assert!(effects.is_empty());
        assert_eq!(next.view().status.unwrap().progress, progress as u8);
        assert_eq!(next.session_job(), Some(&job_id));
        state = next;
    }

    let (state, effects) = update(state, status(&job_id, "completed", 100, "Done"));
    assert_eq!(effects, vec![Effect::StopPolling, Effect::ClearSession]);
    assert_eq!(state.session_job(), None);
    let view = state.view();
    assert_eq!(view.phase, PhaseKind::Completed);
    assert!(view.download_enabled);
    assert!(view.submit_enabled);
    let status = view.status.unwrap();
    assert_eq!(status.label, "Completed");
    assert_eq!(status.progress, 100);
    assert!(!status.pulsing);

    let (_state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::OpenArtifact { job_id }]);
}

#[test]
fn failed_status_surfaces_backend_error_and_rearms() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            job_id: job_id.clone(),
            snapshot: JobSnapshot::new(
                JobStatus::Failed,
                0,
                "Error",
                Some("video unavailable".to_string()),
            ),
        },
    );

    assert_eq!(effects, vec![Effect::StopPolling, Effect::ClearSession]);
    assert_eq!(state.session_job(), None);
    let view = state.view();
    assert_eq!(view.phase, PhaseKind::Failed);
    assert_eq!(view.error.as_deref(), Some("video unavailable"));
    assert!(view.submit_enabled);
    assert!(!view.download_enabled);
    assert!(view.status.is_none());
}

#[test]
fn failed_status_without_error_uses_fallback() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, _) = update(state, status(&job_id, "failed", 0, ""));
    assert_eq!(
        state.error(),
        Some(&UserError::JobFailed("Extraction failed".to_string()))
    );
}

#[test]
fn manual_garbage_is_rejected_without_effects() {
    init_logging();
    let (state, _) = attached(None, None);
    let (state, _) = update(state, Msg::ModeSelected(UrlMode::Manual));
    let (state, _) = update(state, Msg::ManualInputChanged("not a url".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), &Phase::Idle);
    assert_eq!(
        state.error(),
        Some(&UserError::Validation(ValidationError::InvalidUrl))
    );
}

#[test]
fn tab_mode_off_video_page_is_rejected() {
    init_logging();
    let (state, _) = attached(None, Some("https://example.com/"));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(
        state.error(),
        Some(&UserError::Validation(ValidationError::NotAVideoPage))
    );
}

#[test]
fn switching_mode_clears_inline_error() {
    init_logging();
    let (state, _) = attached(None, None);
    let (state, _) = update(state, Msg::SubmitClicked);
    assert!(state.error().is_some());
    let (state, _) = update(state, Msg::ModeSelected(UrlMode::Manual));
    assert!(state.error().is_none());
}

#[test]
fn persisted_session_resumes_and_polls_immediately() {
    init_logging();
    let (state, effects) = attached(Some(job("X")), None);

    assert_eq!(effects, vec![Effect::StartPolling { job_id: job("X") }]);
    let view = state.view();
    assert_eq!(view.phase, PhaseKind::Active);
    assert_eq!(view.active_job, Some(job("X")));
    assert!(!view.submit_enabled);
    let status = view.status.unwrap();
    assert_eq!(status.label, "processing");
    assert_eq!(status.progress, 0);
    assert_eq!(status.message, "Resuming extraction...");
}

#[test]
fn resumed_job_that_finished_while_closed_terminates() {
    init_logging();
    let (state, _) = attached(Some(job("X")), None);
    let (state, effects) = update(state, status(&job("X"), "completed", 100, "Done"));
    assert_eq!(effects, vec![Effect::StopPolling, Effect::ClearSession]);
    assert_eq!(state.session_job(), None);
    assert!(state.view().download_enabled);
}

#[test]
fn submit_with_active_session_is_rejected_before_network() {
    init_logging();
    let (state, _) = attached(Some(job("X")), Some("https://www.youtube.com/watch?v=abc"));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.error(), Some(&UserError::ActiveJobExists));
    assert_eq!(state.view().phase, PhaseKind::Active);
}

#[test]
fn submission_failure_returns_to_idle_without_session() {
    init_logging();
    let (state, _) = attached(None, Some("https://www.youtube.com/watch?v=abc"));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(
        state,
        Msg::SubmissionFailed {
            reason: "http status 500".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), &Phase::Idle);
    assert_eq!(state.session_job(), None);
    let view = state.view();
    assert!(view.submit_enabled);
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to start extraction. Make sure the backend server is running.")
    );
}

#[test]
fn second_click_while_submitting_is_ignored() {
    init_logging();
    let (state, _) = attached(None, Some("https://www.youtube.com/watch?v=abc"));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), &Phase::Submitting);
    assert!(state.error().is_none());
}

#[test]
fn new_cycle_starts_after_terminal_outcome() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, _) = update(state, status(&job_id, "completed", 100, "Done"));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(state.phase(), &Phase::Submitting);
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::SubmitJob { .. }));
}

#[test]
fn stale_status_for_other_job_is_ignored() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, _) = update(state, status(&job_id, "extracting", 35, "frames"));
    let before = state.clone();
    let (state, effects) = update(state, status(&job("old"), "completed", 100, "Done"));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), before.phase());
    assert_eq!(state.session_job(), Some(&job_id));
}

#[test]
fn status_without_active_job_stops_polling() {
    init_logging();
    let (state, _) = attached(None, None);
    let (state, effects) = update(state, status(&job("ghost"), "queued", 0, ""));
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(state.phase(), &Phase::Idle);
}

#[test]
fn progress_is_clamped_and_may_go_backwards() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, _) = update(state, status(&job_id, "ocr", 180, ""));
    assert_eq!(state.view().status.unwrap().progress, 100);
    let (state, _) = update(state, status(&job_id, "ocr", -4, ""));
    assert_eq!(state.view().status.unwrap().progress, 0);
    let (state, _) = update(state, status(&job_id, "rendering", 12, "custom"));
    let view = state.view();
    assert_eq!(view.phase, PhaseKind::Active);
    assert_eq!(view.status.unwrap().label, "rendering");
}

#[test]
fn quality_selection_persists_once() {
    init_logging();
    let (state, _) = attached(None, None);
    let (state, effects) = update(state, Msg::QualitySelected(Quality::P1080));
    assert_eq!(effects, vec![Effect::PersistQuality(Quality::P1080)]);
    let (state, effects) = update(state, Msg::QualitySelected(Quality::P1080));
    assert!(effects.is_empty());
    assert_eq!(state.quality(), Quality::P1080);
}

#[test]
fn quality_change_during_active_job_applies_to_next_submission() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, effects) = update(state, Msg::QualitySelected(Quality::P360));
    assert_eq!(effects, vec![Effect::PersistQuality(Quality::P360)]);
    let view = state.view();
    assert_eq!(view.quality, Quality::P360);
    assert_eq!(view.phase, PhaseKind::Active);
    assert_eq!(view.active_job, Some(job_id.clone()));

    let (state, _) = update(state, status(&job_id, "completed", 100, ""));
    let (_, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            url: "https://www.youtube.com/watch?v=abc123".to_string(),
            quality: Quality::P360,
        }]
    );
}

#[test]
fn detach_stops_polling_and_keeps_session() {
    init_logging();
    let (state, job_id) = active_job();
    let (state, effects) = update(state, Msg::Detached);
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(state.session_job(), Some(&job_id));
    assert!(!state.is_attached());
}
