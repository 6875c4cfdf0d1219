use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::view_model::{AppViewModel, InputHint, PhaseKind, StatusView};
use crate::{is_video_url, UserError};

/// Backend-assigned job identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    /// Returns `None` for blank identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == raw.len() {
            Some(Self(raw))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    P360,
    P480,
    #[default]
    P720,
    P1080,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::P360, Quality::P480, Quality::P720, Quality::P1080];

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quality {0:?}")]
pub struct UnknownQuality(pub String);

impl FromStr for Quality {
    type Err = UnknownQuality;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Quality::ALL
            .into_iter()
            .find(|quality| quality.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownQuality(raw.to_string()))
    }
}

/// Sub-status reported by the backend while a job is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Downloading,
    Extracting,
    Detecting,
    Cleaning,
    Ocr,
    Generating,
    Completed,
    Failed,
    /// Anything the backend reports that this client does not know. Never terminal.
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => JobStatus::Queued,
            "downloading" => JobStatus::Downloading,
            "extracting" => JobStatus::Extracting,
            "detecting" => JobStatus::Detecting,
            "cleaning" => JobStatus::Cleaning,
            "ocr" => JobStatus::Ocr,
            "generating" => JobStatus::Generating,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Extracting => "extracting",
            JobStatus::Detecting => "detecting",
            JobStatus::Cleaning => "cleaning",
            JobStatus::Ocr => "ocr",
            JobStatus::Generating => "generating",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(raw) => raw,
        }
    }

    /// Human label shown next to the progress bar.
    pub fn label(&self) -> &str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Downloading => "Downloading Video",
            JobStatus::Extracting => "Extracting Frames",
            JobStatus::Detecting => "Detecting Pages",
            JobStatus::Cleaning => "Cleaning Frames",
            JobStatus::Ocr => "Extracting Text",
            JobStatus::Generating => "Generating PDF",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Latest observed state of a job. The backend stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
}

impl JobSnapshot {
    /// Builds a snapshot, clamping `progress` into 0..=100.
    pub fn new(
        status: JobStatus,
        progress: i64,
        message: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            status,
            progress: progress.clamp(0, 100) as u8,
            message: message.into(),
            error,
        }
    }

    pub(crate) fn starting() -> Self {
        Self::new(JobStatus::Queued, 0, "Starting extraction...", None)
    }

    pub(crate) fn resuming() -> Self {
        Self::new(
            JobStatus::Other("processing".to_string()),
            0,
            "Resuming extraction...",
            None,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlMode {
    #[default]
    ActiveTab,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Active {
        job_id: JobId,
        snapshot: JobSnapshot,
    },
    Completed {
        job_id: JobId,
        snapshot: JobSnapshot,
    },
    Failed {
        error: String,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Submitting => PhaseKind::Submitting,
            Phase::Active { .. } => PhaseKind::Active,
            Phase::Completed { .. } => PhaseKind::Completed,
            Phase::Failed { .. } => PhaseKind::Failed,
        }
    }

    /// Idle and both terminal phases accept a new submission.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Completed { .. } | Phase::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: Phase,
    mode: UrlMode,
    manual_input: String,
    tab_url: Option<String>,
    quality: Quality,
    /// Mirror of the persisted session; written by the same transitions that emit
    /// `PersistSession`/`ClearSession`.
    session_job: Option<JobId>,
    error: Option<UserError>,
    attached: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn mode(&self) -> UrlMode {
        self.mode
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn session_job(&self) -> Option<&JobId> {
        self.session_job.as_ref()
    }

    pub fn error(&self) -> Option<&UserError> {
        self.error.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn manual_input(&self) -> &str {
        &self.manual_input
    }

    pub fn tab_url(&self) -> Option<&str> {
        self.tab_url.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        let submit_enabled = self.phase.accepts_submit() && self.session_job.is_none();
        let status = match &self.phase {
            Phase::Active { snapshot, .. } | Phase::Completed { snapshot, .. } => {
                Some(StatusView {
                    label: snapshot.status.label().to_string(),
                    progress: snapshot.progress,
                    message: snapshot.message.clone(),
                    pulsing: !snapshot.status.is_terminal(),
                })
            }
            Phase::Submitting => {
                let snapshot = JobSnapshot::starting();
                Some(StatusView {
                    label: snapshot.status.label().to_string(),
                    progress: snapshot.progress,
                    message: snapshot.message,
                    pulsing: true,
                })
            }
            Phase::Idle | Phase::Failed { .. } => None,
        };
        let active_job = match &self.phase {
            Phase::Active { job_id, .. } => Some(job_id.clone()),
            _ => None,
        };

        AppViewModel {
            phase: self.phase.kind(),
            mode: self.mode,
            quality: self.quality,
            manual_input: self.manual_input.clone(),
            manual_input_hint: input_hint(&self.manual_input),
            active_job,
            status,
            error: self.error.as_ref().map(ToString::to_string),
            submit_enabled,
            download_enabled: matches!(self.phase, Phase::Completed { .. }),
            mode_switch_enabled: !matches!(self.phase, Phase::Submitting),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_error(&mut self, error: Option<UserError>) {
        if self.error != error {
            self.error = error;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_session_job(&mut self, job_id: Option<JobId>) {
        self.session_job = job_id;
    }

    pub(crate) fn set_mode(&mut self, mode: UrlMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_manual_input(&mut self, input: String) {
        if self.manual_input != input {
            self.manual_input = input;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_tab_url(&mut self, tab_url: Option<String>) {
        if self.tab_url != tab_url {
            self.tab_url = tab_url;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_quality(&mut self, quality: Quality) {
        if self.quality != quality {
            self.quality = quality;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }
}

fn input_hint(input: &str) -> InputHint {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        InputHint::Empty
    } else if is_video_url(trimmed) {
        InputHint::Valid
    } else {
        InputHint::Invalid
    }
}
