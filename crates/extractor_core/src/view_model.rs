use crate::{JobId, Quality, UrlMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    Submitting,
    Active,
    Completed,
    Failed,
}

/// Live feedback on the manual URL box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputHint {
    #[default]
    Empty,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub label: String,
    pub progress: u8,
    pub message: String,
    /// True while the job is still moving.
    pub pulsing: bool,
}

/// Everything a renderer needs. Control enablement is derived here and nowhere else.
/// Quality has no enablement flag: it can be changed in every phase and only applies
/// to the next submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: PhaseKind,
    pub mode: UrlMode,
    pub quality: Quality,
    pub manual_input: String,
    pub manual_input_hint: InputHint,
    pub active_job: Option<JobId>,
    pub status: Option<StatusView>,
    pub error: Option<String>,
    pub submit_enabled: bool,
    pub download_enabled: bool,
    pub mode_switch_enabled: bool,
    pub dirty: bool,
}
