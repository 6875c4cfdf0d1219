use crate::{JobId, JobSnapshot, Quality, UrlMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// UI attached; carries what the stores and the host reported at startup.
    Attached {
        session_job: Option<JobId>,
        quality: Quality,
        tab_url: Option<String>,
    },
    /// UI is being torn down.
    Detached,
    /// User switched between active-tab and manual URL entry.
    ModeSelected(UrlMode),
    /// User edited the manual URL input.
    ManualInputChanged(String),
    /// User picked a video quality.
    QualitySelected(Quality),
    /// User clicked Start.
    SubmitClicked,
    /// Backend accepted the submission.
    SubmissionSucceeded { job_id: JobId },
    /// Backend refused the submission or could not be reached.
    SubmissionFailed { reason: String },
    /// A status poll answered.
    StatusReceived { job_id: JobId, snapshot: JobSnapshot },
    /// User clicked Download.
    DownloadClicked,
}
