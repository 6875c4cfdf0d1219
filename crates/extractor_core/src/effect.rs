use crate::{JobId, Quality};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob { url: String, quality: Quality },
    PersistSession { job_id: JobId },
    ClearSession,
    StartPolling { job_id: JobId },
    StopPolling,
    PersistQuality(Quality),
    OpenArtifact { job_id: JobId },
}
