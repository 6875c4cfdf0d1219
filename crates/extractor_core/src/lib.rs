//! Extractor core: pure job lifecycle state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod resolve;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{UserError, ValidationError};
pub use msg::Msg;
pub use resolve::{is_video_url, is_watch_page, resolve, UrlSource};
pub use state::{AppState, JobId, JobSnapshot, JobStatus, Phase, Quality, UnknownQuality, UrlMode};
pub use update::update;
pub use view_model::{AppViewModel, InputHint, PhaseKind, StatusView};
