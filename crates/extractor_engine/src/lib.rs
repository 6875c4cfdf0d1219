//! Extractor engine: backend HTTP client, status polling and local persistence.
mod client;
mod persist;
mod poller;
mod store;
mod types;

pub use client::{BackendSettings, JobBackend, ReqwestBackend, DEFAULT_API_URL};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::{PollEvent, PollSink, Poller, DEFAULT_POLL_INTERVAL};
pub use store::{
    LocalStore, SessionStore, SettingsStore, StoreError, StoreKey, StoreRecord, DEFAULT_QUALITY,
};
pub use types::{BackendError, FailureKind, ServerInfo, StatusReport};
