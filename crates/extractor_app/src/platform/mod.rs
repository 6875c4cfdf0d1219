pub mod cli;
pub mod config;
pub mod controller;
pub mod effects;
pub mod host;
pub mod logging;
pub mod render;

pub use cli::{Cli, Command, Invocation};
pub use config::AppConfig;
pub use controller::{bootstrap, JobController};
pub use effects::EffectRunner;
pub use host::{HostError, HostPlatform, TerminalHost};
pub use logging::LogDestination;
