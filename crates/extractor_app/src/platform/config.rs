use std::path::PathBuf;
use std::time::Duration;

use extractor_engine::{BackendSettings, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};

use super::LogDestination;

pub const DEFAULT_STATE_DIR: &str = ".notes_extractor";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub state_dir: PathBuf,
    /// Session-only override; the stored `api_url` is left untouched.
    pub api_url_override: Option<String>,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            api_url_override: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: backend.connect_timeout,
            request_timeout: backend.request_timeout,
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Override first, then the stored value, then the built-in default.
    pub fn backend_settings(&self, stored_api_url: Option<String>) -> BackendSettings {
        let base_url = self
            .api_url_override
            .clone()
            .or(stored_api_url)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        BackendSettings {
            base_url,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_stored_url() {
        let config = AppConfig {
            api_url_override: Some("http://override:1".to_string()),
            ..AppConfig::default()
        };
        let settings = config.backend_settings(Some("http://stored:2".to_string()));
        assert_eq!(settings.base_url, "http://override:1");
    }

    #[test]
    fn falls_back_to_default_url() {
        let config = AppConfig::default();
        assert_eq!(
            config.backend_settings(Some("  ".to_string())).base_url,
            DEFAULT_API_URL
        );
        assert_eq!(config.backend_settings(None).base_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
    }
}
