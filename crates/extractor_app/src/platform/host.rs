use std::io::Write;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("could not read the active url: {0}")]
    Query(String),
    #[error("could not open {url}: {reason}")]
    Open { url: String, reason: String },
}

/// The two capabilities the controller needs from whatever hosts it.
pub trait HostPlatform: Send + Sync {
    /// URL of the page the user is looking at, if any.
    fn current_url(&self) -> Result<Option<String>, HostError>;

    /// Hands `url` to the host for retrieval in a new view.
    fn open_url(&self, url: &str) -> Result<(), HostError>;
}

/// Terminal host: the "active tab" is whatever URL was passed on the command line and
/// opening a URL prints it.
pub struct TerminalHost {
    tab_url: Option<String>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalHost {
    pub fn new(tab_url: Option<String>) -> Self {
        Self::with_writer(tab_url, Box::new(std::io::stdout()))
    }

    pub fn with_writer(tab_url: Option<String>, out: Box<dyn Write + Send>) -> Self {
        Self {
            tab_url,
            out: Mutex::new(out),
        }
    }
}

impl HostPlatform for TerminalHost {
    fn current_url(&self) -> Result<Option<String>, HostError> {
        Ok(self.tab_url.clone())
    }

    fn open_url(&self, url: &str) -> Result<(), HostError> {
        let open_error = |reason: String| HostError::Open {
            url: url.to_string(),
            reason,
        };
        let mut out = self
            .out
            .lock()
            .map_err(|_| open_error("output lock poisoned".to_string()))?;
        writeln!(out, "Download: {url}").map_err(|err| open_error(err.to_string()))?;
        out.flush().map_err(|err| open_error(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn terminal_host_reports_tab_and_prints_downloads() {
        let buf = SharedBuf::default();
        let host = TerminalHost::with_writer(
            Some("https://www.youtube.com/watch?v=abc".to_string()),
            Box::new(buf.clone()),
        );
        assert_eq!(
            host.current_url().unwrap().as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
        host.open_url("http://localhost:8000/api/download/j1").unwrap();
        let printed = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "Download: http://localhost:8000/api/download/j1\n");
    }
}
