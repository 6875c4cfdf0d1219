use std::time::Duration;

use extractor_logging::extractor_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::types::SubmitReceipt;
use crate::{BackendError, FailureKind, ServerInfo, StatusReport};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The three backend calls the job lifecycle needs.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    /// `POST /api/extract`; returns the backend-assigned job id.
    async fn submit(&self, video_url: &str, quality: &str) -> Result<String, BackendError>;

    /// `GET /api/status/{job_id}`.
    async fn status(&self, job_id: &str) -> Result<StatusReport, BackendError>;

    /// Where the finished artifact can be fetched. Never requested by the client itself.
    fn download_url(&self, job_id: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| BackendError::new(FailureKind::InvalidBaseUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidBaseUrl,
                format!("{base} cannot be a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Health probe against `GET /`.
    pub async fn server_info(&self) -> Result<ServerInfo, BackendError> {
        let url = self.endpoint(&[])?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        read_json(response).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::new(FailureKind::InvalidBaseUrl, "base url has no path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl JobBackend for ReqwestBackend {
    async fn submit(&self, video_url: &str, quality: &str) -> Result<String, BackendError> {
        let url = self.endpoint(&["api", "extract"])?;
        let body = serde_json::json!({ "url": video_url, "quality": quality });
        extractor_debug!("POST {} quality={}", url, quality);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let receipt: SubmitReceipt = read_json(response).await?;
        let job_id = receipt.job_id.trim();
        if job_id.is_empty() {
            return Err(BackendError::new(
                FailureKind::MalformedBody,
                "empty job_id in response",
            ));
        }
        Ok(job_id.to_string())
    }

    async fn status(&self, job_id: &str) -> Result<StatusReport, BackendError> {
        let url = self.endpoint(&["api", "status", job_id])?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        read_json(response).await
    }

    fn download_url(&self, job_id: &str) -> Result<String, BackendError> {
        self.endpoint(&["api", "download", job_id])
            .map(|url| url.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    let text = response.text().await.map_err(map_reqwest_error)?;
    serde_json::from_str(&text)
        .map_err(|err| BackendError::new(FailureKind::MalformedBody, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
