use std::fs;
use std::io;
use std::path::PathBuf;

use extractor_logging::{extractor_info, extractor_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AtomicFileWriter, PersistError, DEFAULT_API_URL};

pub const DEFAULT_QUALITY: &str = "720p";

const STORE_FILENAME: &str = "storage.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Quality,
    ApiUrl,
    JobId,
}

/// A partial view of the persisted keys. `None` means absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRecord {
    pub quality: Option<String>,
    pub api_url: Option<String>,
    pub job_id: Option<String>,
}

impl StoreRecord {
    fn slot(&mut self, key: StoreKey) -> &mut Option<String> {
        match key {
            StoreKey::Quality => &mut self.quality,
            StoreKey::ApiUrl => &mut self.api_url,
            StoreKey::JobId => &mut self.job_id,
        }
    }

    fn project(mut self, keys: &[StoreKey]) -> Self {
        let mut out = Self::default();
        for &key in keys {
            *out.slot(key) = self.slot(key).take();
        }
        out
    }

    fn merge(&mut self, other: StoreRecord) {
        let StoreRecord {
            quality,
            api_url,
            job_id,
        } = other;
        if quality.is_some() {
            self.quality = quality;
        }
        if api_url.is_some() {
            self.api_url = api_url;
        }
        if job_id.is_some() {
            self.job_id = job_id;
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] ron::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// File-backed key-value store shared by settings and session. Last write wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILENAME)
    }

    pub fn get(&self, keys: &[StoreKey]) -> Result<StoreRecord, StoreError> {
        Ok(self.load()?.project(keys))
    }

    /// Writes every `Some` field of `record`; `None` fields are left as they are.
    pub fn set(&self, record: StoreRecord) -> Result<(), StoreError> {
        let mut current = self.load()?;
        current.merge(record);
        self.save(&current)
    }

    pub fn remove(&self, keys: &[StoreKey]) -> Result<(), StoreError> {
        let mut current = self.load()?;
        for &key in keys {
            *current.slot(key) = None;
        }
        self.save(&current)
    }

    fn load(&self) -> Result<StoreRecord, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(StoreRecord::default());
            }
            Err(err) => {
                // Unreadable counts as empty, like a corrupt file.
                extractor_warn!("Failed to read store {:?}: {}", path, err);
                return Ok(StoreRecord::default());
            }
        };

        match ron::from_str(&content) {
            Ok(record) => Ok(record),
            Err(err) => {
                // A corrupt file is treated as empty; the next write replaces it.
                extractor_warn!("Failed to parse store {:?}: {}", path, err);
                Ok(StoreRecord::default())
            }
        }
    }

    fn save(&self, record: &StoreRecord) -> Result<(), StoreError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(record, pretty)?;
        AtomicFileWriter::new(self.dir.clone()).write(STORE_FILENAME, &content)?;
        Ok(())
    }
}

/// User preferences: video quality and backend root.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    store: LocalStore,
}

impl SettingsStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn quality(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(&[StoreKey::Quality])?.quality)
    }

    pub fn set_quality(&self, quality: &str) -> Result<(), StoreError> {
        self.store.set(StoreRecord {
            quality: Some(quality.to_string()),
            ..StoreRecord::default()
        })
    }

    pub fn api_url(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(&[StoreKey::ApiUrl])?.api_url)
    }

    /// First-run defaults. Existing values are kept. Returns whether anything was written.
    pub fn install_defaults(&self) -> Result<bool, StoreError> {
        let current = self.store.get(&[StoreKey::Quality, StoreKey::ApiUrl])?;
        let missing = StoreRecord {
            quality: current
                .quality
                .is_none()
                .then(|| DEFAULT_QUALITY.to_string()),
            api_url: current
                .api_url
                .is_none()
                .then(|| DEFAULT_API_URL.to_string()),
            job_id: None,
        };
        if missing == StoreRecord::default() {
            return Ok(false);
        }
        extractor_info!("Installing default settings in {:?}", self.store.path());
        self.store.set(missing)?;
        Ok(true)
    }
}

/// Pointer to the one in-flight job, if any.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn job_id(&self) -> Result<Option<String>, StoreError> {
        let job_id = self.store.get(&[StoreKey::JobId])?.job_id;
        Ok(job_id.filter(|id| !id.trim().is_empty()))
    }

    pub fn set_job_id(&self, job_id: &str) -> Result<(), StoreError> {
        self.store.set(StoreRecord {
            job_id: Some(job_id.to_string()),
            ..StoreRecord::default()
        })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&[StoreKey::JobId])
    }
}
