use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create parent dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode top score: {0}")]
    Encode(String),
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename = "topScore")]
struct TopScoreFile {
    #[serde(rename = "@value")]
    value: i32,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// Best score across sessions, backed by a small XML file.
#[derive(Clone, Debug)]
pub struct TopScoreStore {
    file_path: Option<PathBuf>,
    value: i32,
}

impl TopScoreStore {
    /// Loads the stored value. Unreadable files start the store at zero.
    pub fn open(file_path: PathBuf) -> Self {
        let value = match read_value(&file_path) {
            Ok(Some(value)) => value,
            Ok(None) => 0,
            Err(error) => {
                log::warn!("[top-score] {error}");
                0
            }
        };
        Self {
            file_path: Some(file_path),
            value,
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(value: i32) -> Self {
        Self {
            file_path: None,
            value: value.max(0),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Raises the stored value when `score` beats it. Returns true on change.
    pub fn offer(&mut self, score: i32) -> bool {
        if score > self.value {
            self.value = score;
            return true;
        }
        false
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.file_path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let payload = TopScoreFile {
            value: self.value,
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let text = quick_xml::se::to_string(&payload).map_err(|error| StoreError::Encode(error.to_string()))?;
        fs::write(path, text).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("[top-score] saved {} to {}", self.value, path.display());
        Ok(())
    }
}

fn read_value(path: &Path) -> Result<Option<i32>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let file: TopScoreFile = quick_xml::de::from_str(&text).map_err(|error| StoreError::Decode {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    Ok(Some(file.value.max(0)))
}
