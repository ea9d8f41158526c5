//! Loading and saving config records.
//!
//! These are the only functions that touch the file system. Each call is a
//! single attempt; failures are returned to the caller as a [`StoreError`]
//! and never retried here.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::record::ConfigRecord;

/// Default config file name, relative to the current directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config file `{}` does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("config file `{}` already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("I/O error accessing config at `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("config file must have a `.json` extension, found {found}")]
    Extension { found: String },
}

/// How [`save_config`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Fail with [`StoreError::AlreadyExists`] if the file is there.
    CreateNew,
    /// Replace whatever is there.
    Overwrite,
}

/// Checks that `path` names a `.json` file.
pub fn check_extension(path: &Path) -> Result<(), StoreError> {
    let found = match path.extension() {
        None => "no extension".to_string(),
        Some(ext) => match ext.to_str() {
            Some("json") => return Ok(()),
            Some(ext) => format!("`{ext}`"),
            None => "a non-UTF-8 extension".to_string(),
        },
    };
    Err(StoreError::Extension { found })
}

/// Reads and decodes the record stored at `path`.
pub async fn load_config(path: &Path) -> Result<ConfigRecord, StoreError> {
    let raw = fs::read(path).await.map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_path_buf(),
        },
        _ => StoreError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let record = serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(record)
}

/// Writes `record` to `path` as pretty-printed JSON.
pub async fn save_config(
    record: &ConfigRecord,
    path: &Path,
    mode: SaveMode,
) -> Result<(), StoreError> {
    let content = serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?;
    let io_error = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true);
    match mode {
        SaveMode::CreateNew => options.create_new(true),
        SaveMode::Overwrite => options.create(true).truncate(true),
    };
    let mut file = options.open(path).await.map_err(|source| match source.kind() {
        io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
            path: path.to_path_buf(),
        },
        _ => io_error(source),
    })?;
    file.write_all(&content).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;
    info!(path = %path.display(), ?mode, "saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ConfigRecord {
        ConfigRecord {
            version: Some(1),
            cwd: Some(".".into()),
            cascade_kill: Some(true),
            start: vec!["api".into(), "web".into()],
            exit_on: Some(0),
        }
    }

    #[test]
    fn extension_must_be_json() {
        assert!(check_extension(Path::new("config.json")).is_ok());
        assert_eq!(
            check_extension(Path::new("config.toml")).unwrap_err().to_string(),
            "config file must have a `.json` extension, found `toml`"
        );
        assert_eq!(
            check_extension(Path::new("config")).unwrap_err().to_string(),
            "config file must have a `.json` extension, found no extension"
        );
    }

    #[tokio::test]
    async fn saved_record_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        save_config(&record(), &path, SaveMode::CreateNew).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), record());
    }

    #[tokio::test]
    async fn create_new_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        save_config(&record(), &path, SaveMode::CreateNew).await.unwrap();
        let err = save_config(&record(), &path, SaveMode::CreateNew)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn overwrite_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        save_config(&record(), &path, SaveMode::CreateNew).await.unwrap();

        let shorter = ConfigRecord {
            start: vec![],
            exit_on: None,
            ..record()
        };
        save_config(&shorter, &path, SaveMode::Overwrite).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), shorter);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"start": "not a list"}"#).unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
