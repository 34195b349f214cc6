// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/atomic_file.rs
// Version: 1.0.1
// Developer: Tari Faqqer Contributors
//
// Whole-file replacement through a temporary sibling and a rename, so readers
// never observe a partially written archive, history file or CSV.

use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};

static LOG_TARGET: &str = "tari::faqqer::atomic_file";

#[derive(Error, Debug)]
pub enum AtomicFileError {
    #[error("Path {path:?} has no file name")]
    InvalidPath { path: PathBuf },

    #[error("Failed to create directory {path:?}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write temporary file {path:?}")]
    AtomicWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write `contents` to `path`, replacing any previous file in one step
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AtomicFileError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| AtomicFileError::InvalidPath {
            path: path.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AtomicFileError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));
    debug!(target: LOG_TARGET, "Writing {} bytes to {:?}", contents.len(), temp_path);

    let write_err = |e| AtomicFileError::AtomicWriteError {
        path: temp_path.clone(),
        source: e,
    };

    {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(write_err)?;
        temp_file.write_all(contents).await.map_err(write_err)?;
        temp_file.flush().await.map_err(write_err)?;
        temp_file.sync_all().await.map_err(write_err)?;
    }

    fs::rename(&temp_path, path).await.map_err(write_err)?;

    info!(target: LOG_TARGET, "Saved {:?}", path);
    Ok(())
}


// Changelog:
// - v1.0.1 (2026-09-30): fsync before rename.
// - v1.0.0 (2026-08-12): Extracted the temp-file + rename writer for all artifacts.
