use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::fs;
use tracing::warn;

use crate::tracker::{error::TrackerError, session::RunningSession};

use super::entities::RunningRecord;

const SESSION_FILE: &str = "session.json";

/// Persistence for the single running timer session, so a timer started by one CLI
/// invocation is still running for the next one. Absence of the file means no timer
/// is running.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Result<Self, TrackerError> {
        std::fs::create_dir_all(data_dir).map_err(TrackerError::StorageUnavailable)?;

        Ok(Self {
            path: data_dir.join(SESSION_FILE),
        })
    }

    pub async fn read(&self) -> Result<Option<RunningSession>, TrackerError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TrackerError::StorageUnavailable(e)),
        };

        let session = serde_json::from_str::<RunningRecord>(&raw)
            .map_err(anyhow::Error::from)
            .and_then(|record| record.to_session());
        match session {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A half-written session is dropped instead of wedging every command.
                warn!("Session file {:?} is corrupted, ignoring it: {e}", self.path);
                Ok(None)
            }
        }
    }

    pub async fn write(&self, session: &RunningSession) -> Result<(), TrackerError> {
        let buffer = serde_json::to_vec_pretty(&RunningRecord::from(session))
            .expect("running records always serialize");
        fs::write(&self.path, buffer)
            .await
            .map_err(TrackerError::StorageUnavailable)
    }

    pub async fn clear(&self) -> Result<(), TrackerError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrackerError::StorageUnavailable(e)),
        }
    }
}
