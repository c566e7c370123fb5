use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::tracker::{entry::Entry, error::TrackerError};

use super::entities::EntryRecord;

const ENTRIES_FILE: &str = "entries.json";

/// Interface for abstracting durable storage of the entry list. The list is owned
/// wholesale: readers get the full list, writers replace it. Insertion order is
/// preserved but not assumed chronological.
pub trait EntryStore {
    fn read_all(&self) -> impl Future<Output = Result<Vec<Entry>, TrackerError>> + Send;

    fn write_all(
        &self,
        entries: &[Entry],
    ) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

impl<T: Deref + Sync> EntryStore for T
where
    T::Target: EntryStore + Sync,
{
    fn read_all(&self) -> impl Future<Output = Result<Vec<Entry>, TrackerError>> + Send {
        self.deref().read_all()
    }

    fn write_all(
        &self,
        entries: &[Entry],
    ) -> impl Future<Output = Result<(), TrackerError>> + Send {
        self.deref().write_all(entries)
    }
}

/// The main realization of [EntryStore]: one JSON file guarded with advisory file
/// locks, so a sync push snapshotting the list never interleaves with a mutation.
pub struct JsonEntryStore {
    path: PathBuf,
}

impl JsonEntryStore {
    pub fn new(data_dir: &Path) -> Result<Self, TrackerError> {
        std::fs::create_dir_all(data_dir).map_err(TrackerError::StorageUnavailable)?;

        Ok(Self {
            path: data_dir.join(ENTRIES_FILE),
        })
    }

    async fn read_records(&self) -> Result<Vec<EntryRecord>, TrackerError> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(TrackerError::StorageUnavailable(e)),
        };

        file.lock_shared().map_err(TrackerError::StorageUnavailable)?;
        let result = read_to_string(file).await;

        let raw = result?;
        if raw.trim().is_empty() {
            return Ok(vec![]);
        }
        match serde_json::from_str::<Vec<EntryRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                // ignore illegal content. Might happen after shutdowns
                warn!("Entry file {:?} is corrupted, treating as empty: {e}", self.path);
                Ok(vec![])
            }
        }
    }
}

async fn read_to_string(mut file: File) -> Result<String, TrackerError> {
    let mut raw = String::new();
    let read_result = file.read_to_string(&mut raw).await;
    file.unlock_async()
        .await
        .map_err(TrackerError::StorageUnavailable)?;
    read_result.map_err(TrackerError::StorageUnavailable)?;
    Ok(raw)
}

impl EntryStore for JsonEntryStore {
    async fn read_all(&self) -> Result<Vec<Entry>, TrackerError> {
        debug!("Reading entries from {:?}", self.path);
        let records = self.read_records().await?;

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            match record.to_entry() {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Skipping illegal entry record in {:?}: {e}", self.path)
                }
            }
        }
        Ok(entries)
    }

    async fn write_all(&self, entries: &[Entry]) -> Result<(), TrackerError> {
        debug!("Writing {} entries to {:?}", entries.len(), self.path);
        let records = entries.iter().map(EntryRecord::from).collect::<Vec<_>>();
        let buffer =
            serde_json::to_vec_pretty(&records).expect("entry records always serialize");

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await
            .map_err(TrackerError::StorageUnavailable)?;

        file.lock_exclusive()
            .map_err(TrackerError::StorageUnavailable)?;
        let result = write_buffer(&mut file, &buffer).await;
        file.unlock_async()
            .await
            .map_err(TrackerError::StorageUnavailable)?;
        result
    }
}

async fn write_buffer(file: &mut File, buffer: &[u8]) -> Result<(), TrackerError> {
    file.write_all(buffer)
        .await
        .map_err(TrackerError::StorageUnavailable)?;
    file.flush().await.map_err(TrackerError::StorageUnavailable)?;
    Ok(())
}
