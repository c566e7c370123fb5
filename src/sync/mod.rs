//! Reconciles the local entry list with its remote copy. There is no per-entry
//! merge: a pull replaces the local list wholesale, a push replaces the remote one,
//! and the last writer wins. Auto-sync pushes on a fixed cadence until cancelled.

pub mod remote;
pub mod wire;

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    storage::entry_store::EntryStore, tracker::error::TrackerError, utils::clock::Clock,
};

use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not authenticated or session expired, log in again")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Storage(#[from] TrackerError),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Network(e.to_string())
    }
}

/// Moves whole entry lists between the local store and the remote. Each operation
/// touches exactly one side per direction, so a failed pull leaves the local list
/// untouched and a failed push leaves the remote untouched.
pub struct SyncCoordinator<S: EntryStore, R: RemoteStore> {
    entries: S,
    remote: R,
}

impl<S: EntryStore, R: RemoteStore> SyncCoordinator<S, R> {
    pub fn new(entries: S, remote: R) -> Self {
        Self { entries, remote }
    }

    /// Fetches the remote list and replaces the local one. Returns the entry count.
    pub async fn pull_replace(&self) -> Result<usize, SyncError> {
        let entries = self.remote.pull().await?;
        let count = entries.len();
        self.entries.write_all(&entries).await?;
        debug!("Replaced local entries with {count} remote entries");
        Ok(count)
    }

    /// Snapshots the local list at one point in time and replaces the remote one.
    /// Returns the count the remote accepted.
    pub async fn push_replace(&self) -> Result<usize, SyncError> {
        let snapshot = self.entries.read_all().await?;
        let accepted = self.remote.push(snapshot).await?;
        debug!("Pushed local entries, remote accepted {accepted}");
        Ok(accepted)
    }

    /// Pushes on a fixed period until `shutdown` is cancelled. Push failures are
    /// logged and retried on the next tick, except authentication loss, which ends
    /// the loop so the caller can force a fresh login. A cancelled loop never fires
    /// a pending push.
    pub async fn run_auto_sync(
        &self,
        period: Duration,
        shutdown: CancellationToken,
        clock: &dyn Clock,
    ) -> Result<(), SyncError> {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = clock.sleep(period) => ()
            }
            if shutdown.is_cancelled() {
                return Ok(());
            }

            match self.push_replace().await {
                Ok(accepted) => debug!("Auto-sync pushed, remote accepted {accepted}"),
                Err(SyncError::Unauthorized) => {
                    warn!("Auto-sync lost authentication, stopping");
                    return Err(SyncError::Unauthorized);
                }
                Err(e) => warn!("Auto-sync push failed, retrying next tick: {e:?}"),
            }
        }
    }
}

/// Handle over the background auto-sync task. Arming it again replaces the previous
/// task instead of stacking a second timer.
#[derive(Default)]
pub struct AutoSync {
    token: Option<CancellationToken>,
    task: Option<JoinHandle<Result<(), SyncError>>>,
}

impl AutoSync {
    pub fn start<S, R>(
        &mut self,
        coordinator: Arc<SyncCoordinator<S, R>>,
        period: Duration,
        clock: Arc<dyn Clock>,
    ) where
        S: EntryStore + Send + Sync + 'static,
        R: RemoteStore + 'static,
    {
        self.stop();

        let token = CancellationToken::new();
        let child = token.clone();
        self.task = Some(tokio::spawn(async move {
            coordinator
                .run_auto_sync(period, child, clock.as_ref())
                .await
        }));
        self.token = Some(token);
    }

    /// Cancels the armed task. The task winds down on its own; any in-flight push
    /// completes, but no further one fires.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.token.is_some()
    }

    /// Detaches the running task for the caller to await, e.g. to observe an
    /// authentication failure.
    pub fn take_task(&mut self) -> Option<JoinHandle<Result<(), SyncError>>> {
        self.task.take()
    }
}
