use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use crate::{
    storage::{entry_store::EntryStore, session_store::SessionStore},
    utils::clock::Clock,
};

use super::{entry::Entry, error::TrackerError};

/// The single in-progress timer. At most one exists at a time, across CLI
/// invocations; it lives in the [SessionStore] until `stop` converts it into a
/// durable [Entry].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningSession {
    pub start_at: NaiveDateTime,
    pub description: String,
}

impl RunningSession {
    /// Elapsed time as of `now`. Pure; polled for display. For a resumed session this
    /// includes the original entry's duration, since the session keeps its start.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        now - self.start_at
    }
}

/// Owns the running-session lifecycle: `Idle -> (start|resume) -> Running -> stop ->
/// Idle`. Starting or resuming while running is rejected, never queued, and `stop` is
/// the one place a session becomes a durable entry.
pub struct SessionManager<S: EntryStore> {
    entries: S,
    sessions: SessionStore,
    clock: Box<dyn Clock>,
}

impl<S: EntryStore> SessionManager<S> {
    pub fn new(entries: S, sessions: SessionStore, clock: Box<dyn Clock>) -> Self {
        Self {
            entries,
            sessions,
            clock,
        }
    }

    pub async fn running(&self) -> Result<Option<RunningSession>, TrackerError> {
        self.sessions.read().await
    }

    /// Elapsed time of the running session, or `None` when idle.
    pub async fn elapsed(&self) -> Result<Option<Duration>, TrackerError> {
        Ok(self
            .running()
            .await?
            .map(|session| session.elapsed(self.clock.now())))
    }

    pub async fn start(&self, description: &str) -> Result<RunningSession, TrackerError> {
        if self.sessions.read().await?.is_some() {
            return Err(TrackerError::SessionAlreadyRunning);
        }

        let session = RunningSession {
            start_at: self.clock.now(),
            description: description.to_string(),
        };
        self.sessions.write(&session).await?;
        debug!("Started timer at {}", session.start_at);
        Ok(session)
    }

    pub async fn stop(&self) -> Result<Entry, TrackerError> {
        let Some(session) = self.sessions.read().await? else {
            return Err(TrackerError::NoActiveSession);
        };

        let entry = Entry::from_instants(
            session.start_at,
            self.clock.now(),
            session.description,
            false,
        );

        let mut entries = self.entries.read_all().await?;
        entries.push(entry.clone());
        self.entries.write_all(&entries).await?;
        self.sessions.clear().await?;
        debug!("Stopped timer, recorded entry on {}", entry.date);
        Ok(entry)
    }

    /// Continues a past entry. The entry is removed from the repository and the new
    /// session keeps its original start, so the next `stop` re-adds it with an
    /// updated end time instead of duplicating it.
    pub async fn resume(&self, entry: &Entry) -> Result<RunningSession, TrackerError> {
        if self.sessions.read().await?.is_some() {
            return Err(TrackerError::SessionAlreadyRunning);
        }
        let Some(start_at) = entry.start_at else {
            return Err(TrackerError::EntryNotResumable);
        };

        let mut entries = self.entries.read_all().await?;
        match entries.iter().position(|existing| existing == entry) {
            Some(index) => {
                entries.remove(index);
                self.entries.write_all(&entries).await?;
            }
            None => warn!("Resumed entry is not in storage, nothing to remove"),
        }

        let session = RunningSession {
            start_at,
            description: entry.description.clone(),
        };
        self.sessions.write(&session).await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::tempdir;

    use crate::{
        storage::entry_store::JsonEntryStore,
        utils::clock::testing::FixedClock,
    };

    use super::*;

    const TEST_START: &str = "2024-05-06T09:00:00";

    fn test_start() -> NaiveDateTime {
        NaiveDateTime::parse_from_str(TEST_START, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn manager(
        dir: &std::path::Path,
        clock: FixedClock,
    ) -> SessionManager<JsonEntryStore> {
        SessionManager::new(
            JsonEntryStore::new(dir).unwrap(),
            SessionStore::new(dir).unwrap(),
            Box::new(clock),
        )
    }

    #[tokio::test]
    async fn start_then_stop_records_one_entry() {
        let dir = tempdir().unwrap();
        let clock = FixedClock::at(test_start());
        let manager = manager(dir.path(), clock.clone());

        manager.start("build feature").await.unwrap();
        clock.advance(Duration::hours(2));
        let entry = manager.stop().await.unwrap();

        assert_eq!(entry.start_at, Some(test_start()));
        assert_eq!(entry.end_at, Some(test_start() + Duration::hours(2)));
        assert_eq!(entry.description, "build feature");
        assert!(!entry.is_absence);

        let stored = JsonEntryStore::new(dir.path())
            .unwrap()
            .read_all()
            .await
            .unwrap();
        assert_eq!(stored, vec![entry]);
        assert_eq!(manager.running().await.unwrap(), None);
    }

    #[tokio::test]
    async fn start_while_running_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path(), FixedClock::at(test_start()));

        manager.start("first").await.unwrap();
        let second = manager.start("second").await;
        assert!(matches!(second, Err(TrackerError::SessionAlreadyRunning)));

        // the original session is untouched
        let running = manager.running().await.unwrap().unwrap();
        assert_eq!(running.description, "first");
    }

    #[tokio::test]
    async fn stop_without_session_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path(), FixedClock::at(test_start()));

        assert!(matches!(
            manager.stop().await,
            Err(TrackerError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn resume_removes_entry_and_stop_re_adds_it() {
        let dir = tempdir().unwrap();
        let clock = FixedClock::at(test_start() + Duration::hours(4));
        let manager = manager(dir.path(), clock.clone());

        let original = Entry::from_instants(
            test_start(),
            test_start() + Duration::hours(1),
            "interrupted work",
            false,
        );
        let store = JsonEntryStore::new(dir.path()).unwrap();
        store.write_all(std::slice::from_ref(&original)).await.unwrap();

        let session = manager.resume(&original).await.unwrap();
        assert_eq!(session.start_at, test_start());
        assert_eq!(store.read_all().await.unwrap(), vec![]);

        // elapsed covers the original duration plus time since resume
        assert_eq!(
            session.elapsed(clock.now()),
            Duration::hours(4)
        );

        clock.advance(Duration::minutes(30));
        let updated = manager.stop().await.unwrap();
        assert_eq!(updated.start_at, Some(test_start()));
        assert_eq!(
            updated.end_at,
            Some(test_start() + Duration::hours(4) + Duration::minutes(30))
        );
        assert_eq!(store.read_all().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn resume_without_recorded_start_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path(), FixedClock::at(test_start()));

        let entry = Entry::from_display_parts(
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            "from remote",
            false,
        );
        assert!(matches!(
            manager.resume(&entry).await,
            Err(TrackerError::EntryNotResumable)
        ));
    }

    #[tokio::test]
    async fn resume_while_running_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path(), FixedClock::at(test_start()));

        manager.start("busy").await.unwrap();
        let entry = Entry::from_instants(
            test_start(),
            test_start() + Duration::hours(1),
            "other",
            false,
        );
        assert!(matches!(
            manager.resume(&entry).await,
            Err(TrackerError::SessionAlreadyRunning)
        ));
    }

    #[tokio::test]
    async fn elapsed_is_none_when_idle() {
        let dir = tempdir().unwrap();
        let clock = FixedClock::at(test_start());
        let manager = manager(dir.path(), clock.clone());

        assert_eq!(manager.elapsed().await.unwrap(), None);

        manager.start("ticking").await.unwrap();
        clock.advance(Duration::seconds(90));
        assert_eq!(
            manager.elapsed().await.unwrap(),
            Some(Duration::seconds(90))
        );
    }
}
