use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the tracking core. Invariant violations are surfaced to the
/// caller immediately and never retried.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("a timer is already running")]
    SessionAlreadyRunning,

    #[error("no timer is running")]
    NoActiveSession,

    #[error("entry has no recorded start instant and cannot be resumed")]
    EntryNotResumable,

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("entry storage unavailable")]
    StorageUnavailable(#[source] std::io::Error),
}
