use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    tracker::{entry::Entry, session::RunningSession},
    utils::time::{clock_time_to_text, parse_clock_time},
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The struct used for storing entries on disk, and (without the instant fields) the
/// shape shipped over the wire. Clock times are kept as display strings so the file
/// stays hand-readable; the optional `*_iso` instants are what make an entry
/// resumable after a round trip through storage.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct EntryRecord {
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_absence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_iso: Option<String>,
}

impl From<&Entry> for EntryRecord {
    fn from(entry: &Entry) -> Self {
        EntryRecord {
            date: entry.date.format(DATE_FORMAT).to_string(),
            start: clock_time_to_text(entry.start),
            end: clock_time_to_text(entry.end),
            description: entry.description.clone(),
            is_absence: entry.is_absence,
            start_iso: entry.start_at.map(instant_to_text),
            end_iso: entry.end_at.map(instant_to_text),
        }
    }
}

impl EntryRecord {
    /// Decodes the record into an [Entry]. Instants are taken over only when both are
    /// present; a lone one is dropped rather than mixed with derived values.
    pub fn to_entry(&self) -> Result<Entry> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| anyhow!("unrecognized date '{}': {e}", self.date))?;
        let start = parse_clock_time(&self.start)
            .ok_or_else(|| anyhow!("unrecognized start time '{}'", self.start))?;
        let end = parse_clock_time(&self.end)
            .ok_or_else(|| anyhow!("unrecognized end time '{}'", self.end))?;

        let start_at = self.start_iso.as_deref().map(parse_instant).transpose()?;
        let end_at = self.end_iso.as_deref().map(parse_instant).transpose()?;

        Ok(match (start_at, end_at) {
            (Some(start_at), Some(end_at)) => {
                Entry::from_instants(start_at, end_at, self.description.clone(), self.is_absence)
            }
            _ => Entry::from_display_parts(
                date,
                start,
                end,
                self.description.clone(),
                self.is_absence,
            ),
        })
    }
}

/// On-disk form of the single running timer session.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct RunningRecord {
    pub start_iso: String,
    #[serde(default)]
    pub description: String,
}

impl From<&RunningSession> for RunningRecord {
    fn from(session: &RunningSession) -> Self {
        RunningRecord {
            start_iso: instant_to_text(session.start_at),
            description: session.description.clone(),
        }
    }
}

impl RunningRecord {
    pub fn to_session(&self) -> Result<RunningSession> {
        Ok(RunningSession {
            start_at: parse_instant(&self.start_iso)?,
            description: self.description.clone(),
        })
    }
}

fn instant_to_text(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, INSTANT_FORMAT)
        .map_err(|e| anyhow!("unrecognized instant '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn sample_entry() -> Entry {
        Entry::from_local_parts(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            "release prep",
            false,
        )
    }

    #[test]
    fn entry_round_trips_with_instants() {
        let entry = sample_entry();
        let record = EntryRecord::from(&entry);
        assert_eq!(record.start_iso.as_deref(), Some("2024-03-15T09:00:00"));
        assert_eq!(record.to_entry().unwrap(), entry);
    }

    #[test]
    fn record_without_instants_decodes_display_only() {
        let record = EntryRecord {
            date: "2024-03-15".into(),
            start: "09:00".into(),
            end: "17:00".into(),
            description: String::new(),
            is_absence: true,
            start_iso: None,
            end_iso: None,
        };
        let entry = record.to_entry().unwrap();
        assert!(!entry.is_resumable());
        assert!(entry.is_absence);
        assert_eq!(entry.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn lone_instant_is_not_mixed_in() {
        let record = EntryRecord {
            date: "2024-03-15".into(),
            start: "09:00:00".into(),
            end: "17:00:00".into(),
            description: String::new(),
            is_absence: false,
            start_iso: Some("2024-03-15T09:00:00".into()),
            end_iso: None,
        };
        assert!(!record.to_entry().unwrap().is_resumable());
    }

    #[test]
    fn garbage_times_are_rejected() {
        let record = EntryRecord {
            date: "2024-03-15".into(),
            start: "nine".into(),
            end: "17:00:00".into(),
            description: String::new(),
            is_absence: false,
            start_iso: None,
            end_iso: None,
        };
        assert!(record.to_entry().is_err());
    }
}
