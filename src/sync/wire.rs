use anyhow::Result;
use tracing::warn;

use crate::{storage::entities::EntryRecord, tracker::entry::Entry};

/// Encodes an entry for the remote endpoint. The wire shape is the storage record
/// without the instant fields; the remote only ever sees clock-time strings.
pub fn to_payload(entry: &Entry) -> EntryRecord {
    EntryRecord {
        start_iso: None,
        end_iso: None,
        ..EntryRecord::from(entry)
    }
}

/// Decodes one remote record. The result never carries recorded instants, so pulled
/// entries are not resumable until recreated locally.
pub fn from_payload(record: &EntryRecord) -> Result<Entry> {
    let stripped = EntryRecord {
        start_iso: None,
        end_iso: None,
        ..record.clone()
    };
    stripped.to_entry()
}

/// Decodes a full remote entry list, skipping records that fail to parse.
pub fn entries_from_payload(records: &[EntryRecord]) -> Vec<Entry> {
    records
        .iter()
        .filter_map(|record| match from_payload(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping illegal remote entry: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    #[test]
    fn payload_strips_instants() {
        let entry = Entry::from_local_parts(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            "standup",
            false,
        );
        let payload = to_payload(&entry);
        assert_eq!(payload.start_iso, None);
        assert_eq!(payload.end_iso, None);
        assert_eq!(payload.date, "2024-02-01");
    }

    #[test]
    fn decoded_entries_are_not_resumable() {
        let record = EntryRecord {
            date: "2024-02-01".into(),
            start: "09:00".into(),
            end: "10:30".into(),
            description: "standup".into(),
            is_absence: false,
            // a remote that echoes instants back still must not make them resumable
            start_iso: Some("2024-02-01T09:00:00".into()),
            end_iso: Some("2024-02-01T10:30:00".into()),
        };
        let entry = from_payload(&record).unwrap();
        assert!(!entry.is_resumable());
        assert_eq!(entry.end, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn illegal_records_are_skipped() {
        let good = EntryRecord {
            date: "2024-02-01".into(),
            start: "09:00".into(),
            end: "10:00".into(),
            description: String::new(),
            is_absence: false,
            start_iso: None,
            end_iso: None,
        };
        let bad = EntryRecord {
            date: "yesterday".into(),
            ..good.clone()
        };
        assert_eq!(entries_from_payload(&[good, bad]).len(), 1);
    }
}
