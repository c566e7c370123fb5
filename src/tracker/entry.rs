use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// A recorded time interval. `date`, `start` and `end` are the display fields every
/// entry carries. `start_at`/`end_at` are the recorded absolute instants; they are
/// present when the entry was produced by the timer or constructed locally, and absent
/// for entries decoded from a remote payload, which only ships clock-time strings.
/// Only entries with a recorded start instant can be resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub description: String,
    pub is_absence: bool,
}

impl Entry {
    /// Builds an entry from recorded instants, deriving the display fields. The one
    /// constructor used when both instants are known, so instants and display fields
    /// can never disagree.
    pub fn from_instants(
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
        description: impl Into<String>,
        is_absence: bool,
    ) -> Self {
        Self {
            date: start_at.date(),
            start: start_at.time(),
            end: end_at.time(),
            start_at: Some(start_at),
            end_at: Some(end_at),
            description: description.into(),
            is_absence,
        }
    }

    /// Builds an entry from a calendar date and two clock times, recording the derived
    /// instants. Manually added entries go through here and stay resumable.
    pub fn from_local_parts(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        description: impl Into<String>,
        is_absence: bool,
    ) -> Self {
        Self::from_instants(date.and_time(start), date.and_time(end), description, is_absence)
    }

    /// Builds a display-only entry with no recorded instants. Used when decoding
    /// remote payloads; the result is not resumable.
    pub fn from_display_parts(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        description: impl Into<String>,
        is_absence: bool,
    ) -> Self {
        Self {
            date,
            start,
            end,
            start_at: None,
            end_at: None,
            description: description.into(),
            is_absence,
        }
    }

    /// Start instant used for all arithmetic, derived from the display fields when no
    /// instant was recorded.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start_at.unwrap_or_else(|| self.date.and_time(self.start))
    }

    /// End instant used for all arithmetic, derived like [Self::start_instant].
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end_at.unwrap_or_else(|| self.date.and_time(self.end))
    }

    /// Signed duration. Inverted entries yield a negative value; callers decide how
    /// to clamp.
    pub fn duration(&self) -> Duration {
        self.end_instant() - self.start_instant()
    }

    pub fn is_resumable(&self) -> bool {
        self.start_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn from_instants_derives_display_fields() {
        let start = date().and_hms_opt(9, 0, 0).unwrap();
        let end = date().and_hms_opt(17, 30, 0).unwrap();
        let entry = Entry::from_instants(start, end, "work", false);

        assert_eq!(entry.date, date());
        assert_eq!(entry.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(entry.end, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
        assert!(entry.is_resumable());
        assert_eq!(entry.duration(), Duration::hours(8) + Duration::minutes(30));
    }

    #[test]
    fn from_local_parts_records_derived_instants() {
        let entry = Entry::from_local_parts(
            date(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            "lunch meeting",
            false,
        );
        assert_eq!(entry.start_at, Some(date().and_hms_opt(13, 0, 0).unwrap()));
        assert_eq!(entry.end_at, Some(date().and_hms_opt(14, 0, 0).unwrap()));
    }

    #[test]
    fn display_only_entries_fall_back_for_arithmetic() {
        let entry = Entry::from_display_parts(
            date(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            "",
            false,
        );
        assert!(!entry.is_resumable());
        assert_eq!(entry.duration(), Duration::hours(3));
    }
}
