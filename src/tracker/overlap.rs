use chrono::Duration;

use super::entry::Entry;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Net worked hours for one day, given that day's work and absence entries.
///
/// Each work entry contributes its raw duration, floored at zero for inverted ranges.
/// Every absence entry that overlaps a work entry subtracts its own overlapping slice;
/// absences that overlap each other are not deduplicated, so shared spans are
/// subtracted once per absence. The summed total is not floored, and a day comes out
/// negative when absences exceed the work they overlap.
pub fn net_work_hours(work: &[&Entry], absences: &[&Entry]) -> f64 {
    let mut total = 0.0;

    for work_entry in work {
        let mut hours = hours_of(work_entry.duration().max(Duration::zero()));

        for absence in absences {
            let overlap_start = work_entry.start_instant().max(absence.start_instant());
            let overlap_end = work_entry.end_instant().min(absence.end_instant());
            if overlap_start < overlap_end {
                hours -= hours_of(overlap_end - overlap_start);
            }
        }

        total += hours;
    }

    total
}

fn hours_of(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / (SECONDS_PER_HOUR * 1000.0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn entry(start: (u32, u32), end: (u32, u32), is_absence: bool) -> Entry {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Entry::from_local_parts(
            date,
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            "",
            is_absence,
        )
    }

    #[test]
    fn no_absence_yields_raw_duration() {
        let work = entry((9, 0), (17, 0), false);
        assert_eq!(net_work_hours(&[&work], &[]), 8.0);
    }

    #[test]
    fn disjoint_absence_subtracts_nothing() {
        let work = entry((9, 0), (12, 0), false);
        let absence = entry((13, 0), (14, 0), true);
        assert_eq!(net_work_hours(&[&work], &[&absence]), 3.0);
    }

    #[test]
    fn contained_absence_subtracts_its_duration() {
        let work = entry((9, 0), (17, 0), false);
        let absence = entry((12, 0), (13, 0), true);
        assert_eq!(net_work_hours(&[&work], &[&absence]), 7.0);
    }

    #[test]
    fn partially_overlapping_absence_subtracts_only_the_overlap() {
        let work = entry((9, 0), (12, 0), false);
        let absence = entry((11, 0), (14, 0), true);
        assert_eq!(net_work_hours(&[&work], &[&absence]), 2.0);
    }

    #[test]
    fn each_absence_subtracts_independently_on_disjoint_spans() {
        let work = entry((9, 0), (17, 0), false);
        let first = entry((10, 0), (11, 0), true);
        let second = entry((14, 0), (15, 30), true);
        assert_eq!(net_work_hours(&[&work], &[&first, &second]), 5.5);
    }

    #[test]
    fn mutually_overlapping_absences_double_subtract() {
        // 12:00-13:00 and 12:30-13:30 share half an hour; both slices are
        // subtracted in full.
        let work = entry((9, 0), (17, 0), false);
        let first = entry((12, 0), (13, 0), true);
        let second = entry((12, 30), (13, 30), true);
        assert_eq!(net_work_hours(&[&work], &[&first, &second]), 6.0);
    }

    #[test]
    fn inverted_work_range_counts_as_zero() {
        let work = entry((17, 0), (9, 0), false);
        assert_eq!(net_work_hours(&[&work], &[]), 0.0);
    }

    #[test]
    fn total_is_not_floored_at_zero() {
        // A one hour shift fully covered by a longer absence goes negative by the
        // absence span beyond the raw duration floor applied per work entry.
        let work = entry((9, 0), (10, 0), false);
        let full = entry((9, 0), (10, 0), true);
        let extra = entry((9, 30), (10, 0), true);
        assert_eq!(net_work_hours(&[&work], &[&full, &extra]), -0.5);
    }

    #[test]
    fn sums_across_work_entries() {
        let morning = entry((9, 0), (12, 0), false);
        let afternoon = entry((13, 0), (17, 0), false);
        let pause = entry((16, 0), (16, 30), true);
        assert_eq!(net_work_hours(&[&morning, &afternoon], &[&pause]), 6.5);
    }
}
