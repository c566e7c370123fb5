use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use super::{entry::Entry, error::TrackerError, overlap::net_work_hours};

/// Net worked hours per calendar date. Dates without entries are absent from the
/// result; consumers treat missing dates as zero.
pub fn hours_by_date(entries: &[Entry]) -> BTreeMap<NaiveDate, f64> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.date).or_default().push(entry);
    }

    grouped
        .into_iter()
        .map(|(date, entries)| {
            let (absences, work): (Vec<&Entry>, Vec<&Entry>) =
                entries.into_iter().partition(|e| e.is_absence);
            (date, net_work_hours(&work, &absences))
        })
        .collect()
}

/// Net worked hours for every calendar date in the inclusive range. Unlike
/// [hours_by_date] the result is gap free so report rows line up day by day.
pub fn hours_by_date_range(
    entries: &[Entry],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, f64)>, TrackerError> {
    if start > end {
        return Err(TrackerError::InvalidRange { start, end });
    }

    let by_date = hours_by_date(entries);

    let mut result = vec![];
    let mut current = start;
    while current <= end {
        result.push((current, by_date.get(&current).copied().unwrap_or(0.0)));
        current = current
            .succ_opt()
            .expect("End of time should never happen");
    }
    Ok(result)
}

/// Monday of the week containing `date`. The calendar view groups weeks this way;
/// the CSV report intentionally closes its weekly subtotals on Sunday instead.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}
