use std::collections::BTreeMap;

use ansi_term::Style;
use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Local, Months, NaiveDate};

use crate::{
    storage::entry_store::EntryStore,
    tracker::aggregate::{hours_by_date, week_start},
};

use super::AppContext;

/// Shows a month grid, Monday through Sunday, with net hours per day and a weekly
/// total column.
pub async fn show(context: &AppContext, month: Option<&str>) -> Result<()> {
    let today = Local::now().date_naive();
    let first = match month {
        Some(text) => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
            .map_err(|e| anyhow!("Can't parse \"{text}\" as a month, expected YYYY-MM: {e}"))?,
        None => today.with_day(1).expect("the first always exists"),
    };

    let entries = context.store.read_all().await?;
    let hours = hours_by_date(&entries);

    print!("{}", render_month(first, &hours, today));
    Ok(())
}

fn render_month(first: NaiveDate, hours: &BTreeMap<NaiveDate, f64>, today: NaiveDate) -> String {
    let last = last_day_of_month(first);

    let mut out = String::new();
    out.push_str(&format!("{:^66}\n", first.format("%B %Y")));
    out.push_str("      Mon      Tue      Wed      Thu      Fri      Sat      Sun |   Week\n");

    let mut current = week_start(first);
    while current <= last {
        let mut week_hours = 0.0;
        let mut line = String::new();
        for _ in 0..7 {
            if current.month() == first.month() {
                let day_hours = hours.get(&current).copied().unwrap_or(0.0);
                week_hours += day_hours;
                line.push_str(&render_day(current, day_hours, today));
            } else {
                // leading or trailing days belong to a neighboring month
                line.push_str(&" ".repeat(9));
            }
            current = current + Days::new(1);
        }
        out.push_str(&format!("{line} | {week_hours:>5.1}h\n"));
    }
    out
}

fn render_day(date: NaiveDate, day_hours: f64, today: NaiveDate) -> String {
    let hours_text = if day_hours != 0.0 {
        format!("{day_hours:.1}h")
    } else {
        String::new()
    };

    let cell = format!("{:>3}{hours_text:>6}", date.day());
    if date == today {
        Style::new().bold().reverse().paint(cell).to_string()
    } else if !hours_text.is_empty() {
        ansi_term::Colour::Green.paint(cell).to_string()
    } else {
        cell
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    first + Months::new(1) - Days::new(1)
}
