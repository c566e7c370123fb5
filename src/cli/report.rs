use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};
use clap::Parser;

use crate::{
    storage::entry_store::EntryStore,
    tracker::{aggregate::hours_by_date_range, entry::Entry},
};

use super::{range::parse_range_date, AppContext};

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"15/03/2024\", \"last monday\", \"2 weeks ago\". Defaults to the first of the current month"
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of the range, same formats. Defaults to the last day of the current month"
    )]
    end_date: Option<String>,
    #[arg(long, help = "Write the CSV to this file instead of stdout")]
    out: Option<PathBuf>,
}

/// Command to process `report`. Produces one CSV row per calendar date in the range
/// with the weekday name and net hours, a weekly total row closing on each Sunday
/// (deliberately not the calendar view's Monday-start weeks), and a grand total.
pub async fn process_report_command(
    context: &AppContext,
    ReportCommand {
        start_date,
        end_date,
        out,
    }: ReportCommand,
) -> Result<()> {
    let (start, end) = resolve_range(start_date, end_date)?;

    let entries = context.store.read_all().await?;
    let daily = hours_by_date_range(&entries, start, end)?;
    let csv_text = build_report(&daily);

    write_output(&csv_text, out.as_deref())?;

    let in_range = entries
        .iter()
        .filter(|entry| entry.date >= start && entry.date <= end)
        .count();
    let grand_total: f64 = daily.iter().map(|(_, hours)| hours).sum();
    println!("Report generated: {in_range} entries, {grand_total:.2} hours total");
    Ok(())
}

/// Command to process `export`: the raw entry list as CSV, one row per entry.
/// Descriptions are free text, so this goes through a real CSV writer for quoting.
pub async fn process_export_command(
    context: &AppContext,
    start_date: Option<String>,
    end_date: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let (start, end) = resolve_range(start_date, end_date)?;

    let entries = context.store.read_all().await?;
    let selected = entries
        .iter()
        .filter(|entry| entry.date >= start && entry.date <= end)
        .collect::<Vec<_>>();
    let csv_text = build_export(&selected)?;

    write_output(&csv_text, out.as_deref())?;
    println!("Exported {} entries", selected.len());
    Ok(())
}

fn resolve_range(
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<(NaiveDate, NaiveDate)> {
    let first_of_month = Local::now()
        .date_naive()
        .with_day(1)
        .expect("the first always exists");
    let start = match start_date {
        Some(text) => parse_range_date(&text)?,
        None => first_of_month,
    };
    let end = match end_date {
        Some(text) => parse_range_date(&text)?,
        None => first_of_month + Months::new(1) - Days::new(1),
    };
    Ok((start, end))
}

fn write_output(csv_text: &str, out: Option<&std::path::Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, csv_text)?;
            println!("Written to {}", path.display());
        }
        None => print!("{csv_text}"),
    }
    Ok(())
}

/// The report rows carry no free text, and the week separators are raw blank lines,
/// so this is assembled by hand rather than through a CSV writer.
fn build_report(daily: &[(NaiveDate, f64)]) -> String {
    let mut csv = String::from("Date,Day,Hours Worked\n");

    let mut week_hours = 0.0;
    let mut week_number = 1;
    for (position, (date, hours)) in daily.iter().enumerate() {
        week_hours += hours;
        csv.push_str(&format!(
            "{},{},{hours:.2}\n",
            date.format("%Y-%m-%d"),
            date.format("%A"),
        ));

        if date.weekday() == Weekday::Sun || position == daily.len() - 1 {
            csv.push_str(&format!(",,Week {week_number} Total: {week_hours:.2}h\n"));
            csv.push('\n');
            week_number += 1;
            week_hours = 0.0;
        }
    }

    let grand_total: f64 = daily.iter().map(|(_, hours)| hours).sum();
    csv.push_str(&format!(",,Grand Total: {grand_total:.2}h\n"));
    csv
}

fn build_export(entries: &[&Entry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Start", "End", "Description", "Absence"])?;
    for entry in entries {
        writer.write_record([
            entry.date.format("%Y-%m-%d").to_string(),
            entry.start.format("%H:%M:%S").to_string(),
            entry.end.format("%H:%M:%S").to_string(),
            entry.description.clone(),
            entry.is_absence.to_string(),
        ])?;
    }
    Ok(String::from_utf8(writer.into_inner()?)?)
}
