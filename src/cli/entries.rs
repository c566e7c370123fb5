use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Parser;

use crate::{
    storage::entry_store::EntryStore,
    tracker::entry::Entry,
    utils::time::parse_clock_time,
};

use super::{range::parse_range_date, sync, timer::describe, AppContext};

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(long, help = "Calendar date as YYYY-MM-DD. Defaults to today")]
    date: Option<NaiveDate>,
    #[arg(long, help = "Start time as HH:MM or HH:MM:SS")]
    start: String,
    #[arg(long, help = "End time as HH:MM or HH:MM:SS")]
    end: String,
    #[arg(long, default_value = "", help = "What the time was spent on")]
    description: String,
    #[arg(long, help = "Record an absence (vacation, leave) instead of work time")]
    absence: bool,
}

#[derive(Debug, Parser)]
pub struct EditCommand {
    #[arg(help = "Entry index as printed by `list`")]
    index: usize,
    #[arg(long, help = "New calendar date as YYYY-MM-DD")]
    date: Option<NaiveDate>,
    #[arg(long, help = "New start time as HH:MM or HH:MM:SS")]
    start: Option<String>,
    #[arg(long, help = "New end time as HH:MM or HH:MM:SS")]
    end: Option<String>,
    #[arg(long, help = "New description")]
    description: Option<String>,
    #[arg(long, help = "Whether the entry is an absence")]
    absence: Option<bool>,
}

#[derive(Debug, Parser)]
pub struct ListCommand {
    #[arg(
        long = "start",
        short,
        help = "Only show entries from this date on. Examples are \"15/03/2024\", \"last monday\", \"2 weeks ago\""
    )]
    start_date: Option<String>,
    #[arg(long = "end", short, help = "Only show entries up to this date")]
    end_date: Option<String>,
}

pub async fn add(context: &AppContext, command: AddCommand) -> Result<()> {
    let date = command
        .date
        .unwrap_or_else(|| Local::now().date_naive());
    let entry = Entry::from_local_parts(
        date,
        clock_time(&command.start)?,
        clock_time(&command.end)?,
        command.description,
        command.absence,
    );

    let mut entries = context.store.read_all().await?;
    entries.push(entry);
    context.store.write_all(&entries).await?;

    println!("Entry added ({} total)", entries.len());
    sync::push_after_mutation(context).await;
    Ok(())
}

pub async fn edit(context: &AppContext, command: EditCommand) -> Result<()> {
    let mut entries = context.store.read_all().await?;
    let existing = entries
        .get(command.index)
        .ok_or_else(|| anyhow!("no entry with index {}, see `list`", command.index))?;

    // Untouched fields carry over; the edited entry gets freshly derived instants
    // either way, so editing a pulled entry makes it resumable again.
    let updated = Entry::from_local_parts(
        command.date.unwrap_or(existing.date),
        match &command.start {
            Some(text) => clock_time(text)?,
            None => existing.start,
        },
        match &command.end {
            Some(text) => clock_time(text)?,
            None => existing.end,
        },
        command
            .description
            .unwrap_or_else(|| existing.description.clone()),
        command.absence.unwrap_or(existing.is_absence),
    );

    entries[command.index] = updated;
    context.store.write_all(&entries).await?;

    println!("Entry {} updated", command.index);
    sync::push_after_mutation(context).await;
    Ok(())
}

pub async fn delete(context: &AppContext, index: usize) -> Result<()> {
    let mut entries = context.store.read_all().await?;
    if index >= entries.len() {
        return Err(anyhow!("no entry with index {index}, see `list`"));
    }

    let deleted = entries.remove(index);
    context.store.write_all(&entries).await?;

    // print what was removed so it can be re-added by hand if needed
    println!(
        "Deleted {} · {}–{} · {}",
        deleted.date,
        deleted.start.format("%H:%M:%S"),
        deleted.end.format("%H:%M:%S"),
        describe(&deleted.description),
    );
    sync::push_after_mutation(context).await;
    Ok(())
}

pub async fn list(context: &AppContext, command: ListCommand) -> Result<()> {
    let start = command
        .start_date
        .as_deref()
        .map(parse_range_date)
        .transpose()?;
    let end = command.end_date.as_deref().map(parse_range_date).transpose()?;

    let entries = context.store.read_all().await?;
    let mut shown = 0;
    for (index, entry) in entries.iter().enumerate() {
        if start.is_some_and(|s| entry.date < s) || end.is_some_and(|e| entry.date > e) {
            continue;
        }
        shown += 1;
        println!(
            "{index:>3}  {} · {}–{} · {:<7} · {}",
            entry.date,
            entry.start.format("%H:%M:%S"),
            entry.end.format("%H:%M:%S"),
            if entry.is_absence { "absence" } else { "work" },
            describe(&entry.description),
        );
    }

    if shown == 0 {
        println!("No entries");
    }
    Ok(())
}

fn clock_time(text: &str) -> Result<NaiveTime> {
    parse_clock_time(text)
        .ok_or_else(|| anyhow!("Can't parse '{text}' as a time, expected HH:MM or HH:MM:SS"))
}
