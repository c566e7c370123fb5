use anyhow::{anyhow, Result};

use crate::{storage::entry_store::EntryStore, utils::time::format_duration};

use super::{sync, AppContext};

pub async fn start(context: &AppContext, description: &str) -> Result<()> {
    let session = context.session_manager()?.start(description).await?;
    println!("Timer started at {}", session.start_at.format("%H:%M:%S"));
    Ok(())
}

pub async fn stop(context: &AppContext) -> Result<()> {
    let entry = context.session_manager()?.stop().await?;
    println!(
        "Recorded {} · {}–{} · {} · {}",
        entry.date,
        entry.start.format("%H:%M:%S"),
        entry.end.format("%H:%M:%S"),
        format_duration(entry.duration()),
        describe(&entry.description),
    );
    sync::push_after_mutation(context).await;
    Ok(())
}

pub async fn status(context: &AppContext) -> Result<()> {
    let manager = context.session_manager()?;
    match manager.running().await? {
        Some(session) => {
            let elapsed = manager
                .elapsed()
                .await?
                .unwrap_or_else(chrono::Duration::zero);
            println!(
                "Running: {} · started {} · elapsed {}",
                describe(&session.description),
                session.start_at.format("%Y-%m-%d %H:%M:%S"),
                format_duration(elapsed),
            );
        }
        None => println!("No timer running"),
    }
    Ok(())
}

pub async fn resume(context: &AppContext, index: usize) -> Result<()> {
    let entries = context.store.read_all().await?;
    let entry = entries
        .get(index)
        .ok_or_else(|| anyhow!("no entry with index {index}, see `list`"))?;

    let session = context.session_manager()?.resume(entry).await?;
    println!(
        "Resumed {} · timer running since {}",
        describe(&session.description),
        session.start_at.format("%Y-%m-%d %H:%M:%S"),
    );
    Ok(())
}

pub(crate) fn describe(description: &str) -> &str {
    if description.is_empty() {
        "(no description)"
    } else {
        description
    }
}
