use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::warn;

use crate::{
    sync::{remote::HttpRemoteStore, AutoSync},
    utils::clock::SystemClock,
};

use super::AppContext;

pub async fn login(context: &AppContext, username: &str, pin: &str) -> Result<()> {
    let url = context
        .config
        .remote_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no remote configured, set remote_url first"))?;

    // a fresh client without the (possibly stale) stored cookie
    let remote = HttpRemoteStore::new(url, None)?;
    let cookie = remote.login(username, pin).await?;

    let mut config = context.config.clone();
    config.session_cookie = Some(cookie);
    config.save(&context.app_dir)?;

    println!("Logged in as {username}");
    Ok(())
}

pub fn logout(context: &AppContext) -> Result<()> {
    let mut config = context.config.clone();
    config.session_cookie = None;
    config.save(&context.app_dir)?;

    println!("Logged out");
    Ok(())
}

pub async fn push(context: &AppContext) -> Result<()> {
    let accepted = context.coordinator()?.push_replace().await?;
    println!("Saved {accepted} entries to the remote");
    Ok(())
}

pub async fn pull(context: &AppContext) -> Result<()> {
    let count = context.coordinator()?.pull_replace().await?;
    println!("Loaded {count} entries from the remote");
    Ok(())
}

/// Runs auto-sync in the foreground: one initial pull, then a push every period
/// until Ctrl-C. Lost authentication ends the loop with an error so the user knows
/// to log in again.
pub async fn watch(context: &AppContext, interval: Option<u64>) -> Result<()> {
    let period = Duration::from_secs(interval.unwrap_or(context.config.sync_interval_secs));
    let coordinator = Arc::new(context.coordinator()?);

    match coordinator.pull_replace().await {
        Ok(count) => println!("Loaded {count} entries from the remote"),
        Err(e) => warn!("Initial pull failed, keeping local entries: {e:?}"),
    }

    let mut auto_sync = AutoSync::default();
    auto_sync.start(coordinator, period, Arc::new(SystemClock));
    let mut task = auto_sync.take_task().expect("auto-sync was just armed");
    println!(
        "Pushing to the remote every {}s, press Ctrl-C to stop",
        period.as_secs()
    );

    tokio::select! {
        result = &mut task => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            auto_sync.stop();
            let _ = task.await;
            println!("Stopped");
        }
    }
    Ok(())
}

/// Mutating commands push silently when a remote session exists. Failures are
/// reported but never affect the local write.
pub async fn push_after_mutation(context: &AppContext) {
    if context.config.remote_url.is_none() || context.config.session_cookie.is_none() {
        return;
    }

    let result = match context.coordinator() {
        Ok(coordinator) => coordinator.push_replace().await.map(|_| ()),
        Err(e) => {
            warn!("Could not build remote client for auto-save: {e:?}");
            return;
        }
    };
    if let Err(e) = result {
        eprintln!("Warning: entry saved locally, but syncing to the remote failed: {e}");
    }
}
