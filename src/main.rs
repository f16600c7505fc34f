use anyhow::{Context, Result, anyhow};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use travel_sync_lib::domain::entities::offline::{DrainOutcome, SyncTrigger};
use travel_sync_lib::domain::value_objects::offline::DocumentKind;
use travel_sync_lib::infrastructure::notify::TracingSyncNotifier;
use travel_sync_lib::{AppConfig, SyncEngine, init_logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "travel-sync")]
#[command(about = "Offline mutation queue for travel-authorization documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database url (defaults to the per-user data directory)
    #[arg(long, global = true, env = "TRAVEL_SYNC_DATABASE_URL")]
    database_url: Option<String>,

    /// Base url of the document service
    #[arg(long, global = true, env = "TRAVEL_SYNC_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true, env = "JSON_LOGS")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a local change for delivery
    Enqueue {
        #[arg(long)]
        id: String,
        /// Document kind, e.g. REPORT or travel-order-draft
        #[arg(long)]
        kind: DocumentKind,
        /// JSON object with the document fields
        #[arg(long)]
        payload: String,
    },
    /// List entries still waiting for delivery
    Pending,
    /// Show queue counts
    Status,
    /// Drain the queue once
    Drain,
    /// List the read-only server mirror
    MirrorList,
    /// Delete synced entries older than the given age
    Prune {
        #[arg(long, default_value_t = 30)]
        older_than_days: i64,
    },
    /// Probe connectivity and drain whenever the service becomes reachable
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json_logs).map_err(|err| anyhow!(err))?;

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }
    if let Some(url) = cli.gateway_url.clone() {
        config.gateway.base_url = url.trim_end_matches('/').to_string();
    }

    let engine = SyncEngine::initialize_with_notifier(config, Arc::new(TracingSyncNotifier))
        .await
        .context("failed to open the offline store")?;

    let result = run(&engine, cli.command).await;
    engine.shutdown().await;
    result
}

async fn run(engine: &SyncEngine, command: Commands) -> Result<()> {
    match command {
        Commands::Enqueue { id, kind, payload } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("payload is not valid JSON")?;
            let entry = engine.queue.enqueue(&id, kind, payload).await?;
            print_json(&entry)?;
        }
        Commands::Pending => print_json(&engine.queue.list_pending().await?)?,
        Commands::Status => print_json(&engine.queue.status().await?)?,
        Commands::Drain => {
            let outcome = engine.orchestrator.request_sync(SyncTrigger::Manual).await?;
            report_outcome(&outcome)?;
        }
        Commands::MirrorList => print_json(&engine.mirror.list().await?)?,
        Commands::Prune { older_than_days } => {
            let cutoff = prune_cutoff(older_than_days)?;
            let removed = engine.queue.prune_synced(cutoff).await?;
            println!("removed {removed} synced entr{}", if removed == 1 { "y" } else { "ies" });
        }
        Commands::Watch => watch(engine).await?,
    }
    Ok(())
}

async fn watch(engine: &SyncEngine) -> Result<()> {
    let subscription = engine.attach_orchestrator();
    let probe = engine.spawn_probe()?;
    if probe.is_none() {
        // without a probe, assume online and drain once
        engine.connectivity.app_started(true);
    }

    info!("watching for connectivity changes; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    if let Some(handle) = probe {
        handle.abort();
    }
    engine.connectivity.unregister(subscription);
    print_json(&engine.orchestrator.metrics().snapshot())?;
    Ok(())
}

fn prune_cutoff(older_than_days: i64) -> Result<chrono::DateTime<Utc>> {
    TimeDelta::try_days(older_than_days.max(0))
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .ok_or_else(|| anyhow!("--older-than-days {older_than_days} is out of range"))
}

fn report_outcome(outcome: &DrainOutcome) -> Result<()> {
    match outcome {
        DrainOutcome::Coalesced => println!("a drain is already running"),
        DrainOutcome::Idle => println!("nothing to sync"),
        DrainOutcome::Completed(report) => {
            println!("{}", report.summary());
            print_json(report)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_cutoff_rejects_out_of_range_ages() {
        assert!(prune_cutoff(999_999_999_999_999).is_err());
        assert!(prune_cutoff(i64::MAX).is_err());
    }

    #[test]
    fn prune_cutoff_clamps_negative_ages_to_now() {
        let before = Utc::now();
        let cutoff = prune_cutoff(-5).unwrap();
        assert!(cutoff >= before);
        assert!(prune_cutoff(30).unwrap() < before);
    }
}
