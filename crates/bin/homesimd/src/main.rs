//! # homesimd — homesim daemon
//!
//! Composition root that wires the in-memory home to the application
//! services and drives the scheduler clock.
//!
//! ## Responsibilities
//! - Load configuration (`homesim.toml` + env vars)
//! - Initialize `tracing-subscriber` with the configured filter
//! - Load the seed home into the in-memory repository
//! - Tick the schedule service on a fixed interval
//! - Log every published event
//! - Stop on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

use std::sync::Arc;

use anyhow::Context;
use homesim_app::event_bus::InProcessEventBus;
use homesim_app::home::Home;
use homesim_app::services::schedule_service::ScheduleService;
use homesim_domain::time::now;
use homesimd::config::Config;
use homesimd::seed::Seed;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let seed = Seed::load(config.home.seed_file.as_deref()).context("loading seed home")?;
    tracing::info!(devices = seed.devices.len(), "home loaded");

    let home = Arc::new(Home::with_devices(seed.devices));
    let event_bus = Arc::new(InProcessEventBus::default());
    let schedules = ScheduleService::new(Arc::clone(&home), Arc::clone(&event_bus));

    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(
                    kind = ?event.kind,
                    device = ?event.device_id,
                    command = ?event.command,
                    "event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut interval = tokio::time::interval(config.tick_interval());
    tracing::info!(every = ?config.tick_interval(), "scheduler started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match schedules.tick(now()).await {
                    Ok(report) if !report.is_empty() => {
                        tracing::debug!(firings = report.firings.len(), "tick");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "tick failed"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("waiting for ctrl-c")?;
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
