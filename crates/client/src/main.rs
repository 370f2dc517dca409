//! Headless driver entry point.
//!
//! Wires configuration, logging, settings and a [`Session`] together, then
//! prints snapshots to stdout until the requested number was reported, the
//! engine faults, or the process is interrupted.
mod config;
mod report;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

use craps_core::Snapshot;
use craps_runtime::{
    BatchSizeSettings, EngineConfig, EngineError, Session, SettingsSource, SimulationEngine,
};

use config::{ClientConfig, RunMode};
use report::Report;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine_config = EngineConfig::from_env();
    let config = ClientConfig::from_env();

    let settings = BatchSizeSettings::new(engine_config.batch_exponent)
        .context("invalid CRAPS_BATCH_EXPONENT")?;
    let engine = SimulationEngine::builder().config(engine_config).build()?;

    info!(
        mode = ?config.mode,
        batches = config.batches,
        batch_size = %settings.batch_size(),
        "starting simulation"
    );

    let mut session = Session::new(engine, settings);
    let mut snapshots = session.snapshot();
    let mut errors = session.error();
    session.attach();

    let result = drive(&session, &config, &mut snapshots, &mut errors).await;

    session.stop();
    session.detach();

    let totals = session.engine().current_snapshot();
    info!(
        rounds = totals.rounds(),
        wins = totals.wins(),
        losses = totals.losses(),
        "simulation finished"
    );

    result
}

async fn drive(
    session: &Session<BatchSizeSettings>,
    config: &ClientConfig,
    snapshots: &mut watch::Receiver<Snapshot>,
    errors: &mut watch::Receiver<Option<EngineError>>,
) -> Result<()> {
    if config.mode == RunMode::Continuous {
        session.run_fast();
    }

    let mut reported = 0;
    while reported < config.batches {
        if config.mode == RunMode::Once {
            session.run_once();
        }

        tokio::select! {
            changed = snapshots.changed() => {
                changed.context("session closed")?;
                let snapshot = snapshots.borrow_and_update().clone();
                reported += 1;
                println!("{}", Report::new(reported, &snapshot).render(config.output)?);
            }
            changed = errors.changed() => {
                changed.context("session closed")?;
                if let Some(error) = errors.borrow_and_update().clone() {
                    return Err(error).context("simulation failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    Ok(())
}
