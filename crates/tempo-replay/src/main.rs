//! tempo-replay: drive a TWAP oracle from a scripted price feed.
//!
//! Usage:
//!   tempo-replay <config.toml> <script.json>
//!
//! Each script step prints one JSON line to stdout. Logs go to stderr and
//! honour `RUST_LOG`.

mod config;
mod script;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempo_oracle::{AllowList, ScriptedSource, TwapOracle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, ReplayConfig};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let level = &logging.log_level;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("tempo_oracle={level}").parse()?)
                .add_directive(format!("tempo_replay={level}").parse()?),
        )
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(config_path), Some(script_path), None) = (args.next(), args.next(), args.next())
    else {
        anyhow::bail!("usage: tempo-replay <config.toml> <script.json>");
    };

    let config = ReplayConfig::load(&PathBuf::from(config_path))?;
    init_tracing(&config.logging)?;

    let steps = script::load(&PathBuf::from(script_path))?;
    info!(steps = steps.len(), "replay starting");

    let source = Arc::new(ScriptedSource::new("replay"));
    let authorizer = Arc::new(AllowList::new(config.admin.principals.clone()));
    let mut oracle = TwapOracle::new(config.oracle.clone(), source.clone(), authorizer)?;
    let mut events = oracle.events().subscribe();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (index, step) in steps.iter().enumerate() {
        let outcome = script::execute(&mut oracle, &source, index, step);
        serde_json::to_writer(&mut out, &outcome)?;
        writeln!(out)?;

        while let Ok(event) = events.try_recv() {
            info!(?event, "oracle event");
        }
    }
    out.flush()?;

    let snapshot = oracle.snapshot();
    info!(
        update_count = snapshot.update_count,
        phase = ?snapshot.phase,
        average = %snapshot.current_average,
        "replay finished"
    );
    Ok(())
}
