use std::{
    io,
    sync::{Arc, PoisonError, RwLock, RwLockWriteGuard},
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use config::Config;
use libgame::Universe;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod ticker;

pub struct State {
    universe: Universe,
    ticker: Option<ticker::TickerHost>,
    interval: Duration,
    clear_screen: bool,
}

impl State {
    pub fn new(universe: Universe, interval: Duration, clear_screen: bool) -> Self {
        Self {
            universe,
            ticker: None,
            interval,
            clear_screen,
        }
    }
}

/// A panicking ticker must not take the console down with it, so poisoning
/// is ignored.
pub fn write_state(state_arc: &Arc<RwLock<State>>) -> RwLockWriteGuard<'_, State> {
    state_arc.write().unwrap_or_else(PoisonError::into_inner)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("client=info,libgame=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::parse();
    let mut universe = config.build_universe().context("Creating universe")?;

    info!(
        width = universe.width(),
        height = universe.height(),
        rule = %universe.rule(),
        "universe ready"
    );

    if let Some(generations) = config.generations {
        return ticker::run_headless(
            &mut universe,
            generations,
            config.interval(),
            config.clear_screen,
            &mut io::stdout().lock(),
        )
        .context("Writing frames");
    }

    let state_arc = Arc::new(RwLock::new(State::new(
        universe,
        config.interval(),
        config.clear_screen,
    )));

    if !config.paused {
        ticker::spawn_ticker(state_arc.clone());
    }

    cli::run_cli(state_arc.clone());
    ticker::stop_ticker(&state_arc);

    Ok(())
}
