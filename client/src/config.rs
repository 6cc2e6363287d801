use std::time::Duration;

use clap::Parser;
use libgame::{rule::Rule, Universe, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Plays a toroidal Game of Life in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Universe width in cells
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Universe height in cells
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,

    /// Delay between frames in milliseconds
    #[arg(short, long, default_value_t = 500)]
    pub interval_ms: u64,

    /// Birth/survival rule in B/S notation
    #[arg(short, long, default_value = "B3/S23")]
    pub rule: Rule,

    /// Print this many frames without the console, then exit
    #[arg(short, long)]
    pub generations: Option<u64>,

    /// Start the console with the ticker stopped
    #[arg(long)]
    pub paused: bool,

    /// Clear the terminal before every frame
    #[arg(long)]
    pub clear_screen: bool,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn build_universe(&self) -> libgame::error::Result<Universe> {
        Universe::with_rule(self.width, self.height, self.rule.clone())
    }
}
