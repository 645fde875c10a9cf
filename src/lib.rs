#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod domain;
pub mod utils;

// The dispatch client and computation context
pub mod engine;

// Re-export commonly used types
pub use config::{ENGINE, EngineConfig};
pub use domain::{Candle, CandleType};
pub use engine::{DispatchError, JobKind, JobOutput, JobPayload, QuantEngine};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job kind tag to run (e.g. `monte-carlo`), or `all`
    #[arg(long, default_value = "all")]
    pub job: String,

    /// Number of synthetic candles to generate
    #[arg(long, default_value_t = 240)]
    pub points: usize,

    /// Seed for the synthetic series and the randomized routines
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-call deadline in milliseconds
    #[arg(long, default_value_t = ENGINE.dispatch.request_timeout_ms)]
    pub timeout_ms: u64,

    /// Monte Carlo path cap enforced by the computation context
    #[arg(long, default_value_t = ENGINE.simulation.max_simulations)]
    pub max_simulations: usize,

    /// Monte Carlo paths requested by the demo
    #[arg(long, default_value_t = 200)]
    pub simulations: usize,
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        ENGINE
            .with_timeout_ms(self.timeout_ms)
            .with_max_simulations(self.max_simulations)
    }
}
