//! Dispatch and algorithm configuration

use serde::{Deserialize, Serialize};

/// OS thread name given to the computation context
pub const WORKER_THREAD_NAME: &str = "quant-worker";

/// OS thread name given to the response router
pub const ROUTER_THREAD_NAME: &str = "quant-router";

/// Settings for the caller-side dispatch client
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    // Deadline applied to every call. Tunable per deployment, never per call.
    pub request_timeout_ms: u64,
}

/// Latency guards for the Monte Carlo routine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    // Hard cap on paths per request, whatever the caller asks for
    pub max_simulations: usize,
    // Hard cap on steps per path
    pub max_steps: usize,
}

/// Settings for the single-series statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSettings {
    // Below this length the Sevcik estimate is too noisy, so a neutral default is returned
    pub fractal_min_points: usize,
    pub fractal_default: f64,
}

/// Settings for the candle-direction heuristics and the synthetic heatmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderFlowSettings {
    // Fraction of each candle's volume attributed to the aggressor side
    pub delta_volume_fraction: f64,
    // Candles compared by the institutional conviction classifier
    pub conviction_lookback: usize,
    // Walls generated on each side of the synthetic heatmap
    pub heatmap_levels: usize,
    // Distance between consecutive walls, as a fraction of price (0.005 = 0.5%)
    pub heatmap_step_pct: f64,
}

/// The Master Engine Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub dispatch: DispatchSettings,
    pub simulation: SimulationSettings,
    pub series: SeriesSettings,
    pub order_flow: OrderFlowSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        ENGINE
    }
}

impl EngineConfig {
    pub fn with_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.dispatch.request_timeout_ms = request_timeout_ms;
        self
    }

    pub fn with_max_simulations(mut self, max_simulations: usize) -> Self {
        self.simulation.max_simulations = max_simulations;
        self
    }
}

pub const ENGINE: EngineConfig = EngineConfig {
    dispatch: DispatchSettings {
        request_timeout_ms: 5_000,
    },

    simulation: SimulationSettings {
        // Keeps worst-case latency predictable on small machines
        max_simulations: 50,
        max_steps: 5_000,
    },

    series: SeriesSettings {
        fractal_min_points: 30,
        fractal_default: 1.5,
    },

    order_flow: OrderFlowSettings {
        delta_volume_fraction: 0.6,
        conviction_lookback: 5,
        heatmap_levels: 10,
        heatmap_step_pct: 0.005,
    },
};
