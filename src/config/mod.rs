//! Configuration module for the quant engine.

pub mod engine;

mod debug; // Private: use crate::config::DEBUG_FLAGS, not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

// Re-export commonly used items
pub use engine::{
    DispatchSettings, ENGINE, EngineConfig, OrderFlowSettings, SeriesSettings, SimulationSettings,
    WORKER_THREAD_NAME,
};
