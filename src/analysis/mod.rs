// Pure numerical routines hosted by the computation context.
// No I/O and no shared state: every function works on the slices it is given.
pub mod complexity;
pub mod monte_carlo;
pub mod order_flow;
pub mod sizing;
pub mod trend;
pub mod volume_profile;

// Re-export commonly used types
pub use complexity::{fractal_dimension, shannon_entropy};
pub use monte_carlo::{
    SimulationPath, SimulationRequest, SimulationResult, SimulationSummary, monte_carlo,
};
pub use order_flow::{
    ConvictionReading, ConvictionSignal, CumulativeDelta, ExhaustionLevel, ExhaustionReading,
    OrderWall, WallSide, cumulative_delta, exhaustion_index, institutional_conviction,
    order_heatmap,
};
pub use sizing::kelly_criterion;
pub use trend::{
    BollingerPoint, RegressionLine, bollinger_bands, linear_regression, simple_moving_average,
};
pub use volume_profile::{VolumeBin, point_of_control, volume_profile};
