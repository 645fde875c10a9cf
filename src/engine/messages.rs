use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::{
    BollingerPoint, ConvictionReading, CumulativeDelta, ExhaustionReading, OrderWall,
    RegressionLine, SimulationRequest, SimulationResult, VolumeBin,
};
use crate::domain::Candle;

/// Correlation token linking a request to its response. Random 128-bit, so
/// collision-free for the life of the process in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algorithm selector. The kebab-case form is the tag carried on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum JobKind {
    VolumeProfile,
    FractalDimension,
    MarketEntropy,
    Exhaustion,
    OrderHeatmap,
    CumulativeDelta,
    InstitutionalConviction,
    KellyCriterion,
    MonteCarlo,
    SimpleMovingAverage,
    BollingerBands,
    LinearRegression,
}

/// Algorithm-specific inputs. Owned by the request once sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobPayload {
    VolumeProfile { candles: Vec<Candle>, bins: usize },
    FractalDimension { series: Vec<f64> },
    MarketEntropy { series: Vec<f64> },
    Exhaustion { z_score: f64 },
    OrderHeatmap { price: f64, volatility: f64, seed: Option<u64> },
    CumulativeDelta { candles: Vec<Candle> },
    InstitutionalConviction { candles: Vec<Candle>, cumulative_delta: f64 },
    KellyCriterion { win_probability: f64, payoff_ratio: f64 },
    MonteCarlo(SimulationRequest),
    SimpleMovingAverage { closes: Vec<f64>, period: usize },
    BollingerBands { closes: Vec<f64>, period: usize, multiplier: f64 },
    LinearRegression { series: Vec<f64> },
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::VolumeProfile { .. } => JobKind::VolumeProfile,
            JobPayload::FractalDimension { .. } => JobKind::FractalDimension,
            JobPayload::MarketEntropy { .. } => JobKind::MarketEntropy,
            JobPayload::Exhaustion { .. } => JobKind::Exhaustion,
            JobPayload::OrderHeatmap { .. } => JobKind::OrderHeatmap,
            JobPayload::CumulativeDelta { .. } => JobKind::CumulativeDelta,
            JobPayload::InstitutionalConviction { .. } => JobKind::InstitutionalConviction,
            JobPayload::KellyCriterion { .. } => JobKind::KellyCriterion,
            JobPayload::MonteCarlo(_) => JobKind::MonteCarlo,
            JobPayload::SimpleMovingAverage { .. } => JobKind::SimpleMovingAverage,
            JobPayload::BollingerBands { .. } => JobKind::BollingerBands,
            JobPayload::LinearRegression { .. } => JobKind::LinearRegression,
        }
    }
}

/// Typed results, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobOutput {
    VolumeProfile(Vec<VolumeBin>),
    FractalDimension(f64),
    MarketEntropy(f64),
    Exhaustion(ExhaustionReading),
    OrderHeatmap(Vec<OrderWall>),
    CumulativeDelta(CumulativeDelta),
    InstitutionalConviction(ConvictionReading),
    KellyCriterion(f64),
    MonteCarlo(SimulationResult),
    SimpleMovingAverage(Vec<Option<f64>>),
    BollingerBands(Vec<BollingerPoint>),
    LinearRegression(Option<RegressionLine>),
}

impl JobOutput {
    pub fn kind(&self) -> JobKind {
        match self {
            JobOutput::VolumeProfile(_) => JobKind::VolumeProfile,
            JobOutput::FractalDimension(_) => JobKind::FractalDimension,
            JobOutput::MarketEntropy(_) => JobKind::MarketEntropy,
            JobOutput::Exhaustion(_) => JobKind::Exhaustion,
            JobOutput::OrderHeatmap(_) => JobKind::OrderHeatmap,
            JobOutput::CumulativeDelta(_) => JobKind::CumulativeDelta,
            JobOutput::InstitutionalConviction(_) => JobKind::InstitutionalConviction,
            JobOutput::KellyCriterion(_) => JobKind::KellyCriterion,
            JobOutput::MonteCarlo(_) => JobKind::MonteCarlo,
            JobOutput::SimpleMovingAverage(_) => JobKind::SimpleMovingAverage,
            JobOutput::BollingerBands(_) => JobKind::BollingerBands,
            JobOutput::LinearRegression(_) => JobKind::LinearRegression,
        }
    }
}

/// A job sent to the computation context.
/// Invariant: exactly one response is produced per request, carrying the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub id: JobId,
    /// Textual kind tag, parsed by the context
    pub kind: String,
    pub payload: JobPayload,
}

/// Failure reported by the context for a single job.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobFault {
    #[error("unknown job kind: {0}")]
    UnknownKind(String),

    #[error("{0}")]
    AlgorithmFault(String),
}

/// The reply returned by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: JobId,
    pub duration_ms: u128,
    pub result: Result<JobOutput, JobFault>,
}

impl JobResponse {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn kind_tags_round_trip_through_strings() {
        for kind in JobKind::iter() {
            let tag = kind.to_string();
            assert_eq!(JobKind::from_str(&tag).unwrap(), kind);
        }
        assert_eq!(JobKind::MonteCarlo.to_string(), "monte-carlo");
        assert!(JobKind::from_str("astrology").is_err());
    }

    #[test]
    fn job_ids_are_unique() {
        let ids: HashSet<JobId> = (0..1_000).map(|_| JobId::new()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn payload_reports_its_kind() {
        let payload = JobPayload::KellyCriterion {
            win_probability: 0.6,
            payoff_ratio: 2.0,
        };
        assert_eq!(payload.kind(), JobKind::KellyCriterion);
        assert_eq!(JobOutput::KellyCriterion(0.4).kind(), JobKind::KellyCriterion);
    }

    #[test]
    fn response_serializes_fault() {
        let response = JobResponse {
            id: JobId::new(),
            duration_ms: 3,
            result: Err(JobFault::UnknownKind("astrology".to_string())),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: JobResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
        assert!(!back.is_success());
    }
}
