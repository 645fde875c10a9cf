use std::io;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::analysis::{
    BollingerPoint, ConvictionReading, CumulativeDelta, ExhaustionReading, OrderWall,
    RegressionLine, SimulationRequest, SimulationResult, VolumeBin,
};
use crate::config::EngineConfig;
use crate::config::engine::ROUTER_THREAD_NAME;
use crate::domain::Candle;

use super::error::DispatchError;
use super::messages::{JobId, JobKind, JobOutput, JobPayload, JobRequest, JobResponse};
use super::sink::JobSink;
use super::state::{PendingRequest, PendingTable};
use super::worker::ComputeContext;

/// The dispatch client. Cheap to share behind an `Arc`; every call is an
/// independent pending record, so concurrent calls interleave freely.
pub struct QuantEngine {
    /// `None` when the computation context never came up
    sink: Option<Arc<dyn JobSink>>,

    /// Outstanding calls, keyed by correlation id
    pending: Arc<PendingTable>,

    config: EngineConfig,
}

/// Removes the pending record if the awaiting call is dropped early.
struct PendingSlot<'a> {
    table: &'a PendingTable,
    id: JobId,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.table.remove(&self.id);
    }
}

impl QuantEngine {
    /// Spawn the computation context and its response router.
    /// If either thread cannot start, the engine comes up unavailable and every
    /// call fails fast with `DispatchError::Unavailable`.
    pub fn new(config: EngineConfig) -> Self {
        match Self::start(config) {
            Ok(engine) => engine,
            Err(e) => {
                log::warn!("Computation context failed to start ({}); engine calls will fall back", e);
                Self::unavailable(config)
            }
        }
    }

    fn start(config: EngineConfig) -> io::Result<Self> {
        let (context, responses) = ComputeContext::spawn(config)?;
        let pending = Arc::new(PendingTable::new());
        spawn_response_router(responses, pending.clone())?;

        Ok(Self {
            sink: Some(Arc::new(context)),
            pending,
            config,
        })
    }

    /// Dispatch through a caller-supplied transport. Responses must be fed
    /// back with [`QuantEngine::deliver`].
    pub fn with_sink(sink: Arc<dyn JobSink>, config: EngineConfig) -> Self {
        Self {
            sink: Some(sink),
            pending: Arc::new(PendingTable::new()),
            config,
        }
    }

    pub fn unavailable(config: EngineConfig) -> Self {
        Self {
            sink: None,
            pending: Arc::new(PendingTable::new()),
            config,
        }
    }

    /// Route a response to its waiting caller. Returns false if no caller is
    /// waiting for this id any more; the response is dropped.
    pub fn deliver(&self, response: JobResponse) -> bool {
        self.pending.complete(response)
    }

    pub async fn call(&self, payload: JobPayload) -> Result<JobOutput, DispatchError> {
        let kind = payload.kind().to_string();
        self.call_tagged(&kind, payload).await
    }

    /// Send a job under an arbitrary kind tag. Tags the context does not know
    /// come back as `DispatchError::UnknownKind`.
    pub async fn call_tagged(
        &self,
        kind: &str,
        payload: JobPayload,
    ) -> Result<JobOutput, DispatchError> {
        let Some(sink) = &self.sink else {
            return Err(DispatchError::Unavailable);
        };

        let id = JobId::new();
        let timeout_ms = self.config.dispatch.request_timeout_ms;
        let issued_at = Instant::now();
        let deadline = issued_at + Duration::from_millis(timeout_ms);
        let (reply_tx, mut reply_rx) = oneshot::channel();

        let record = PendingRequest::new(kind.to_string(), issued_at, deadline, reply_tx);
        if !self.pending.insert(id, record) {
            // Practically unreachable with random 128-bit ids
            return Err(DispatchError::AlgorithmFault(format!("duplicate job id {}", id)));
        }
        let _slot = PendingSlot {
            table: &self.pending,
            id,
        };

        sink.submit(JobRequest {
            id,
            kind: kind.to_string(),
            payload,
        })?;

        let waited = tokio::time::timeout_at(deadline, &mut reply_rx).await;
        match waited {
            Ok(Ok(outcome)) => outcome,
            // Record dropped without an answer (table torn down)
            Ok(Err(_)) => Err(DispatchError::Unavailable),
            Err(_) => {
                if let Some(record) = self.pending.remove(&id) {
                    log::warn!(
                        "Job {} ({}) timed out after {} ms",
                        id,
                        record.kind,
                        record.issued_at.elapsed().as_millis()
                    );
                    Err(DispatchError::Timeout {
                        kind: kind.to_string(),
                        after_ms: timeout_ms,
                    })
                } else {
                    // The response won the race against the deadline
                    reply_rx.await.unwrap_or(Err(DispatchError::Unavailable))
                }
            }
        }
    }

    // --- TYPED ENTRY POINTS ---

    pub async fn volume_profile(
        &self,
        candles: Vec<Candle>,
        bins: usize,
    ) -> Result<Vec<VolumeBin>, DispatchError> {
        match self.call(JobPayload::VolumeProfile { candles, bins }).await? {
            JobOutput::VolumeProfile(profile) => Ok(profile),
            other => Err(unexpected(JobKind::VolumeProfile, &other)),
        }
    }

    pub async fn fractal_dimension(&self, series: Vec<f64>) -> Result<f64, DispatchError> {
        match self.call(JobPayload::FractalDimension { series }).await? {
            JobOutput::FractalDimension(fdi) => Ok(fdi),
            other => Err(unexpected(JobKind::FractalDimension, &other)),
        }
    }

    pub async fn market_entropy(&self, series: Vec<f64>) -> Result<f64, DispatchError> {
        match self.call(JobPayload::MarketEntropy { series }).await? {
            JobOutput::MarketEntropy(entropy) => Ok(entropy),
            other => Err(unexpected(JobKind::MarketEntropy, &other)),
        }
    }

    pub async fn exhaustion(&self, z_score: f64) -> Result<ExhaustionReading, DispatchError> {
        match self.call(JobPayload::Exhaustion { z_score }).await? {
            JobOutput::Exhaustion(reading) => Ok(reading),
            other => Err(unexpected(JobKind::Exhaustion, &other)),
        }
    }

    /// Synthetic walls for display. Not derived from any order book.
    pub async fn order_heatmap(
        &self,
        price: f64,
        volatility: f64,
        seed: Option<u64>,
    ) -> Result<Vec<OrderWall>, DispatchError> {
        let payload = JobPayload::OrderHeatmap {
            price,
            volatility,
            seed,
        };
        match self.call(payload).await? {
            JobOutput::OrderHeatmap(walls) => Ok(walls),
            other => Err(unexpected(JobKind::OrderHeatmap, &other)),
        }
    }

    pub async fn cumulative_delta(
        &self,
        candles: Vec<Candle>,
    ) -> Result<CumulativeDelta, DispatchError> {
        match self.call(JobPayload::CumulativeDelta { candles }).await? {
            JobOutput::CumulativeDelta(delta) => Ok(delta),
            other => Err(unexpected(JobKind::CumulativeDelta, &other)),
        }
    }

    pub async fn institutional_conviction(
        &self,
        candles: Vec<Candle>,
        cumulative_delta: f64,
    ) -> Result<ConvictionReading, DispatchError> {
        let payload = JobPayload::InstitutionalConviction {
            candles,
            cumulative_delta,
        };
        match self.call(payload).await? {
            JobOutput::InstitutionalConviction(reading) => Ok(reading),
            other => Err(unexpected(JobKind::InstitutionalConviction, &other)),
        }
    }

    pub async fn kelly_criterion(
        &self,
        win_probability: f64,
        payoff_ratio: f64,
    ) -> Result<f64, DispatchError> {
        let payload = JobPayload::KellyCriterion {
            win_probability,
            payoff_ratio,
        };
        match self.call(payload).await? {
            JobOutput::KellyCriterion(fraction) => Ok(fraction),
            other => Err(unexpected(JobKind::KellyCriterion, &other)),
        }
    }

    pub async fn monte_carlo(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationResult, DispatchError> {
        match self.call(JobPayload::MonteCarlo(request)).await? {
            JobOutput::MonteCarlo(result) => Ok(result),
            other => Err(unexpected(JobKind::MonteCarlo, &other)),
        }
    }

    pub async fn simple_moving_average(
        &self,
        closes: Vec<f64>,
        period: usize,
    ) -> Result<Vec<Option<f64>>, DispatchError> {
        match self.call(JobPayload::SimpleMovingAverage { closes, period }).await? {
            JobOutput::SimpleMovingAverage(values) => Ok(values),
            other => Err(unexpected(JobKind::SimpleMovingAverage, &other)),
        }
    }

    pub async fn bollinger_bands(
        &self,
        closes: Vec<f64>,
        period: usize,
        multiplier: f64,
    ) -> Result<Vec<BollingerPoint>, DispatchError> {
        let payload = JobPayload::BollingerBands {
            closes,
            period,
            multiplier,
        };
        match self.call(payload).await? {
            JobOutput::BollingerBands(bands) => Ok(bands),
            other => Err(unexpected(JobKind::BollingerBands, &other)),
        }
    }

    pub async fn linear_regression(
        &self,
        series: Vec<f64>,
    ) -> Result<Option<RegressionLine>, DispatchError> {
        match self.call(JobPayload::LinearRegression { series }).await? {
            JobOutput::LinearRegression(line) => Ok(line),
            other => Err(unexpected(JobKind::LinearRegression, &other)),
        }
    }

    // --- TELEMETRY ---

    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status_msg(&self) -> Option<String> {
        if !self.is_available() {
            return Some("Engine unavailable".to_string());
        }
        let outstanding = self.pending.len();
        if outstanding == 0 {
            return None;
        }
        let overdue = self.pending.overdue(Instant::now());
        if overdue > 0 {
            Some(format!("Pending: {} ({} overdue)", outstanding, overdue))
        } else {
            Some(format!("Pending: {}", outstanding))
        }
    }
}

fn unexpected(expected: JobKind, got: &JobOutput) -> DispatchError {
    DispatchError::UnexpectedOutput {
        expected,
        got: got.kind(),
    }
}

/// Forwards every context response into the pending table. When the context
/// goes away, outstanding callers are failed immediately instead of waiting
/// out their deadlines.
fn spawn_response_router(rx: Receiver<JobResponse>, pending: Arc<PendingTable>) -> io::Result<()> {
    thread::Builder::new()
        .name(ROUTER_THREAD_NAME.to_string())
        .spawn(move || {
            while let Ok(response) = rx.recv() {
                pending.complete(response);
            }
            if !pending.is_empty() {
                log::warn!("Computation context closed; failing {} pending calls", pending.len());
            }
            pending.fail_all();
        })?;
    Ok(())
}
