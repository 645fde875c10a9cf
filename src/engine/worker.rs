use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Instant;

use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::analysis::{
    bollinger_bands, cumulative_delta, exhaustion_index, fractal_dimension,
    institutional_conviction, kelly_criterion, linear_regression, monte_carlo, order_heatmap,
    shannon_entropy, simple_moving_average, volume_profile,
};
use crate::config::{DEBUG_FLAGS, EngineConfig, WORKER_THREAD_NAME};

use super::error::DispatchError;
use super::messages::{JobFault, JobKind, JobOutput, JobPayload, JobRequest, JobResponse};
use super::sink::JobSink;

/// Handle to the isolated computation context: one OS thread that runs jobs
/// strictly in arrival order and answers each with exactly one response.
pub struct ComputeContext {
    job_tx: Sender<JobRequest>,
}

impl ComputeContext {
    /// Spawn the worker thread. Responses come back on the returned receiver.
    pub fn spawn(config: EngineConfig) -> io::Result<(Self, Receiver<JobResponse>)> {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (result_tx, result_rx) = channel::<JobResponse>();

        spawn_worker_thread(job_rx, result_tx, config)?;

        Ok((Self { job_tx }, result_rx))
    }
}

impl JobSink for ComputeContext {
    fn submit(&self, request: JobRequest) -> Result<(), DispatchError> {
        // A closed channel means the worker thread is gone
        self.job_tx
            .send(request)
            .map_err(|_| DispatchError::Unavailable)
    }
}

pub fn spawn_worker_thread(
    rx: Receiver<JobRequest>,
    tx: Sender<JobResponse>,
    config: EngineConfig,
) -> io::Result<()> {
    thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            log::info!("Computation context started");
            while let Ok(req) = rx.recv() {
                let start = Instant::now();
                let id = req.id;
                let kind = req.kind.clone();

                let result = process_request(req, &config);
                let elapsed = start.elapsed().as_millis();

                if let Err(fault) = &result {
                    log::error!("Job {} ({}) failed: {}", id, kind, fault);
                } else if DEBUG_FLAGS.print_job_timings {
                    log::info!("Job {} ({}) finished in {} ms", id, kind, elapsed);
                }

                let response = JobResponse {
                    id,
                    duration_ms: elapsed,
                    result,
                };
                // Nobody is listening any more: the engine is shutting down.
                if tx.send(response).is_err() {
                    break;
                }
            }
            log::info!("Computation context stopped");
        })?;
    Ok(())
}

/// Parse the tag, run the routine, and turn every failure (including panics)
/// into a fault for this job only.
pub fn process_request(req: JobRequest, config: &EngineConfig) -> Result<JobOutput, JobFault> {
    let kind = JobKind::from_str(&req.kind).map_err(|_| JobFault::UnknownKind(req.kind.clone()))?;
    let payload = req.payload;
    run_guarded(move || execute(kind, payload, config))
}

/// Run `job`, converting both its error and any panic into `JobFault::AlgorithmFault`.
pub fn run_guarded<F>(job: F) -> Result<JobOutput, JobFault>
where
    F: FnOnce() -> Result<JobOutput>,
{
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(JobFault::AlgorithmFault(format!("{e:#}"))),
        Err(panic_payload) => Err(JobFault::AlgorithmFault(format!(
            "routine panicked: {}",
            panic_message(panic_payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn execute(kind: JobKind, payload: JobPayload, config: &EngineConfig) -> Result<JobOutput> {
    if payload.kind() != kind {
        bail!("{} job received a {} payload", kind, payload.kind());
    }

    let output = match payload {
        JobPayload::VolumeProfile { candles, bins } => {
            if bins == 0 {
                bail!("volume profile needs at least one bin");
            }
            JobOutput::VolumeProfile(volume_profile(&candles, bins))
        }
        JobPayload::FractalDimension { series } => {
            JobOutput::FractalDimension(fractal_dimension(&series, &config.series))
        }
        JobPayload::MarketEntropy { series } => JobOutput::MarketEntropy(shannon_entropy(&series)),
        JobPayload::Exhaustion { z_score } => JobOutput::Exhaustion(exhaustion_index(z_score)),
        JobPayload::OrderHeatmap {
            price,
            volatility,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            JobOutput::OrderHeatmap(order_heatmap(price, volatility, &config.order_flow, &mut rng))
        }
        JobPayload::CumulativeDelta { candles } => {
            JobOutput::CumulativeDelta(cumulative_delta(&candles, &config.order_flow))
        }
        JobPayload::InstitutionalConviction {
            candles,
            cumulative_delta,
        } => JobOutput::InstitutionalConviction(institutional_conviction(
            &candles,
            cumulative_delta,
            &config.order_flow,
        )),
        JobPayload::KellyCriterion {
            win_probability,
            payoff_ratio,
        } => JobOutput::KellyCriterion(kelly_criterion(win_probability, payoff_ratio)),
        JobPayload::MonteCarlo(request) => {
            if !request.start_price.is_finite() || request.start_price <= 0.0 {
                bail!("monte carlo start price must be positive, got {}", request.start_price);
            }
            if request.simulations > config.simulation.max_simulations {
                log::debug!(
                    "Monte Carlo request for {} paths capped at {}",
                    request.simulations,
                    config.simulation.max_simulations
                );
            }
            JobOutput::MonteCarlo(monte_carlo(&request, &config.simulation))
        }
        JobPayload::SimpleMovingAverage { closes, period } => {
            if period == 0 {
                bail!("moving average period must be at least 1");
            }
            JobOutput::SimpleMovingAverage(simple_moving_average(&closes, period))
        }
        JobPayload::BollingerBands {
            closes,
            period,
            multiplier,
        } => {
            if period == 0 {
                bail!("bollinger period must be at least 1");
            }
            if !multiplier.is_finite() {
                bail!("bollinger multiplier must be finite");
            }
            if multiplier < 0.0 {
                bail!("bollinger multiplier must not be negative, got {}", multiplier);
            }
            JobOutput::BollingerBands(bollinger_bands(&closes, period, multiplier))
        }
        JobPayload::LinearRegression { series } => {
            JobOutput::LinearRegression(linear_regression(&series))
        }
    };

    Ok(output)
}
