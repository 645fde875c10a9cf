use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;
use tokio::runtime::Runtime;

use quant_engine::analysis::SimulationRequest;
use quant_engine::utils::z_score;
use quant_engine::{Candle, Cli, JobKind, JobPayload, QuantEngine};

const SYNTHETIC_START_PRICE: f64 = 100.0;
const SYNTHETIC_STEP_VOLATILITY: f64 = 0.01;
const ZSCORE_PERIOD: usize = 20;

/// Random-walk candles standing in for fetched market data.
fn synthetic_candles(count: usize, rng: &mut StdRng) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut open = SYNTHETIC_START_PRICE;
    for _ in 0..count {
        let close = (open * (1.0 + rng.gen_range(-1.0..1.0) * SYNTHETIC_STEP_VOLATILITY)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
        let volume = rng.gen_range(10.0..1_000.0);
        candles.push(Candle::new(open, high, low, close, volume));
        open = close;
    }
    candles
}

fn demo_payload(kind: JobKind, candles: &[Candle], args: &Cli) -> JobPayload {
    let closes: Vec<f64> = candles.iter().map(|c| c.close_price).collect();
    let last_price = closes.last().copied().unwrap_or(SYNTHETIC_START_PRICE);

    match kind {
        JobKind::VolumeProfile => JobPayload::VolumeProfile {
            candles: candles.to_vec(),
            bins: 24,
        },
        JobKind::FractalDimension => JobPayload::FractalDimension { series: closes },
        JobKind::MarketEntropy => JobPayload::MarketEntropy { series: closes },
        JobKind::Exhaustion => JobPayload::Exhaustion {
            z_score: z_score(&closes, ZSCORE_PERIOD),
        },
        JobKind::OrderHeatmap => JobPayload::OrderHeatmap {
            price: last_price,
            volatility: SYNTHETIC_STEP_VOLATILITY,
            seed: args.seed,
        },
        JobKind::CumulativeDelta => JobPayload::CumulativeDelta {
            candles: candles.to_vec(),
        },
        JobKind::InstitutionalConviction => JobPayload::InstitutionalConviction {
            candles: candles.to_vec(),
            cumulative_delta: 0.0,
        },
        JobKind::KellyCriterion => JobPayload::KellyCriterion {
            win_probability: 0.55,
            payoff_ratio: 1.5,
        },
        JobKind::MonteCarlo => JobPayload::MonteCarlo(SimulationRequest {
            start_price: last_price,
            volatility: SYNTHETIC_STEP_VOLATILITY,
            steps: 48,
            simulations: args.simulations,
            seed: args.seed,
        }),
        JobKind::SimpleMovingAverage => JobPayload::SimpleMovingAverage {
            closes,
            period: ZSCORE_PERIOD,
        },
        JobKind::BollingerBands => JobPayload::BollingerBands {
            closes,
            period: ZSCORE_PERIOD,
            multiplier: 2.0,
        },
        JobKind::LinearRegression => JobPayload::LinearRegression { series: closes },
    }
}

async fn run_job(engine: &QuantEngine, tag: &str, payload: JobPayload) {
    match engine.call_tagged(tag, payload).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}:\n{}", tag, json),
            Err(e) => log::error!("Failed to render {} output: {}", tag, e),
        },
        // Callers treat the engine as optional; report and carry on
        Err(e) => log::warn!("{} unavailable: {}", tag, e),
    }
}

async fn run(args: Cli) -> Result<()> {
    let engine = QuantEngine::new(args.engine_config());
    log::debug!("Engine config: {:?}", engine.config());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let candles = synthetic_candles(args.points, &mut rng);

    if args.job == "all" {
        let jobs = JobKind::iter().map(|kind| {
            let payload = demo_payload(kind, &candles, &args);
            let tag = kind.to_string();
            let engine = &engine;
            async move { run_job(engine, &tag, payload).await }
        });
        futures::future::join_all(jobs).await;
    } else {
        // Unrecognised tags still go to the context, which answers UnknownKind
        let payload = match JobKind::from_str(&args.job) {
            Ok(kind) => demo_payload(kind, &candles, &args),
            Err(_) => demo_payload(JobKind::FractalDimension, &candles, &args),
        };
        run_job(&engine, &args.job, payload).await;
    }

    if let Some(status) = engine.status_msg() {
        log::info!("{}", status);
    }
    Ok(())
}

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Run the requested jobs
    let rt = Runtime::new()?;
    rt.block_on(run(args))
}
