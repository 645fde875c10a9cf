use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimulationSettings;
use crate::utils::percentile;

/// Inputs of a Monte Carlo price-path run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub start_price: f64,
    /// Per-step volatility as a fraction of price (0.02 = 2%)
    pub volatility: f64,
    pub steps: usize,
    /// Requested path count. Capped by `SimulationSettings::max_simulations`.
    pub simulations: usize,
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    /// `steps + 1` prices, the first being the start price
    pub prices: Vec<f64>,
    pub final_price: f64,
    /// Uniform weight `1 / paths`
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub paths: usize,
    pub mean_final: f64,
    pub p05_final: f64,
    pub p95_final: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub paths: Vec<SimulationPath>,
    pub summary: SimulationSummary,
}

/// Standard-normal variate via the Box-Muller transform.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // u1 in (0, 1] keeps ln() finite
    let u1: f64 = 1.0 - rng.gen_range(0.0..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn simulate_path(start_price: f64, volatility: f64, steps: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prices = Vec::with_capacity(steps + 1);
    let mut price = start_price;
    prices.push(price);
    for _ in 0..steps {
        let z = standard_normal(&mut rng);
        // Floor at zero: a single large shock cannot take price negative
        price = (price + price * volatility * z).max(0.0);
        prices.push(price);
    }
    prices
}

/// Runs independent `price += price * volatility * z` paths.
///
/// Unlike the bare update, each step is floored at 0.0 so a single shock
/// below -1/volatility cannot produce a negative price.
///
/// Path and step counts are capped by `settings`. Paths are spread over
/// rayon's pool inside this one job; the computation context still runs jobs
/// one at a time in arrival order. Each path gets its own RNG derived from the
/// base seed, so results do not depend on how rayon splits the work.
pub fn monte_carlo(request: &SimulationRequest, settings: &SimulationSettings) -> SimulationResult {
    let simulations = request.simulations.min(settings.max_simulations);
    let steps = request.steps.min(settings.max_steps);

    if simulations == 0 || !request.start_price.is_finite() {
        return SimulationResult {
            paths: Vec::new(),
            summary: SimulationSummary {
                paths: 0,
                mean_final: 0.0,
                p05_final: 0.0,
                p95_final: 0.0,
            },
        };
    }

    let volatility = if request.volatility.is_finite() {
        request.volatility.abs()
    } else {
        0.0
    };
    let base_seed = request.seed.unwrap_or_else(rand::random::<u64>);
    let probability = 1.0 / simulations as f64;

    let paths: Vec<SimulationPath> = (0..simulations as u64)
        .into_par_iter()
        .map(|i| {
            let prices = simulate_path(request.start_price, volatility, steps, base_seed.wrapping_add(i));
            let final_price = prices.last().copied().unwrap_or(request.start_price);
            SimulationPath {
                prices,
                final_price,
                probability,
            }
        })
        .collect();

    let mut finals: Vec<f64> = paths.iter().map(|p| p.final_price).collect();
    finals.sort_by(f64::total_cmp);
    let mean_final = finals.iter().sum::<f64>() / finals.len() as f64;

    SimulationResult {
        summary: SimulationSummary {
            paths: paths.len(),
            mean_final,
            p05_final: percentile(&finals, 5.0),
            p95_final: percentile(&finals, 95.0),
        },
        paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENGINE;

    fn request(simulations: usize) -> SimulationRequest {
        SimulationRequest {
            start_price: 100.0,
            volatility: 0.02,
            steps: 30,
            simulations,
            seed: Some(42),
        }
    }

    #[test]
    fn simulation_count_is_capped() {
        let result = monte_carlo(&request(10_000), &ENGINE.simulation);
        assert_eq!(result.paths.len(), ENGINE.simulation.max_simulations);
        assert_eq!(result.summary.paths, ENGINE.simulation.max_simulations);
    }

    #[test]
    fn every_path_starts_at_start_price() {
        let result = monte_carlo(&request(20), &ENGINE.simulation);
        for path in &result.paths {
            assert_eq!(path.prices[0], 100.0);
            assert_eq!(path.prices.len(), 31);
            assert_eq!(path.final_price, *path.prices.last().unwrap());
            assert!((path.probability - 1.0 / 20.0).abs() < 1e-12);
            assert!(path.prices.iter().all(|p| p.is_finite() && *p >= 0.0));
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = monte_carlo(&request(10), &ENGINE.simulation);
        let b = monte_carlo(&request(10), &ENGINE.simulation);
        assert_eq!(a, b);
    }

    #[test]
    fn summary_percentiles_are_ordered() {
        let result = monte_carlo(&request(50), &ENGINE.simulation);
        let s = result.summary;
        assert!(s.p05_final <= s.p95_final);
    }

    #[test]
    fn zero_volatility_paths_are_flat() {
        let mut req = request(3);
        req.volatility = 0.0;
        let result = monte_carlo(&req, &ENGINE.simulation);
        assert!(result.paths.iter().all(|p| p.prices.iter().all(|&x| x == 100.0)));
    }

    #[test]
    fn extreme_volatility_floors_prices_at_zero() {
        let mut req = request(50);
        req.volatility = 5.0;
        let result = monte_carlo(&req, &ENGINE.simulation);
        let all_prices = || result.paths.iter().flat_map(|p| p.prices.iter());
        assert!(all_prices().all(|&x| x >= 0.0));
        assert!(all_prices().any(|&x| x == 0.0));
    }

    #[test]
    fn zero_simulations_is_empty() {
        let result = monte_carlo(&request(0), &ENGINE.simulation);
        assert!(result.paths.is_empty());
        assert_eq!(result.summary.paths, 0);
    }

    #[test]
    fn relaxed_cap_allows_more_paths() {
        let settings = SimulationSettings {
            max_simulations: 500,
            ..ENGINE.simulation
        };
        assert_eq!(monte_carlo(&request(200), &settings).paths.len(), 200);
    }
}
