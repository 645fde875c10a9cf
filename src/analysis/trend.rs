use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Ordinary least squares fit of `value` against `index` (0..n-1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted value at index 0
    pub start_point: f64,
    /// Fitted value at index n-1
    pub end_point: f64,
}

/// One emitted Bollinger window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    /// Index of the last close in the window
    pub index: usize,
    pub basis: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Returns `None` for fewer than two points.
pub fn linear_regression(series: &[f64]) -> Option<RegressionLine> {
    let n = series.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = series.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sxx + x * x)
        },
    );

    let denominator = nf * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    Some(RegressionLine {
        slope,
        intercept,
        start_point: intercept,
        end_point: intercept + slope * (nf - 1.0),
    })
}

/// One output per input close. Positions before the window fills are `None`
/// rather than a partial average. Each window is averaged on its own, so a
/// non-finite close only voids the windows that contain it.
pub fn simple_moving_average(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    for (start, window) in closes.windows(period).enumerate() {
        if window.iter().all(|c| c.is_finite()) {
            out[start + period - 1] = Some(window.iter().mean());
        }
    }
    out
}

/// Mean +/- `multiplier` population standard deviations over each full window.
/// The multiplier is taken as a magnitude so `upper >= basis >= lower` always
/// holds; the engine rejects negative multipliers before they get here.
pub fn bollinger_bands(closes: &[f64], period: usize, multiplier: f64) -> Vec<BollingerPoint> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    closes
        .windows(period)
        .enumerate()
        .map(|(start, window)| {
            let basis = window.iter().mean();
            let sigma = if period > 1 {
                window.iter().population_std_dev()
            } else {
                0.0
            };
            let sigma = if sigma.is_finite() { sigma } else { 0.0 };
            let width = multiplier.abs() * sigma;
            BollingerPoint {
                index: start + period - 1,
                basis,
                upper: basis + width,
                lower: basis - width,
            }
        })
        .collect()
}
