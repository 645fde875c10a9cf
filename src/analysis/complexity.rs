use itertools::Itertools;

use crate::config::SeriesSettings;
use crate::utils::get_min_max;

/// Sevcik fractal dimension of a series.
///
/// Both axes are normalized to [0, 1], the curve length `L` is the sum of the
/// Euclidean segment lengths, and the estimate is `1 + (ln L + ln 2) / ln(2(n-1))`.
/// Values near 1.0 indicate a trending series, values near 2.0 a space-filling (choppy) one.
///
/// Series shorter than `settings.fractal_min_points` return `settings.fractal_default`;
/// a flat series returns exactly 1.0.
pub fn fractal_dimension(series: &[f64], settings: &SeriesSettings) -> f64 {
    let n = series.len();
    if n < settings.fractal_min_points.max(2) {
        return settings.fractal_default;
    }

    let (min, max) = get_min_max(series);
    if max == min {
        return 1.0;
    }

    let dx = 1.0 / (n - 1) as f64;
    let span = max - min;
    let length: f64 = series
        .iter()
        .map(|&v| (v - min) / span)
        .tuple_windows()
        .map(|(a, b)| (dx * dx + (b - a) * (b - a)).sqrt())
        .sum();

    let fdi = 1.0 + (length.ln() + 2f64.ln()) / (2.0 * (n - 1) as f64).ln();
    if fdi.is_finite() {
        fdi
    } else {
        settings.fractal_default
    }
}

/// Shannon entropy (bits) of the up/down move sequence.
///
/// Each consecutive difference becomes +1 (up) or -1 (flat or down), so the
/// result lies in [0, 1]. A one-directional series has entropy 0.
pub fn shannon_entropy(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let (ups, downs) = series
        .iter()
        .tuple_windows()
        .fold((0usize, 0usize), |(ups, downs), (a, b)| {
            if b > a { (ups + 1, downs) } else { (ups, downs + 1) }
        });

    let total = (ups + downs) as f64;
    [ups, downs]
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENGINE;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn short_series_returns_default() {
        let series: Vec<f64> = (0..29).map(|i| (i as f64).sin()).collect();
        assert_eq!(fractal_dimension(&series, &ENGINE.series), 1.5);
        assert_eq!(fractal_dimension(&[], &ENGINE.series), 1.5);
    }

    #[test]
    fn flat_series_returns_one() {
        assert_eq!(fractal_dimension(&[42.0; 30], &ENGINE.series), 1.0);
        assert_eq!(fractal_dimension(&[7.0; 500], &ENGINE.series), 1.0);
    }

    #[test]
    fn straight_line_is_close_to_one() {
        let series: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let fdi = fractal_dimension(&series, &ENGINE.series);
        // L = sqrt(2), so 1 + ln(2 sqrt 2) / ln(198)
        let expected = 1.0 + (2f64.sqrt().ln() + 2f64.ln()) / (198f64).ln();
        assert!(approx_eq(fdi, expected));
        assert!(fdi < 1.25);
    }

    #[test]
    fn zigzag_is_rougher_than_trend() {
        let trend: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let zigzag: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        assert!(
            fractal_dimension(&zigzag, &ENGINE.series) > fractal_dimension(&trend, &ENGINE.series)
        );
    }

    #[test]
    fn entropy_of_monotonic_series_is_zero() {
        assert_eq!(shannon_entropy(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.0);
        assert_eq!(shannon_entropy(&[5.0, 4.0, 3.0, 2.0]), 0.0);
    }

    #[test]
    fn entropy_of_balanced_moves_is_one() {
        assert!(approx_eq(shannon_entropy(&[1.0, 2.0, 1.0, 2.0, 1.0]), 1.0));
    }

    #[test]
    fn entropy_degenerate_inputs() {
        assert_eq!(shannon_entropy(&[]), 0.0);
        assert_eq!(shannon_entropy(&[3.0]), 0.0);
    }

    #[test]
    fn entropy_stays_in_unit_interval() {
        let series: Vec<f64> = (0..200).map(|i| ((i * 7919) % 113) as f64).collect();
        let h = shannon_entropy(&series);
        assert!((0.0..=1.0).contains(&h));
    }
}
