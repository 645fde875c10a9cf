use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Equal-width partition of `[start_range, end_range]` into `n_chunks` bins.
#[derive(serde::Deserialize, serde::Serialize, Default, Debug, Clone, PartialEq)]
pub struct RangeF64 {
    pub start_range: f64,
    pub end_range: f64,
    pub n_chunks: usize,
}

impl RangeF64 {
    pub fn new(start_range: f64, end_range: f64, n_chunks: usize) -> Self {
        debug_assert!(n_chunks > 0);
        // Swap the values over if necessary
        let (start_range, end_range) = if end_range < start_range {
            (end_range, start_range)
        } else {
            (start_range, end_range)
        };
        Self {
            start_range,
            end_range,
            n_chunks,
        }
    }

    pub fn range_length(&self) -> f64 {
        self.end_range - self.start_range
    }

    pub fn chunk_size(&self) -> f64 {
        self.range_length() / (self.n_chunks as f64)
    }

    pub fn chunk_index(&self, value: f64) -> usize {
        // A zero-width range puts everything in the first chunk
        if self.range_length() <= 0.0 {
            return 0;
        }
        let index = ((value - self.start_range) / self.chunk_size()).max(0.0);
        let chunk_index = index as usize;

        // Clamping handles floating-point inaccuracies at the boundary.
        chunk_index.min(self.n_chunks - 1)
    }

    pub fn chunk_bounds(&self, chunk_index: usize) -> (f64, f64) {
        debug_assert!(chunk_index < self.n_chunks);
        let lower_bound = self.start_range + chunk_index as f64 * self.chunk_size();
        let upper_bound = self.start_range + (chunk_index + 1) as f64 * self.chunk_size();
        (lower_bound, upper_bound)
    }
}

/// Smallest and largest value of a non-empty slice.
pub fn get_min_max(vec: &[f64]) -> (f64, f64) {
    let (min_index, max_index) = vec.argminmax();
    (vec[min_index], vec[max_index])
}

/// Population z-score of the last value against the trailing `period` values.
/// Returns 0.0 when the window is too short or flat.
pub fn z_score(series: &[f64], period: usize) -> f64 {
    if period < 2 || series.len() < period {
        return 0.0;
    }
    let window = &series[series.len() - period..];
    let mean = window.iter().mean();
    let std_dev = window.iter().population_std_dev();
    if !std_dev.is_finite() || std_dev == 0.0 {
        return 0.0;
    }
    let last = window[period - 1];
    (last - mean) / std_dev
}

/// Nearest-rank percentile (`pct` in [0, 100]) of an already sorted slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_index_clamps_to_last_chunk() {
        let range = RangeF64::new(100.0, 200.0, 10);
        assert_eq!(range.chunk_index(100.0), 0);
        assert_eq!(range.chunk_index(155.0), 5);
        assert_eq!(range.chunk_index(200.0), 9);
        assert_eq!(range.chunk_index(250.0), 9);
        assert_eq!(range.chunk_index(50.0), 0);
    }

    #[test]
    fn zero_width_range_uses_first_chunk() {
        let range = RangeF64::new(42.0, 42.0, 4);
        assert_eq!(range.chunk_index(42.0), 0);
    }

    #[test]
    fn chunk_bounds_tile_the_range() {
        let range = RangeF64::new(0.0, 10.0, 5);
        assert_eq!(range.chunk_bounds(0), (0.0, 2.0));
        assert_eq!(range.chunk_bounds(4), (8.0, 10.0));
    }

    #[test]
    fn min_max_helpers() {
        let v = [3.0, -1.0, 7.5, 2.0];
        assert_eq!(get_min_max(&v), (-1.0, 7.5));
    }

    #[test]
    fn z_score_of_flat_window_is_zero() {
        assert_eq!(z_score(&[5.0; 20], 20), 0.0);
        assert_eq!(z_score(&[1.0, 2.0], 20), 0.0);
    }

    #[test]
    fn z_score_of_spike_is_positive() {
        let mut series = vec![10.0; 19];
        series.push(20.0);
        assert!(z_score(&series, 20) > 3.0);
    }

    #[test]
    fn percentile_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
