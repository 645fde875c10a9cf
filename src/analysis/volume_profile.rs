use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::utils::{RangeF64, get_min_max};

/// One equal-width price bin of a volume profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBin {
    pub price_low: f64,
    pub price_high: f64,
    /// Mid price of the bin
    pub price: f64,
    pub volume: f64,
    /// Set on exactly one bin: the one holding the most volume
    pub is_point_of_control: bool,
}

/// Buckets each candle's full volume into one of `bins` equal-width bins spanning
/// [min close, max close], keyed by the candle's close.
///
/// Returns an empty profile for an empty candle set or zero bins.
pub fn volume_profile(candles: &[Candle], bins: usize) -> Vec<VolumeBin> {
    if candles.is_empty() || bins == 0 {
        return Vec::new();
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close_price).collect();
    let (min_close, max_close) = get_min_max(&closes);
    let range = RangeF64::new(min_close, max_close, bins);

    let mut volumes = vec![0.0; bins];
    for candle in candles {
        volumes[range.chunk_index(candle.close_price)] += candle.volume;
    }

    // First maximum wins so that ties still mark a single bin
    let poc_index = volumes
        .iter()
        .enumerate()
        .fold(0, |best, (i, &v)| if v > volumes[best] { i } else { best });

    volumes
        .into_iter()
        .enumerate()
        .map(|(i, volume)| {
            let (price_low, price_high) = range.chunk_bounds(i);
            VolumeBin {
                price_low,
                price_high,
                price: (price_low + price_high) / 2.0,
                volume,
                is_point_of_control: i == poc_index,
            }
        })
        .collect()
}

/// The point-of-control bin, if the profile is non-empty.
pub fn point_of_control(profile: &[VolumeBin]) -> Option<&VolumeBin> {
    profile.iter().find(|b| b.is_point_of_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle::new(close, close + 1.0, close - 1.0, close, volume)
    }

    #[test]
    fn empty_input_gives_empty_profile() {
        assert!(volume_profile(&[], 10).is_empty());
        assert!(volume_profile(&[candle(1.0, 1.0)], 0).is_empty());
    }

    #[test]
    fn volume_is_conserved_and_single_poc() {
        let candles: Vec<Candle> = (0..250)
            .map(|i| candle(100.0 + ((i * 13) % 41) as f64 * 0.37, 1.0 + (i % 7) as f64 * 3.3))
            .collect();
        let profile = volume_profile(&candles, 24);

        assert_eq!(profile.len(), 24);
        let input_total: f64 = candles.iter().map(|c| c.volume).sum();
        let binned_total: f64 = profile.iter().map(|b| b.volume).sum();
        assert!((input_total - binned_total).abs() < 1e-6);

        assert_eq!(profile.iter().filter(|b| b.is_point_of_control).count(), 1);
        let poc = point_of_control(&profile).unwrap();
        assert!(profile.iter().all(|b| b.volume <= poc.volume));
    }

    #[test]
    fn extreme_closes_land_in_edge_bins() {
        let profile = volume_profile(&[candle(10.0, 5.0), candle(20.0, 9.0)], 4);
        assert_eq!(profile[0].volume, 5.0);
        assert_eq!(profile[3].volume, 9.0);
        assert!(profile[3].is_point_of_control);
        assert_eq!(profile[0].price_low, 10.0);
        assert_eq!(profile[3].price_high, 20.0);
    }

    #[test]
    fn flat_closes_collapse_into_first_bin() {
        let profile = volume_profile(&[candle(50.0, 2.0), candle(50.0, 3.0)], 5);
        assert_eq!(profile[0].volume, 5.0);
        assert!(profile[0].is_point_of_control);
        assert_eq!(profile.iter().filter(|b| b.is_point_of_control).count(), 1);
    }
}
