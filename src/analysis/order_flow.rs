//! Candle-direction heuristics and the synthetic order-book heatmap.
//!
//! None of this is derived from real tape or depth data: inputs are plain
//! candles, so every output here is an approximation meant for display and
//! coarse signalling only.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::config::OrderFlowSettings;
use crate::domain::{Candle, CandleType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum WallSide {
    Bid,
    Ask,
}

/// A synthetic resting-liquidity wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderWall {
    pub side: WallSide,
    pub price: f64,
    pub size: f64,
    /// Display weight in [0, 1]
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativeDelta {
    pub value: f64,
    /// Placeholder signal: net price direction disagrees with the delta sign
    pub divergence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ExhaustionLevel {
    #[strum(serialize = "critical exhaustion")]
    CriticalExhaustion,
    #[strum(serialize = "overextended")]
    Overextended,
    #[strum(serialize = "healthy")]
    Healthy,
    #[strum(serialize = "accumulation")]
    Accumulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExhaustionReading {
    /// 0..=100
    pub score: f64,
    pub level: ExhaustionLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ConvictionSignal {
    Accumulation,
    Distribution,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionReading {
    pub signal: ConvictionSignal,
    /// 0..=100
    pub confidence: u8,
}

/// Synthesizes bid walls below and ask walls above `price` at fixed
/// `heatmap_step_pct` increments. Sizes are random and scale with volatility;
/// intensity is random and fades with distance from price.
///
/// Illustrative only: there is no order book behind these numbers.
pub fn order_heatmap<R: Rng>(
    price: f64,
    volatility: f64,
    settings: &OrderFlowSettings,
    rng: &mut R,
) -> Vec<OrderWall> {
    if !price.is_finite() || price <= 0.0 {
        return Vec::new();
    }
    let volatility = if volatility.is_finite() { volatility.abs() } else { 0.0 };
    let levels = settings.heatmap_levels;

    let mut walls = Vec::with_capacity(levels * 2);
    for side in [WallSide::Bid, WallSide::Ask] {
        for level in 1..=levels {
            let offset = level as f64 * settings.heatmap_step_pct;
            let wall_price = match side {
                WallSide::Bid => price * (1.0 - offset),
                WallSide::Ask => price * (1.0 + offset),
            };
            if wall_price <= 0.0 {
                continue;
            }
            let fade = 1.0 - (level - 1) as f64 / levels as f64;
            walls.push(OrderWall {
                side,
                price: wall_price,
                size: rng.gen_range(10.0..100.0) * (1.0 + volatility * 10.0),
                intensity: rng.gen_range(0.0..1.0) * fade,
            });
        }
    }
    walls
}

/// Running buy-minus-sell estimate: each up candle adds
/// `delta_volume_fraction * volume`, each down candle subtracts it.
pub fn cumulative_delta(candles: &[Candle], settings: &OrderFlowSettings) -> CumulativeDelta {
    let value: f64 = candles
        .iter()
        .map(|c| match c.get_type() {
            CandleType::Bullish => settings.delta_volume_fraction * c.volume,
            CandleType::Bearish => -settings.delta_volume_fraction * c.volume,
            CandleType::Doji => 0.0,
        })
        .sum();

    let divergence = match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => {
            let price_move = last.close_price - first.open_price;
            price_move * value < 0.0
        }
        _ => false,
    };

    CumulativeDelta { value, divergence }
}

/// Maps a price z-score onto a 0..100 stretch score: `50 + 12|z|`, clamped.
pub fn exhaustion_index(z_score: f64) -> ExhaustionReading {
    let z = if z_score.is_finite() { z_score } else { 0.0 };
    let score = (50.0 + 12.0 * z.abs()).clamp(0.0, 100.0);

    let level = if score > 80.0 {
        ExhaustionLevel::CriticalExhaustion
    } else if score > 65.0 {
        ExhaustionLevel::Overextended
    } else if score < 35.0 {
        ExhaustionLevel::Accumulation
    } else {
        ExhaustionLevel::Healthy
    };

    ExhaustionReading { score, level }
}

/// Compares the price move across the last `conviction_lookback` candles
/// (last close minus the open of the first candle in the window) with the
/// sign of a cumulative delta.
pub fn institutional_conviction(
    candles: &[Candle],
    cumulative_delta: f64,
    settings: &OrderFlowSettings,
) -> ConvictionReading {
    let lookback = settings.conviction_lookback.max(1);
    if candles.len() < lookback {
        return ConvictionReading {
            signal: ConvictionSignal::Neutral,
            confidence: 50,
        };
    }

    let window = &candles[candles.len() - lookback..];
    let price_change = window[lookback - 1].close_price - window[0].open_price;

    if price_change <= 0.0 && cumulative_delta > 0.0 {
        ConvictionReading {
            signal: ConvictionSignal::Accumulation,
            confidence: 85,
        }
    } else if price_change > 0.0 && cumulative_delta < 0.0 {
        ConvictionReading {
            signal: ConvictionSignal::Distribution,
            confidence: 88,
        }
    } else {
        ConvictionReading {
            signal: ConvictionSignal::Neutral,
            confidence: 45,
        }
    }
}
