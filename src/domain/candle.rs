use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleType {
    Bullish,
    Bearish,
    Doji,
}

/// One OHLCV bar as handed over by the market-data layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(open_price: f64, high_price: f64, low_price: f64, close_price: f64, volume: f64) -> Self {
        Candle {
            open_price,
            high_price,
            low_price,
            close_price,
            volume,
        }
    }

    /// Direction of the close relative to the open.
    /// Unchanged candles are `Doji` so that volume-direction heuristics can skip them.
    pub fn get_type(&self) -> CandleType {
        if self.close_price > self.open_price {
            CandleType::Bullish
        } else if self.close_price < self.open_price {
            CandleType::Bearish
        } else {
            CandleType::Doji
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_direction_follows_close_vs_open() {
        assert_eq!(Candle::new(10.0, 12.0, 9.0, 11.0, 1.0).get_type(), CandleType::Bullish);
        assert_eq!(Candle::new(11.0, 12.0, 9.0, 10.0, 1.0).get_type(), CandleType::Bearish);
        assert_eq!(Candle::new(10.0, 12.0, 9.0, 10.0, 1.0).get_type(), CandleType::Doji);
    }
}
