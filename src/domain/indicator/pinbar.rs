//! Pin-bar candle shape tests.
//!
//! Two shapes are supported:
//! - `Ratio`: one wick longer than `min_wick_body_ratio * body`, body no
//!   larger than `max_body_range_ratio * (high - low)`. A candle with zero
//!   range is never a pin bar.
//! - `Shadow`: body no larger than either shadow; a bullish candle needs an
//!   upper shadow at least twice the lower one, a bearish candle a lower
//!   shadow at least twice the upper one. Dojis never qualify.

use crate::domain::candle::Candle;

pub const DEFAULT_WICK_BODY_RATIO: f64 = 2.0;
pub const DEFAULT_BODY_RANGE_RATIO: f64 = 0.33;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinBarShape {
    Ratio {
        min_wick_body_ratio: f64,
        max_body_range_ratio: f64,
    },
    Shadow,
}

impl Default for PinBarShape {
    fn default() -> Self {
        PinBarShape::Ratio {
            min_wick_body_ratio: DEFAULT_WICK_BODY_RATIO,
            max_body_range_ratio: DEFAULT_BODY_RANGE_RATIO,
        }
    }
}

impl PinBarShape {
    pub fn is_pin_bar(&self, candle: &Candle) -> bool {
        match *self {
            PinBarShape::Ratio {
                min_wick_body_ratio,
                max_body_range_ratio,
            } => {
                let range = candle.range();
                if range == 0.0 {
                    return false;
                }

                let body = candle.body();
                if body / range > max_body_range_ratio {
                    return false;
                }

                let min_wick = min_wick_body_ratio * body;
                candle.upper_wick() > min_wick || candle.lower_wick() > min_wick
            }
            PinBarShape::Shadow => {
                let body = candle.body();
                let upper = candle.upper_wick();
                let lower = candle.lower_wick();
                if body > upper || body > lower {
                    return false;
                }
                if candle.close > candle.open {
                    upper >= 2.0 * lower
                } else if candle.open > candle.close {
                    lower >= 2.0 * upper
                } else {
                    false
                }
            }
        }
    }
}
