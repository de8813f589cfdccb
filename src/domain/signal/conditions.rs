//! Base entry conditions, one indicator rule each.

use crate::domain::candle::Candle;
use crate::domain::indicator::pinbar::PinBarShape;
use crate::domain::indicator::{dmi, rsi, sma, stochastic_k, CandleWindow};
use crate::domain::signal::SignalEvaluator;

/// Close above its own simple moving average.
#[derive(Debug, Clone)]
pub struct CloseAboveSma {
    period: usize,
    window: CandleWindow,
}

impl CloseAboveSma {
    pub fn new(period: usize) -> Self {
        CloseAboveSma {
            period,
            window: CandleWindow::new(period),
        }
    }
}

impl SignalEvaluator for CloseAboveSma {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        match sma(self.window.closes(), self.period) {
            Some(average) => candle.close > average,
            None => false,
        }
    }

    fn warmup_period(&self) -> usize {
        self.period
    }

    fn describe(&self) -> String {
        format!("CLOSE > SMA({})", self.period)
    }
}

/// Short simple moving average above the long one.
#[derive(Debug, Clone)]
pub struct SmaAbove {
    short: usize,
    long: usize,
    window: CandleWindow,
}

impl SmaAbove {
    pub fn new(short: usize, long: usize) -> Self {
        SmaAbove {
            short,
            long,
            window: CandleWindow::new(short.max(long)),
        }
    }
}

impl SignalEvaluator for SmaAbove {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        let closes = self.window.closes();
        match (sma(closes, self.short), sma(closes, self.long)) {
            (Some(short), Some(long)) => short > long,
            _ => false,
        }
    }

    fn warmup_period(&self) -> usize {
        self.short.max(self.long)
    }

    fn describe(&self) -> String {
        format!("SMA({}) > SMA({})", self.short, self.long)
    }
}

/// RSI strictly below a threshold (oversold).
#[derive(Debug, Clone)]
pub struct RsiBelow {
    period: usize,
    threshold: f64,
    window: CandleWindow,
}

impl RsiBelow {
    pub fn new(period: usize, threshold: f64) -> Self {
        RsiBelow {
            period,
            threshold,
            window: CandleWindow::new(period + 1),
        }
    }
}

impl SignalEvaluator for RsiBelow {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        match rsi(self.window.closes(), self.period) {
            Some(value) => value < self.threshold,
            None => false,
        }
    }

    fn warmup_period(&self) -> usize {
        self.period + 1
    }

    fn describe(&self) -> String {
        format!("RSI({}) < {}", self.period, self.threshold)
    }
}

/// Stochastic %K strictly below a threshold.
#[derive(Debug, Clone)]
pub struct StochasticBelow {
    period: usize,
    threshold: f64,
    window: CandleWindow,
}

impl StochasticBelow {
    pub fn new(period: usize, threshold: f64) -> Self {
        StochasticBelow {
            period,
            threshold,
            window: CandleWindow::new(period),
        }
    }
}

impl SignalEvaluator for StochasticBelow {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        let w = &self.window;
        match stochastic_k(w.closes(), w.highs(), w.lows(), self.period) {
            Some(k) => k < self.threshold,
            None => false,
        }
    }

    fn warmup_period(&self) -> usize {
        self.period
    }

    fn describe(&self) -> String {
        format!("STOCHASTIC({}) < {}", self.period, self.threshold)
    }
}

/// Positive directional indicator above the negative one.
#[derive(Debug, Clone)]
pub struct DmiBullish {
    period: usize,
    window: CandleWindow,
}

impl DmiBullish {
    pub fn new(period: usize) -> Self {
        DmiBullish {
            period,
            window: CandleWindow::new(period + 1),
        }
    }
}

impl SignalEvaluator for DmiBullish {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        let w = &self.window;
        match dmi(w.highs(), w.lows(), w.closes(), self.period) {
            Some(d) => d.plus_di > d.minus_di,
            None => false,
        }
    }

    fn warmup_period(&self) -> usize {
        self.period + 1
    }

    fn describe(&self) -> String {
        format!("+DI({}) > -DI({})", self.period, self.period)
    }
}

/// Fast SMA crossing above the slow SMA on the latest candle.
///
/// Before warm-up the fast average counts as "not above", so a series that
/// is already trending up fires on the first warm candle.
#[derive(Debug, Clone)]
pub struct SmaCrossUp {
    fast: usize,
    slow: usize,
    window: CandleWindow,
    was_above: bool,
}

impl SmaCrossUp {
    pub fn new(fast: usize, slow: usize) -> Self {
        SmaCrossUp {
            fast,
            slow,
            window: CandleWindow::new(fast.max(slow)),
            was_above: false,
        }
    }
}

impl SignalEvaluator for SmaCrossUp {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        self.window.push(candle);
        let closes = self.window.closes();
        let above = match (sma(closes, self.fast), sma(closes, self.slow)) {
            (Some(fast), Some(slow)) => fast > slow,
            _ => false,
        };
        let crossed = above && !self.was_above;
        self.was_above = above;
        crossed
    }

    fn warmup_period(&self) -> usize {
        self.fast.max(self.slow)
    }

    fn describe(&self) -> String {
        format!("CROSS_ABOVE(SMA({}), SMA({}))", self.fast, self.slow)
    }
}

/// A pin bar followed by a non-pin-bar candle.
#[derive(Debug, Clone)]
pub struct PinBarReversal {
    shape: PinBarShape,
    prev_was_pin: Option<bool>,
}

impl PinBarReversal {
    pub fn new(shape: PinBarShape) -> Self {
        PinBarReversal {
            shape,
            prev_was_pin: None,
        }
    }
}

impl SignalEvaluator for PinBarReversal {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        let is_pin = self.shape.is_pin_bar(candle);
        let signal = self.prev_was_pin == Some(true) && !is_pin;
        self.prev_was_pin = Some(is_pin);
        signal
    }

    fn warmup_period(&self) -> usize {
        2
    }

    fn describe(&self) -> String {
        match self.shape {
            PinBarShape::Ratio {
                min_wick_body_ratio,
                max_body_range_ratio,
            } => format!(
                "PIN_BAR_REVERSAL(wick/body > {min_wick_body_ratio}, body/range <= {max_body_range_ratio})"
            ),
            PinBarShape::Shadow => "PIN_BAR_REVERSAL(shadow 2x)".to_string(),
        }
    }
}
