//! Named strategy presets and their construction from configuration.
//!
//! Each preset maps to one evaluator composition for the take-profit /
//! stop-loss loop, except `ma_crossover`, which runs its own loop.

use crate::domain::crossover::{CrossoverParams, MaType};
use crate::domain::error::BacktestError;
use crate::domain::indicator::pinbar::{
    PinBarShape, DEFAULT_BODY_RANGE_RATIO, DEFAULT_WICK_BODY_RATIO,
};
use crate::domain::signal::{
    AllOf, CloseAboveSma, DmiBullish, PinBarReversal, RsiBelow, SignalEvaluator, SmaAbove,
    SmaCrossUp, StochasticBelow,
};
use crate::ports::config_port::ConfigPort;

pub const STRATEGY_NAMES: [&str; 6] = [
    "trend_follow",
    "dual_ma",
    "dmi_trend",
    "pin_bar",
    "sma_cross",
    "ma_crossover",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    TrendFollow {
        sma_period: usize,
    },
    DualMa {
        short_period: usize,
        long_period: usize,
        rsi_period: usize,
        rsi_threshold: f64,
        stoch_period: usize,
        stoch_threshold: f64,
    },
    DmiTrend {
        sma_period: usize,
        dmi_period: usize,
    },
    PinBar {
        shape: PinBarShape,
    },
    SmaCross {
        fast_period: usize,
        slow_period: usize,
    },
    MaCrossover(CrossoverParams),
}

impl Strategy {
    /// The preset with its default parameters.
    pub fn preset(name: &str) -> Result<Self, BacktestError> {
        let strategy = match name.trim().to_lowercase().as_str() {
            "trend_follow" => Strategy::TrendFollow { sma_period: 10 },
            "dual_ma" => Strategy::DualMa {
                short_period: 50,
                long_period: 200,
                rsi_period: 14,
                rsi_threshold: 30.0,
                stoch_period: 14,
                stoch_threshold: 20.0,
            },
            "dmi_trend" => Strategy::DmiTrend {
                sma_period: 50,
                dmi_period: 14,
            },
            "pin_bar" => Strategy::PinBar {
                shape: PinBarShape::default(),
            },
            "sma_cross" => Strategy::SmaCross {
                fast_period: 10,
                slow_period: 50,
            },
            "ma_crossover" => Strategy::MaCrossover(CrossoverParams {
                fast_period: 10,
                slow_period: 50,
                ma_type: MaType::Sma,
            }),
            _ => {
                return Err(BacktestError::UnknownStrategy {
                    name: name.to_string(),
                })
            }
        };
        Ok(strategy)
    }

    /// Read `[strategy] name` and apply any parameter overrides.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BacktestError> {
        let name = config
            .get_string("strategy", "name")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BacktestError::ConfigMissing {
                section: "strategy".to_string(),
                key: "name".to_string(),
            })?;

        let strategy = match Strategy::preset(&name)? {
            Strategy::TrendFollow { sma_period } => Strategy::TrendFollow {
                sma_period: read_period(config, "sma_period", sma_period)?,
            },
            Strategy::DualMa {
                short_period,
                long_period,
                rsi_period,
                rsi_threshold,
                stoch_period,
                stoch_threshold,
            } => Strategy::DualMa {
                short_period: read_period(config, "short_period", short_period)?,
                long_period: read_period(config, "long_period", long_period)?,
                rsi_period: read_period(config, "rsi_period", rsi_period)?,
                rsi_threshold: read_double(config, "rsi_threshold", rsi_threshold)?,
                stoch_period: read_period(config, "stoch_period", stoch_period)?,
                stoch_threshold: read_double(config, "stoch_threshold", stoch_threshold)?,
            },
            Strategy::DmiTrend {
                sma_period,
                dmi_period,
            } => Strategy::DmiTrend {
                sma_period: read_period(config, "sma_period", sma_period)?,
                dmi_period: read_period(config, "dmi_period", dmi_period)?,
            },
            Strategy::PinBar { .. } => Strategy::PinBar {
                shape: read_pin_shape(config)?,
            },
            Strategy::SmaCross {
                fast_period,
                slow_period,
            } => Strategy::SmaCross {
                fast_period: read_period(config, "fast_period", fast_period)?,
                slow_period: read_period(config, "slow_period", slow_period)?,
            },
            Strategy::MaCrossover(params) => {
                let ma_type = match config.get_string("strategy", "ma_type") {
                    None => params.ma_type,
                    Some(s) => MaType::parse(&s).ok_or_else(|| BacktestError::ConfigInvalid {
                        section: "strategy".to_string(),
                        key: "ma_type".to_string(),
                        reason: format!("expected sma or ema, got {s}"),
                    })?,
                };
                Strategy::MaCrossover(CrossoverParams {
                    fast_period: read_period(config, "fast_period", params.fast_period)?,
                    slow_period: read_period(config, "slow_period", params.slow_period)?,
                    ma_type,
                })
            }
        };
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::TrendFollow { .. } => "trend_follow",
            Strategy::DualMa { .. } => "dual_ma",
            Strategy::DmiTrend { .. } => "dmi_trend",
            Strategy::PinBar { .. } => "pin_bar",
            Strategy::SmaCross { .. } => "sma_cross",
            Strategy::MaCrossover(_) => "ma_crossover",
        }
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        match self {
            Strategy::TrendFollow { sma_period } => check_period("sma_period", *sma_period),
            Strategy::DualMa {
                short_period,
                long_period,
                rsi_period,
                rsi_threshold,
                stoch_period,
                stoch_threshold,
            } => {
                check_period("short_period", *short_period)?;
                check_period("long_period", *long_period)?;
                check_period("rsi_period", *rsi_period)?;
                check_period("stoch_period", *stoch_period)?;
                check_percent_threshold("rsi_threshold", *rsi_threshold)?;
                check_percent_threshold("stoch_threshold", *stoch_threshold)
            }
            Strategy::DmiTrend {
                sma_period,
                dmi_period,
            } => {
                check_period("sma_period", *sma_period)?;
                check_period("dmi_period", *dmi_period)
            }
            Strategy::PinBar {
                shape:
                    PinBarShape::Ratio {
                        min_wick_body_ratio,
                        max_body_range_ratio,
                    },
            } => {
                if !(min_wick_body_ratio.is_finite() && *min_wick_body_ratio > 0.0) {
                    return Err(BacktestError::invalid_config(
                        "min_wick_body_ratio",
                        "must be positive",
                    ));
                }
                if !(*max_body_range_ratio > 0.0 && *max_body_range_ratio <= 1.0) {
                    return Err(BacktestError::invalid_config(
                        "max_body_range_ratio",
                        "must be in (0, 1]",
                    ));
                }
                Ok(())
            }
            Strategy::PinBar {
                shape: PinBarShape::Shadow,
            } => Ok(()),
            Strategy::SmaCross {
                fast_period,
                slow_period,
            } => {
                check_period("fast_period", *fast_period)?;
                check_period("slow_period", *slow_period)
            }
            Strategy::MaCrossover(params) => params.validate(),
        }
    }

    /// Evaluator for the take-profit / stop-loss loop; `None` for
    /// `ma_crossover`, which does not use one.
    pub fn build_evaluator(&self) -> Option<Box<dyn SignalEvaluator>> {
        let evaluator: Box<dyn SignalEvaluator> = match self {
            Strategy::TrendFollow { sma_period } => Box::new(CloseAboveSma::new(*sma_period)),
            Strategy::DualMa {
                short_period,
                long_period,
                rsi_period,
                rsi_threshold,
                stoch_period,
                stoch_threshold,
            } => Box::new(AllOf::new(vec![
                Box::new(SmaAbove::new(*short_period, *long_period)),
                Box::new(RsiBelow::new(*rsi_period, *rsi_threshold)),
                Box::new(StochasticBelow::new(*stoch_period, *stoch_threshold)),
            ])),
            Strategy::DmiTrend {
                sma_period,
                dmi_period,
            } => Box::new(AllOf::new(vec![
                Box::new(CloseAboveSma::new(*sma_period)),
                Box::new(DmiBullish::new(*dmi_period)),
            ])),
            Strategy::PinBar { shape } => Box::new(PinBarReversal::new(*shape)),
            Strategy::SmaCross {
                fast_period,
                slow_period,
            } => Box::new(SmaCrossUp::new(*fast_period, *slow_period)),
            Strategy::MaCrossover(_) => return None,
        };
        Some(evaluator)
    }

    pub fn describe(&self) -> String {
        match self {
            Strategy::MaCrossover(params) => params.describe(),
            other => other
                .build_evaluator()
                .map(|e| e.describe())
                .unwrap_or_default(),
        }
    }
}

fn read_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, BacktestError> {
    match config.get_int("strategy", key)? {
        None => Ok(default),
        Some(value) if value >= 1 => Ok(value as usize),
        Some(_) => Err(BacktestError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be at least 1"),
        }),
    }
}

fn read_double(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, BacktestError> {
    Ok(config.get_double("strategy", key)?.unwrap_or(default))
}

/// `pin_shape = ratio` (default, tunable ratios) or `pin_shape = shadow`.
fn read_pin_shape(config: &dyn ConfigPort) -> Result<PinBarShape, BacktestError> {
    let kind = config
        .get_string("strategy", "pin_shape")
        .unwrap_or_else(|| "ratio".to_string());
    match kind.trim().to_lowercase().as_str() {
        "ratio" => Ok(PinBarShape::Ratio {
            min_wick_body_ratio: read_double(config, "min_wick_body_ratio", DEFAULT_WICK_BODY_RATIO)?,
            max_body_range_ratio: read_double(
                config,
                "max_body_range_ratio",
                DEFAULT_BODY_RANGE_RATIO,
            )?,
        }),
        "shadow" => Ok(PinBarShape::Shadow),
        other => Err(BacktestError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "pin_shape".to_string(),
            reason: format!("expected ratio or shadow, got {other}"),
        }),
    }
}

fn check_period(field: &str, period: usize) -> Result<(), BacktestError> {
    if period == 0 {
        return Err(BacktestError::invalid_config(field, "must be at least 1"));
    }
    Ok(())
}

fn check_percent_threshold(field: &str, value: f64) -> Result<(), BacktestError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(BacktestError::invalid_config(
            field,
            format!("must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}
