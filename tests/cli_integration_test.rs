//! CLI integration tests for config loading and command dispatch.
//!
//! Tests cover:
//! - Config validation (validate_backtest_config, validate_strategy_config,
//!   validate_data_config, results_path)
//! - `validate` and `backtest` commands run against real files on disk
//! - Exit codes for each error category

mod common;

use common::*;
use klinetest::adapters::file_config_adapter::FileConfigAdapter;
use klinetest::cli::{self, Cli, Command};
use klinetest::domain::config_validation::{
    results_path, validate_backtest_config, validate_data_config, validate_strategy_config,
    DataFormat,
};
use klinetest::domain::crossover::MaType;
use klinetest::domain::error::BacktestError;
use klinetest::domain::strategy::Strategy;
use klinetest::domain::tracker::DrawdownPolicy;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

const VALID_INI: &str = r#"
[backtest]
symbol = BTCUSDT
interval = 4h
starting_balance = 1000
order_balance = 10
take_profit = 5
stop_loss = 5

[strategy]
name = trend_follow
sma_period = 2
"#;

fn adapter(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

/// Temp directory holding `config.ini` and a `data/` directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        Self { dir }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn results(&self) -> PathBuf {
        self.dir.path().join("results.csv")
    }

    /// Write the config with `[data] dir` pointing at the workspace.
    fn write_config(&self, content: &str) -> PathBuf {
        self.write_config_with_data(content, "")
    }

    fn write_config_with_data(&self, content: &str, data_extra: &str) -> PathBuf {
        let path = self.dir.path().join("config.ini");
        let full = format!(
            "{content}\n[data]\ndir = {}\n{data_extra}\n",
            self.data_dir().display()
        );
        fs::write(&path, full).unwrap();
        path
    }

    fn write_csv(&self, name: &str, candles: &[Candle]) {
        fs::write(self.data_dir().join(name), candles_to_csv(candles)).unwrap();
    }
}

fn backtest(config: &Path, output: Option<PathBuf>, json: bool) -> ExitCode {
    cli::run(Cli {
        command: Command::Backtest {
            config: config.to_path_buf(),
            symbol: None,
            interval: None,
            output,
            json,
        },
    })
}

/// SMA(2) turns up on candle 1, the entry fills on candle 2 at 100 and the
/// take-profit at 105 hits on candle 3.
fn take_profit_series() -> Vec<Candle> {
    vec![
        make_candle(0, 98.0, 98.5, 97.5, 98.0),
        make_candle(1, 98.0, 99.5, 97.5, 99.0),
        make_candle(2, 99.0, 100.5, 98.5, 100.0),
        make_candle(3, 100.0, 106.0, 99.0, 101.0),
    ]
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

mod config_loading {
    use super::*;

    #[test]
    fn percent_values_become_fractions() {
        let config = validate_backtest_config(&adapter(VALID_INI)).unwrap();
        assert!((config.starting_balance - 1000.0).abs() < f64::EPSILON);
        assert!((config.order_balance_factor - 0.1).abs() < 1e-12);
        assert!((config.take_profit_factor - 0.05).abs() < 1e-12);
        assert!((config.stop_loss_factor - 0.05).abs() < 1e-12);
        assert_eq!(config.drawdown_policy, DrawdownPolicy::StartingBalance);
    }

    #[test]
    fn drawdown_policy_is_read() {
        let ini = VALID_INI.replace("stop_loss = 5", "stop_loss = 5\ndrawdown = peak");
        let config = validate_backtest_config(&adapter(&ini)).unwrap();
        assert_eq!(config.drawdown_policy, DrawdownPolicy::PeakBalance);
    }

    #[test]
    fn missing_balance_is_reported() {
        let ini = "[backtest]\norder_balance = 10\ntake_profit = 5\nstop_loss = 5\n";
        let err = validate_backtest_config(&adapter(ini)).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::ConfigMissing { ref section, ref key }
                if section == "backtest" && key == "starting_balance"
        ));
    }

    #[test]
    fn non_numeric_value_is_invalid() {
        let ini = VALID_INI.replace("take_profit = 5", "take_profit = lots");
        let err = validate_backtest_config(&adapter(&ini)).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigInvalid { ref key, .. } if key == "take_profit"));
    }

    #[test]
    fn order_balance_above_hundred_percent_is_invalid() {
        let ini = VALID_INI.replace("order_balance = 10", "order_balance = 150");
        let err = validate_backtest_config(&adapter(&ini)).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigInvalid { ref key, .. } if key == "order_balance"));
    }

    #[test]
    fn strategy_overrides_apply() {
        let strategy = validate_strategy_config(&adapter(VALID_INI)).unwrap();
        assert_eq!(strategy, Strategy::TrendFollow { sma_period: 2 });
    }

    #[test]
    fn crossover_strategy_reads_ma_type() {
        let ini = "[strategy]\nname = ma_crossover\nfast_period = 5\nslow_period = 20\nma_type = ema\n";
        match validate_strategy_config(&adapter(ini)).unwrap() {
            Strategy::MaCrossover(params) => {
                assert_eq!(params.fast_period, 5);
                assert_eq!(params.slow_period, 20);
                assert_eq!(params.ma_type, MaType::Ema);
            }
            other => panic!("expected ma_crossover, got {other:?}"),
        }
    }

    #[test]
    fn unknown_strategy_is_reported() {
        let ini = "[strategy]\nname = martingale\n";
        let err = validate_strategy_config(&adapter(ini)).unwrap_err();
        assert!(matches!(err, BacktestError::UnknownStrategy { ref name } if name == "martingale"));
    }

    #[test]
    fn data_settings_default_and_override() {
        let config = adapter(VALID_INI);
        let settings = validate_data_config(&config, None, None).unwrap();
        assert_eq!(settings.symbol, "BTCUSDT");
        assert_eq!(settings.interval, "4h");
        assert_eq!(settings.limit, None);
        assert_eq!(settings.dir, PathBuf::from("."));
        assert_eq!(settings.format, DataFormat::Csv);

        let settings = validate_data_config(&config, Some("ETHUSDT"), Some("1h")).unwrap();
        assert_eq!(settings.symbol, "ETHUSDT");
        assert_eq!(settings.interval, "1h");
    }

    #[test]
    fn zero_limit_is_invalid() {
        let ini = VALID_INI.replace("interval = 4h", "interval = 4h\nlimit = 0");
        let err = validate_data_config(&adapter(&ini), None, None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigInvalid { ref key, .. } if key == "limit"));
    }

    #[test]
    fn results_path_prefers_override() {
        let ini = format!("{VALID_INI}\n[output]\nresults = from_file.csv\n");
        let config = adapter(&ini);
        assert_eq!(
            results_path(&config, None),
            Some(PathBuf::from("from_file.csv"))
        );
        assert_eq!(
            results_path(&config, Some(PathBuf::from("cli.csv"))),
            Some(PathBuf::from("cli.csv"))
        );
        assert_eq!(results_path(&adapter(VALID_INI), None), None);
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_config_succeeds() {
        let ws = Workspace::new();
        let config = ws.write_config(VALID_INI);
        let code = cli::run(Cli {
            command: Command::Validate { config },
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn missing_config_file_exits_with_config_code() {
        let ws = Workspace::new();
        let code = cli::run(Cli {
            command: Command::Validate {
                config: ws.dir.path().join("absent.ini"),
            },
        });
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn validate_does_not_touch_data() {
        // no candle file exists; validation still passes
        let ws = Workspace::new();
        let config = ws.write_config(VALID_INI);
        assert!(fs::read_dir(ws.data_dir()).unwrap().next().is_none());
        let code = cli::run(Cli {
            command: Command::Validate { config },
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }
}

mod backtest_command {
    use super::*;

    #[test]
    fn writes_trade_log() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(VALID_INI);

        let code = backtest(&config, Some(ws.results()), false);
        assert_eq!(code, ExitCode::SUCCESS);

        let rows = read_rows(&ws.results());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "2024-01-01 12:00:00");
        let entry: f64 = rows[0][1].parse().unwrap();
        let exit: f64 = rows[0][2].parse().unwrap();
        let balance: f64 = rows[0][3].parse().unwrap();
        assert!((entry - 100.0).abs() < 1e-9);
        assert!((exit - 105.0).abs() < 1e-9);
        assert!((balance - 1005.0).abs() < 1e-9);
    }

    #[test]
    fn results_path_from_config_file() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let ini = format!("{VALID_INI}\n[output]\nresults = {}\n", ws.results().display());
        let config = ws.write_config(&ini);

        assert_eq!(backtest(&config, None, false), ExitCode::SUCCESS);
        assert_eq!(read_rows(&ws.results()).len(), 1);
    }

    #[test]
    fn json_summary_succeeds() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(VALID_INI);
        assert_eq!(backtest(&config, None, true), ExitCode::SUCCESS);
    }

    #[test]
    fn symbol_override_selects_file() {
        let ws = Workspace::new();
        ws.write_csv("ETHUSDT_1h.csv", &take_profit_series());
        let config = ws.write_config(VALID_INI);
        let code = cli::run(Cli {
            command: Command::Backtest {
                config,
                symbol: Some("ETHUSDT".into()),
                interval: Some("1h".into()),
                output: Some(ws.results()),
                json: false,
            },
        });
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(read_rows(&ws.results()).len(), 1);
    }

    #[test]
    fn crossover_runs_from_json_klines() {
        let ws = Workspace::new();
        let klines: Vec<String> = [10.0, 12.0, 11.0, 9.0, 13.0]
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let c = make_candle(i, *close, *close, *close, *close);
                format!(
                    r#"[{}, "{}", "{}", "{}", "{}", "1.0", {}]"#,
                    c.open_time,
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    c.open_time + FOUR_HOURS_MS - 1
                )
            })
            .collect();
        fs::write(
            ws.data_dir().join("BTCUSDT_4h_klines.json"),
            format!("[{}]", klines.join(",")),
        )
        .unwrap();
        let ini = VALID_INI.replace(
            "name = trend_follow\nsma_period = 2",
            "name = ma_crossover\nfast_period = 1\nslow_period = 2",
        );
        let config = ws.write_config_with_data(&ini, "format = json");

        assert_eq!(backtest(&config, Some(ws.results()), false), ExitCode::SUCCESS);
        let rows = read_rows(&ws.results());
        // bought at 12, sold at 11, bought again at 13 and still holding
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "12");
        assert_eq!(rows[0][2], "11");
        assert_eq!(rows[0][3], "999");
    }

    #[test]
    fn crossover_needs_only_starting_balance() {
        let ws = Workspace::new();
        let candles: Vec<Candle> = [10.0, 12.0, 11.0, 9.0, 13.0]
            .iter()
            .enumerate()
            .map(|(i, close)| make_candle(i, *close, *close, *close, *close))
            .collect();
        ws.write_csv("BTCUSDT_4h.csv", &candles);
        let ini = "[backtest]\nsymbol = BTCUSDT\ninterval = 4h\nstarting_balance = 1000\n\n\
                   [strategy]\nname = ma_crossover\nfast_period = 1\nslow_period = 2\n";
        let config = ws.write_config(ini);

        let code = cli::run(Cli {
            command: Command::Validate {
                config: config.clone(),
            },
        });
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(backtest(&config, Some(ws.results()), false), ExitCode::SUCCESS);
        assert_eq!(read_rows(&ws.results()).len(), 1);
    }

    #[test]
    fn order_params_still_required_outside_crossover() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(&VALID_INI.replace("order_balance = 10\n", ""));
        assert_eq!(backtest(&config, None, false), ExitCode::from(2));
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn bad_config_value_is_code_2() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(&VALID_INI.replace("stop_loss = 5", "stop_loss = 100"));
        assert_eq!(backtest(&config, None, false), ExitCode::from(2));
    }

    #[test]
    fn missing_data_file_is_code_3() {
        let ws = Workspace::new();
        let config = ws.write_config(VALID_INI);
        assert_eq!(backtest(&config, None, false), ExitCode::from(3));
    }

    #[test]
    fn unknown_strategy_is_code_4() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(&VALID_INI.replace("trend_follow", "grid_bot"));
        assert_eq!(backtest(&config, None, false), ExitCode::from(4));
    }

    #[test]
    fn malformed_candle_is_code_5() {
        let ws = Workspace::new();
        fs::write(
            ws.data_dir().join("BTCUSDT_4h.csv"),
            "open_time,open,high,low,close,volume\n1000,100,90,110,100,1\n",
        )
        .unwrap();
        let config = ws.write_config(VALID_INI);
        assert_eq!(backtest(&config, None, false), ExitCode::from(5));
    }

    #[test]
    fn unwritable_results_path_is_code_1() {
        let ws = Workspace::new();
        ws.write_csv("BTCUSDT_4h.csv", &take_profit_series());
        let config = ws.write_config(VALID_INI);
        let output = ws.dir.path().join("missing").join("results.csv");
        assert_eq!(backtest(&config, Some(output), false), ExitCode::from(1));
    }
}
