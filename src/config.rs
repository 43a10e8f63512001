// パス: src/config.rs
// 役割: コマンドライン引数と環境変数から起動設定を組み立てる
// 意図: clap の解析結果を、テストでも直接作れる素の `Config` 値に落とし込む
// 関連ファイル: src/app.rs, src/logger.rs, src/display.rs

use std::path::PathBuf;

use clap::Parser;

use crate::display::DisplayMode;
use crate::errors::ConfigError;
use crate::logger::LogLevel;

/// 履歴ファイルの場所を上書きする環境変数。
pub const HISTORY_ENV: &str = "NOSPER_HISTORY";
/// ログレベルを指定する環境変数（`--log-level` が優先）。
pub const LOG_ENV: &str = "NOSPER_LOG";
/// `$HOME` 直下に置く既定の履歴ファイル名。
pub const HISTORY_FILE_NAME: &str = ".nosper_history";

/// Nosper TTY - open source terminal-based calculator.
///
/// With no EXPRESSION an interactive session is started.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "nosper", version)]
pub struct Cli {
    /// Evaluate EXPRESSION once, print the result and exit
    #[arg(value_name = "EXPRESSION")]
    pub expression: Option<String>,

    /// Start in degrees mode instead of radians
    #[arg(long)]
    pub degrees: bool,

    /// Start in scientific display mode (`--sci=N` digits after the decimal point)
    #[arg(
        long,
        value_name = "DIGITS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "default"
    )]
    pub sci: Option<String>,

    /// Load a set of variables and functions before starting (repeatable)
    #[arg(long = "load", value_name = "NAME")]
    pub load: Vec<String>,

    /// Do not read or write the history file
    #[arg(long)]
    pub no_history: bool,

    /// Log verbosity on stderr (overrides NOSPER_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// 起動設定。
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `Some` ならバッチモード
    pub expression: Option<String>,
    pub use_radians: bool,
    pub display_mode: DisplayMode,
    pub preload: Vec<String>,
    pub history_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Config {
    /// プロセスの環境変数を使って設定を組み立てる。
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_cli_with_env(cli, |key| std::env::var(key).ok())
    }

    /// 環境変数の参照方法を差し替えられる版。
    pub fn from_cli_with_env<F>(cli: Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match cli.log_level {
            Some(level) => level,
            None => match env(LOG_ENV).filter(|v| !v.trim().is_empty()) {
                Some(v) => v.parse()?,
                None => LogLevel::default(),
            },
        };

        // 値なしの `--sci` は "default" が入り、数値として読めないので既定桁数になる
        let display_mode = match cli.sci.as_deref() {
            None => DisplayMode::Normal,
            Some(digits) => DisplayMode::scientific_from_arg(Some(digits)),
        };

        let history_path = if cli.no_history {
            None
        } else {
            resolve_history_path(&env)
        };

        Ok(Self {
            expression: cli.expression,
            use_radians: !cli.degrees,
            display_mode,
            preload: cli.load,
            history_path,
            log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expression: None,
            use_radians: true,
            display_mode: DisplayMode::Normal,
            preload: Vec::new(),
            history_path: None,
            log_level: LogLevel::default(),
        }
    }
}

fn resolve_history_path<F>(env: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = env(HISTORY_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    env("HOME")
        .filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(HISTORY_FILE_NAME))
}
