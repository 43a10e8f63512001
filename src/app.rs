// パス: src/app.rs
// 役割: 起動処理（設定・ログ・カタログ構築）と、バッチ/対話モードの振り分け
// 意図: バイナリ側を薄く保ち、終了コードの決定をテスト可能な関数に集める
// 関連ファイル: src/bin/nosper.rs, src/config.rs, src/repl/cmd.rs
//! アプリケーションのエントリポイント
//!
//! 終了コード:
//! - 0: 正常終了（対話モードは式のエラーがあっても 0）
//! - 1: バッチモードで式の評価に失敗
//! - 2: 設定の誤り（不正なログレベル、存在しない `--load` 名）
//! - 3: 組み込み loadable のカタログ構築に失敗、または入出力の致命的な失敗

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{Cli, Config};
use crate::engine::Engine;
use crate::errors::ConfigError;
use crate::loadable::{Catalog, BUILTIN_DATA};
use crate::logger::{self, LogLevel};
use crate::repl::{run_repl_with, LineEditor, ReplSession, StdinLineSource};

pub const EXIT_EVALUATION_FAILED: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_FATAL: u8 = 3;

pub fn run(cli: Cli) -> ExitCode {
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            logger::init(LogLevel::default());
            eprintln!("nosper: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    logger::init(config.log_level);

    let catalog = match build_catalog(BUILTIN_DATA, &mut io::stderr().lock()) {
        Ok(catalog) => catalog,
        Err(code) => return ExitCode::from(code),
    };

    let mut session = match prepare_session(&config, &catalog) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("nosper: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = match &config.expression {
        Some(expression) => {
            let stdout = io::stdout();
            let stderr = io::stderr();
            run_batch(&mut session, expression, &mut stdout.lock(), &mut stderr.lock())
                .map(|ok| if ok { 0 } else { EXIT_EVALUATION_FAILED })
        }
        None => run_interactive(&mut session, config.history_path.clone()).map(|()| 0),
    };
    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "i/o failure");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// loadable の定義からカタログを作る。失敗したら `err` に 1 行書き、終了コード 3 を返す。
///
/// 失敗時は REPL もバッチ評価も始めない。
pub fn build_catalog<E: Write>(definitions: &str, err: &mut E) -> Result<Catalog, u8> {
    Catalog::from_json(definitions).map_err(|e| {
        tracing::error!(error = %e, "loadable catalog could not be built");
        // 終了コードが失敗を伝えるので、書き込みの失敗は無視する
        let _ = writeln!(err, "nosper: fatal: {}", e);
        EXIT_FATAL
    })
}

/// 設定どおりの角度モード・表示モード・事前読み込みを施したセッションを作る。
pub fn prepare_session<'c>(
    config: &Config,
    catalog: &'c Catalog,
) -> Result<ReplSession<'c>, ConfigError> {
    let mut engine = Engine::new();
    engine.set_angle_mode(config.use_radians);
    for name in &config.preload {
        let loadable = catalog
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreload(name.clone()))?;
        engine.apply_loadable(loadable);
    }
    Ok(ReplSession::new(catalog, engine, config.display_mode))
}

/// 式を 1 回だけ評価する。結果は `out`、エラーは `err` に 1 行で書く。
///
/// 評価に成功したら true。
pub fn run_batch<W: Write, E: Write>(
    session: &mut ReplSession<'_>,
    expression: &str,
    out: &mut W,
    err: &mut E,
) -> io::Result<bool> {
    match session.evaluate(expression) {
        Ok(formatted) => {
            writeln!(out, "{}", formatted)?;
            Ok(true)
        }
        Err(e) => {
            writeln!(err, "{}", e)?;
            Ok(false)
        }
    }
}

fn run_interactive(session: &mut ReplSession<'_>, history_path: Option<PathBuf>) -> io::Result<()> {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let on_terminate = || tracing::debug!("session terminated");
    match LineEditor::new(history_path) {
        Ok(mut editor) => run_repl_with(&mut editor, session, &mut stdout, &mut stderr, on_terminate),
        Err(e) => {
            tracing::warn!(error = %e, "line editor unavailable, reading plain stdin");
            let stdin = io::stdin();
            if stdin.is_terminal() {
                let mut source = StdinLineSource::with_prompt(stdin.lock(), io::stdout());
                run_repl_with(&mut source, session, &mut stdout, &mut stderr, on_terminate)
            } else {
                let mut source = StdinLineSource::new(stdin.lock());
                run_repl_with(&mut source, session, &mut stdout, &mut stderr, on_terminate)
            }
        }
    }
}
