// パス: src/repl/mod.rs
// 役割: REPL module facade and re-exports
// 意図: Expose interactive entry points without leaking internals
// 関連ファイル: src/repl/cmd.rs, src/repl/line_editor.rs, src/app.rs
//! Nosper の対話環境を構成するモジュール群をまとめたファサード。
//!
//! - `cmd`: メインループとコマンド解釈
//! - `line_editor`: 行入力（rustyline と標準入力フォールバック）
//! - `printer`: バナー・ヘルプ・loadable 一覧の表示

pub mod cmd;
mod line_editor;
mod printer;

pub use cmd::{
    parse_repl_input, run_repl_with, Command, ReplInput, ReplLineSource, ReplMsg, ReplSession,
    SessionPhase,
};
pub use line_editor::{LineEditor, ReadResult, StdinLineSource};
pub use printer::{render_loadable_info, render_loadable_list, HELP_TEXT, WELCOME_TEXT};
