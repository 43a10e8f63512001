// パス: src/lib.rs
// 役割: Crate root wiring modules and exports
// 意図: Expose the calculator engine and the REPL to the binary and tests
// 関連ファイル: src/engine.rs, src/repl/mod.rs, src/app.rs
//! Nosper TTY ルートモジュール
//!
//! 目的:
//! - 端末で使う電卓（式の評価・変数・loadable による関数/単位の追加）を提供する。
//!
//! 方針:
//! - コメント/ドキュメントは日本語、識別子は英語。
//! - 字句解析 → 構文解析 → 評価の各段はそれぞれのモジュールに閉じる。
//! - セッションの状態は `engine::Engine` と `repl::ReplSession` が持ち、グローバル状態は持たない。

pub mod app;
pub mod ast;
pub mod builtins;
pub mod config;
pub mod context;
pub mod display;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod lexer;
pub mod loadable;
pub mod logger;
pub mod parser;
pub mod repl;

// 便利な再エクスポート
pub use crate::display::DisplayMode;
pub use crate::engine::Engine;
pub use crate::errors::{EngineError, SessionError};
pub use crate::loadable::{Catalog, Loadable};
