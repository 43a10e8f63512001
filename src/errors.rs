//! エラー型の定義（共通フォーマット: \[CODE\] メッセージ @pos）。
//!
//! - 式エンジン内部の診断は `ErrorInfo` を包んだ newtype で表す。
//! - セッション境界・起動時の失敗は `thiserror` で列挙型にまとめる。

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub msg: String,
    pub pos: Option<usize>, // バイトオフセット（任意）
}

impl ErrorInfo {
    pub fn new(code: &'static str, msg: impl Into<String>, pos: Option<usize>) -> Self {
        Self {
            code,
            msg: msg.into(),
            pos,
        }
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(p) => write!(f, "[{}] {} @pos={}", self.code, self.msg, p),
            None => write!(f, "[{}] {}", self.code, self.msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError(pub ErrorInfo);
impl LexerError {
    pub fn new(code: &'static str, msg: impl Into<String>, pos: Option<usize>) -> Self {
        Self(ErrorInfo::new(code, msg, pos))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub ErrorInfo);
impl ParseError {
    pub fn new(code: &'static str, msg: impl Into<String>, pos: Option<usize>) -> Self {
        Self(ErrorInfo::new(code, msg, pos))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError(pub ErrorInfo);
impl EvalError {
    pub fn new(code: &'static str, msg: impl Into<String>) -> Self {
        Self(ErrorInfo::new(code, msg, None))
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
impl StdError for LexerError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
impl StdError for ParseError {}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
impl StdError for EvalError {}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        // 字句エラーは構文エラーとして扱い、コードと位置はそのまま引き継ぐ
        ParseError(e.0)
    }
}

/// 式エンジン (`Engine::evaluate`) が返す失敗。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// 評価器自身の不整合。利用者には詳細を見せない。
    #[error("internal evaluator fault: {0}")]
    Internal(String),
}

impl EngineError {
    /// 利用者の入力に起因する失敗かどうか。
    pub fn is_evaluation_error(&self) -> bool {
        !matches!(self, EngineError::Internal(_))
    }
}

/// セッション境界で 1 行のメッセージに変換されるエラー分類。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{message}")]
    Evaluation { message: String },
    #[error("Unknown error evaluating expression")]
    Unknown,
    #[error("Expected the name of a set to be provided (usage: {usage})")]
    Usage { usage: &'static str },
    #[error("Loadable {name} does not exist")]
    UnknownLoadable { name: String },
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        if e.is_evaluation_error() {
            SessionError::Evaluation {
                message: e.to_string(),
            }
        } else {
            tracing::debug!(error = %e, "evaluation failed internally");
            SessionError::Unknown
        }
    }
}

/// 起動時の loadable カタログ構築に失敗したことを表す致命的エラー。
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("loadable data is malformed: {0}")]
    Data(#[from] serde_json::Error),
    #[error("loadable `{loadable}`: variable `{variable}` could not be resolved: {source}")]
    Variable {
        loadable: String,
        variable: String,
        #[source]
        source: EngineError,
    },
    #[error("loadable `{loadable}`: function `{function}` failed to compile: {source}")]
    Compile {
        loadable: String,
        function: String,
        #[source]
        source: ParseError,
    },
}

/// コマンドライン・環境変数から設定を組み立てる際の失敗。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown log level `{0}` (expected error, warn, info, debug or trace)")]
    LogLevel(String),
    #[error("cannot preload: loadable `{0}` does not exist")]
    UnknownPreload(String),
}
