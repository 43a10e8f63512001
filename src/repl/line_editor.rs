// パス: src/repl/line_editor.rs
// 役割: 履歴付きの行入力（rustyline）と、端末が使えない場合の標準入力読み取り
// 意図: REPL ループからは `ReplLineSource` だけが見えるようにし、入力元を差し替え可能にする
// 関連ファイル: src/repl/cmd.rs, src/app.rs
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use super::cmd::ReplLineSource;

/// 行入力が返す 3 種類の結果を表す列挙体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    Eof,
    Interrupted,
}

const MAX_HISTORY: usize = 1000;

/// rustyline による行編集。履歴ファイルは任意。
pub struct LineEditor {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl LineEditor {
    /// エディタを構築し、履歴ファイルがあれば読み込む。読み込みの失敗は致命的ではない。
    pub fn new(history_path: Option<PathBuf>) -> Result<Self, ReadlineError> {
        let config = Config::builder()
            .max_history_size(MAX_HISTORY)?
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)?;
        if let Some(path) = &history_path {
            match editor.load_history(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "loaded history"),
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not load history")
                }
            }
        }
        Ok(Self {
            editor,
            history_path,
        })
    }
}

impl ReplLineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(other) => Err(io::Error::other(other.to_string())),
        }
    }

    fn add_history(&mut self, entry: &str) {
        if let Err(e) = self.editor.add_history_entry(entry) {
            tracing::debug!(error = %e, "history entry rejected");
        }
    }

    fn save_history(&mut self) -> io::Result<()> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.editor.save_history(path).map_err(|e| match e {
            ReadlineError::Io(e) => e,
            other => io::Error::other(other.to_string()),
        })
    }
}

/// 行編集を使わずに任意の `BufRead` から 1 行ずつ読む入力元。
///
/// 端末を初期化できない環境でのフォールバックに使う。履歴は保持しない。
/// プロンプトは `with_prompt` で渡した出力先にだけ書く（`new` では捨てる）。
pub struct StdinLineSource<R, W = io::Sink> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead> StdinLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_prompt(reader, io::sink())
    }
}

impl<R: BufRead, W: Write> StdinLineSource<R, W> {
    pub fn with_prompt(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> ReplLineSource for StdinLineSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult> {
        write!(self.prompt_out, "{}", prompt)?;
        self.prompt_out.flush()?;
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(ReadResult::Eof);
        }
        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        Ok(ReadResult::Line(line))
    }

    fn add_history(&mut self, _entry: &str) {}

    fn save_history(&mut self) -> io::Result<()> {
        Ok(())
    }
}
