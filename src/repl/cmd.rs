// パス: src/repl/cmd.rs
// 役割: REPL command loop, command parsing, and evaluation orchestration
// 意図: Drive interactive usage by routing each line to a command or to the engine
// 関連ファイル: src/engine.rs, src/display.rs, src/repl/printer.rs
//! Nosper の対話セッションにおけるコマンド処理と状態遷移を担当するモジュール。
//!
//! 1 行を先頭トークンと残りに分け、先頭がコマンド名ならその処理を、そうでなければ行全体を
//! 式として評価する。状態は `Idle → Running → Terminated` の順にしか進まない。

use std::io::{self, Write};

use crate::display::DisplayMode;
use crate::engine::Engine;
use crate::errors::SessionError;
use crate::loadable::{Catalog, Loadable};

use super::line_editor::ReadResult;
use super::printer::{
    render_loadable_info, render_loadable_list, HELP_TEXT, MORE_HELP_TEXT, PROMPT, WELCOME_TEXT,
};

/// REPL ループが必要とする行入力の抽象。
pub trait ReplLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult>;
    fn add_history(&mut self, entry: &str);
    fn save_history(&mut self) -> io::Result<()>;
}

/// セッションの状態。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Terminated,
}

/// 対話セッションがユーザーへ返す応答メッセージのカテゴリ。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplMsg {
    Out(String),
    Err(String),
}

/// REPL が解釈できるコマンドの集合。引数は個数の検査前のまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    MoreHelp,
    Ang,
    Rad,
    Deg,
    Load(Vec<String>),
    Unload(Vec<String>),
    ListLoad,
    LoadInfo(Vec<String>),
    DispNorm,
    DispSci(Vec<String>),
}

/// 1 行分の入力の分類。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Command(Command),
    Eval(String),
}

/// 生の入力文字列を `ReplInput` に分類する。
///
/// 先頭トークンがコマンド名でなければ、行全体（前後の空白を除く）を式として扱う。
pub fn parse_repl_input(input: &str) -> ReplInput {
    let line = input.trim();
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return ReplInput::Empty;
    };
    let args = || tokens.clone().map(str::to_string).collect::<Vec<_>>();
    let cmd = match head {
        "exit" => Command::Exit,
        "help" => Command::Help,
        "morehelp" => Command::MoreHelp,
        "ang" => Command::Ang,
        "rad" => Command::Rad,
        "deg" => Command::Deg,
        "load" => Command::Load(args()),
        "unload" => Command::Unload(args()),
        "listload" => Command::ListLoad,
        "loadinfo" => Command::LoadInfo(args()),
        "dispnorm" => Command::DispNorm,
        "dispsci" => Command::DispSci(args()),
        _ => return ReplInput::Eval(line.to_string()),
    };
    ReplInput::Command(cmd)
}

fn angle_mode_name(use_radians: bool) -> &'static str {
    if use_radians {
        "radians"
    } else {
        "degrees"
    }
}

/// 対話セッションの状態（エンジン・表示モード・実行状態）をまとめて保持する。
pub struct ReplSession<'c> {
    catalog: &'c Catalog,
    engine: Engine,
    display_mode: DisplayMode,
    phase: SessionPhase,
}

impl<'c> ReplSession<'c> {
    pub fn new(catalog: &'c Catalog, engine: Engine, display_mode: DisplayMode) -> Self {
        Self {
            catalog,
            engine,
            display_mode,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// `Idle` からのみ `Running` に進む。
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Running;
        }
    }

    pub fn terminate(&mut self) {
        self.phase = SessionPhase::Terminated;
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// 1 行を処理し、出力メッセージを返す。
    pub fn handle_line(&mut self, line: &str) -> Vec<ReplMsg> {
        match parse_repl_input(line) {
            ReplInput::Empty => Vec::new(),
            ReplInput::Command(cmd) => self.execute(cmd),
            ReplInput::Eval(src) => match self.evaluate(&src) {
                Ok(s) => vec![ReplMsg::Out(s)],
                Err(e) => vec![ReplMsg::Err(e.to_string())],
            },
        }
    }

    /// 式を評価し、その時点の表示モードで整形する。
    pub fn evaluate(&mut self, src: &str) -> Result<String, SessionError> {
        let value = self.engine.evaluate(src).map_err(|e| {
            tracing::debug!(input = src, error = %e, "evaluation failed");
            SessionError::from(e)
        })?;
        Ok(self.display_mode.format(value))
    }

    /// 解釈済みコマンドを実行し、出力メッセージを返す。
    pub fn execute(&mut self, cmd: Command) -> Vec<ReplMsg> {
        use Command::*;
        match cmd {
            Exit => {
                self.terminate();
                Vec::new()
            }
            Help => vec![ReplMsg::Out(HELP_TEXT.to_string())],
            MoreHelp => vec![ReplMsg::Out(MORE_HELP_TEXT.as_str().to_string())],
            Ang => vec![ReplMsg::Out(format!(
                "Current angle mode is {}",
                angle_mode_name(self.engine.angle_mode())
            ))],
            Rad => self.exec_switch_angle(true),
            Deg => self.exec_switch_angle(false),
            Load(args) => self.exec_with_loadable(&args, "load <set>", |engine, l| {
                engine.apply_loadable(l);
                format!("Loaded {}", l.name())
            }),
            Unload(args) => self.exec_with_loadable(&args, "unload <set>", |engine, l| {
                engine.remove_loadable(l);
                format!("Unloaded {}", l.name())
            }),
            ListLoad => vec![ReplMsg::Out(render_loadable_list(self.catalog))],
            LoadInfo(args) => self.exec_with_loadable(&args, "loadinfo <set>", |_, l| {
                render_loadable_info(l)
            }),
            DispNorm => {
                self.display_mode = DisplayMode::Normal;
                vec![ReplMsg::Out("Set display mode to normal".into())]
            }
            DispSci(args) => {
                self.display_mode =
                    DisplayMode::scientific_from_arg(args.first().map(String::as_str));
                vec![ReplMsg::Out(format!(
                    "Set display mode to {}",
                    self.display_mode
                ))]
            }
        }
    }

    fn exec_switch_angle(&mut self, use_radians: bool) -> Vec<ReplMsg> {
        let name = angle_mode_name(use_radians);
        if self.engine.angle_mode() == use_radians {
            return vec![ReplMsg::Out(format!("Already in {} mode", name))];
        }
        self.engine.set_angle_mode(use_radians);
        vec![ReplMsg::Out(format!("Switched to {}", name))]
    }

    /// 引数 1 個の loadable コマンドを共通の検査付きで実行する。
    fn exec_with_loadable<F>(&mut self, args: &[String], usage: &'static str, f: F) -> Vec<ReplMsg>
    where
        F: FnOnce(&mut Engine, &Loadable) -> String,
    {
        let name = match args {
            [name] => name,
            _ => return vec![ReplMsg::Err(SessionError::Usage { usage }.to_string())],
        };
        match self.catalog.get(name) {
            Some(loadable) => vec![ReplMsg::Out(f(&mut self.engine, loadable))],
            None => vec![ReplMsg::Err(
                SessionError::UnknownLoadable { name: name.clone() }.to_string(),
            )],
        }
    }
}

/// 対話セッションを最後まで実行する。
///
/// `exit`・入力の終端・出力の失敗のいずれでループを抜けても、履歴を保存したのち
/// `on_terminate` を一度だけ呼ぶ。出力の失敗はその後で返す。
pub fn run_repl_with<S, W, E, F>(
    editor: &mut S,
    session: &mut ReplSession<'_>,
    out: &mut W,
    err: &mut E,
    on_terminate: F,
) -> io::Result<()>
where
    S: ReplLineSource,
    W: Write,
    E: Write,
    F: FnOnce(),
{
    session.start();
    let mut failure = writeln!(out, "{}", WELCOME_TEXT).err();

    while failure.is_none() && session.is_running() {
        if let Err(e) = step(editor, session, out, err) {
            failure = Some(e);
        }
    }
    session.terminate();

    if let Err(e) = editor.save_history() {
        tracing::warn!(error = %e, "could not save history");
    }
    on_terminate();
    match failure {
        Some(e) => {
            tracing::warn!(error = %e, "session ended by output failure");
            Err(e)
        }
        None => Ok(()),
    }
}

/// 1 行を読み、処理し、応答を書き出す。
fn step<S, W, E>(
    editor: &mut S,
    session: &mut ReplSession<'_>,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    S: ReplLineSource,
    W: Write,
    E: Write,
{
    match editor.read_line(PROMPT) {
        Ok(ReadResult::Line(line)) => {
            let input = line.trim();
            if input.is_empty() {
                return Ok(());
            }
            editor.add_history(input);
            let msgs = session.handle_line(input);
            dispatch_messages(msgs, out, err)
        }
        Ok(ReadResult::Interrupted) => Ok(()),
        Ok(ReadResult::Eof) => {
            session.terminate();
            writeln!(out)
        }
        Err(e) => {
            session.terminate();
            writeln!(err, "input error: {}", e)
        }
    }
}

fn dispatch_messages<W: Write, E: Write>(
    msgs: Vec<ReplMsg>,
    out: &mut W,
    err: &mut E,
) -> io::Result<()> {
    for msg in msgs {
        match msg {
            ReplMsg::Out(s) => writeln!(out, "{}", s)?,
            ReplMsg::Err(s) => writeln!(err, "{}", s)?,
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::build().unwrap()
    }

    #[derive(Default)]
    struct ScriptedLineSource {
        events: VecDeque<ScriptEvent>,
        history: Vec<String>,
        saved: bool,
    }

    impl ScriptedLineSource {
        fn new(events: impl IntoIterator<Item = ScriptEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                history: Vec::new(),
                saved: false,
            }
        }
    }

    enum ScriptEvent {
        Line(&'static str),
        Interrupt,
        Eof,
    }

    impl ReplLineSource for ScriptedLineSource {
        fn read_line(&mut self, _prompt: &str) -> io::Result<ReadResult> {
            match self.events.pop_front().unwrap_or(ScriptEvent::Eof) {
                ScriptEvent::Line(s) => Ok(ReadResult::Line(s.to_string())),
                ScriptEvent::Interrupt => Ok(ReadResult::Interrupted),
                ScriptEvent::Eof => Ok(ReadResult::Eof),
            }
        }

        fn add_history(&mut self, entry: &str) {
            self.history.push(entry.to_string());
        }

        fn save_history(&mut self) -> io::Result<()> {
            self.saved = true;
            Ok(())
        }
    }

    fn outs(msgs: &[ReplMsg]) -> Vec<&str> {
        msgs.iter()
            .filter_map(|m| match m {
                ReplMsg::Out(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    fn first_err(msgs: &[ReplMsg]) -> Option<&str> {
        msgs.iter().find_map(|m| match m {
            ReplMsg::Err(s) => Some(s.as_str()),
            _ => None,
        })
    }

    #[test]
    /// 代表的な入力が想定した分類になるかを確認する。
    fn parse_repl_input_variants() {
        assert_eq!(parse_repl_input("   "), ReplInput::Empty);
        assert_eq!(parse_repl_input("exit"), ReplInput::Command(Command::Exit));
        assert_eq!(
            parse_repl_input("  load   unit  "),
            ReplInput::Command(Command::Load(vec!["unit".into()]))
        );
        assert_eq!(
            parse_repl_input("dispsci"),
            ReplInput::Command(Command::DispSci(vec![]))
        );
        assert_eq!(
            parse_repl_input("loadinfo a b"),
            ReplInput::Command(Command::LoadInfo(vec!["a".into(), "b".into()]))
        );
        assert_eq!(parse_repl_input(" 1 + 2 "), ReplInput::Eval("1 + 2".into()));
        // コマンド名で始まらない限り、似た名前でも式として扱う
        assert_eq!(parse_repl_input("exits"), ReplInput::Eval("exits".into()));
    }

    #[test]
    /// 同じ角度モードへの切り替えは "Already in" になり、状態は変わらない。
    fn angle_mode_switching() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        assert_eq!(outs(&s.execute(Command::Ang)), ["Current angle mode is radians"]);
        assert_eq!(outs(&s.execute(Command::Rad)), ["Already in radians mode"]);
        assert!(s.engine().angle_mode());
        assert_eq!(outs(&s.execute(Command::Deg)), ["Switched to degrees"]);
        assert!(!s.engine().angle_mode());
        assert_eq!(outs(&s.execute(Command::Deg)), ["Already in degrees mode"]);
        assert_eq!(outs(&s.execute(Command::Ang)), ["Current angle mode is degrees"]);
    }

    #[test]
    /// 引数個数の誤りは使い方を表示し、何も実行しない。
    fn loadable_commands_validate_argument_count() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        let msgs = s.handle_line("load");
        assert_eq!(
            first_err(&msgs),
            Some("Expected the name of a set to be provided (usage: load <set>)")
        );
        assert!(outs(&msgs).is_empty());
        let msgs = s.handle_line("unload unit phys");
        assert!(first_err(&msgs).unwrap().contains("usage: unload <set>"));
        let msgs = s.handle_line("loadinfo");
        assert!(first_err(&msgs).unwrap().contains("usage: loadinfo <set>"));
    }

    #[test]
    /// 存在しない loadable は報告だけして何もしない。
    fn unknown_loadable_is_reported() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        let before = s.engine().context().clone();
        let msgs = s.handle_line("load nope");
        assert_eq!(first_err(&msgs), Some("Loadable nope does not exist"));
        assert_eq!(s.engine().context(), &before);
    }

    #[test]
    /// 読み込んでいない loadable の解除も確認メッセージを出す。
    fn unload_never_loaded_still_confirms() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        let before = s.engine().context().clone();
        assert_eq!(outs(&s.handle_line("unload geom")), ["Unloaded geom"]);
        assert_eq!(s.engine().context(), &before);
    }

    #[test]
    /// 表示モードの切り替えは次の出力から反映される。
    fn display_mode_switching() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        assert_eq!(outs(&s.handle_line("1234")), ["1234"]);
        assert_eq!(
            outs(&s.handle_line("dispsci 2")),
            ["Set display mode to scientific (2 digits)"]
        );
        assert_eq!(outs(&s.handle_line("1234")), ["1.23e+3"]);
        assert_eq!(
            outs(&s.handle_line("dispsci")),
            ["Set display mode to scientific (4 digits)"]
        );
        assert_eq!(outs(&s.handle_line("dispnorm")), ["Set display mode to normal"]);
        assert_eq!(s.display_mode(), DisplayMode::Normal);
    }

    #[test]
    /// 評価の失敗はメッセージになるだけで、状態を変えない。
    fn evaluation_errors_do_not_change_state() {
        let catalog = catalog();
        let mut s = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        s.start();
        let msgs = s.handle_line("2 +");
        assert!(first_err(&msgs).unwrap().contains("PAR010"));
        let msgs = s.handle_line("load_me");
        assert!(first_err(&msgs).unwrap().contains("unknown symbol `load_me`"));
        assert!(s.is_running());
        assert_eq!(s.display_mode(), DisplayMode::Normal);
    }

    #[test]
    /// スクリプト駆動でループ全体を通し、終了処理が 1 回だけ呼ばれることを確認する。
    fn run_repl_with_script_executes_commands() {
        let catalog = catalog();
        let mut session = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        let mut script = ScriptedLineSource::new(vec![
            ScriptEvent::Line("1 + 2"),
            ScriptEvent::Line(""),
            ScriptEvent::Interrupt,
            ScriptEvent::Line("sin 0"),
            ScriptEvent::Line("load unit"),
            ScriptEvent::Line("3 in"),
            ScriptEvent::Line("bogus +"),
            ScriptEvent::Line("exit"),
            ScriptEvent::Line("1 + 1"),
        ]);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut terminated = 0;
        run_repl_with(&mut script, &mut session, &mut out, &mut err, || {
            terminated += 1
        })
        .unwrap();

        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.starts_with("Nosper TTY"));
        assert!(stdout.contains("\n3\n0\nLoaded unit\n0.0762\n"));
        assert!(!stdout.contains("\n2\n"), "input after exit must not be read");
        assert!(!String::from_utf8(err).unwrap().is_empty());
        assert_eq!(terminated, 1);
        assert_eq!(session.phase(), SessionPhase::Terminated);
        assert!(script.saved);
        assert_eq!(script.history.len(), 6);
        assert_eq!(script.events.len(), 1);
    }

    #[test]
    /// 入力の終端は exit と同じく終了処理を行う。
    fn eof_terminates_like_exit() {
        let catalog = catalog();
        let mut session = ReplSession::new(&catalog, Engine::new(), DisplayMode::Normal);
        let mut script = ScriptedLineSource::new(vec![ScriptEvent::Eof]);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut called = false;
        run_repl_with(&mut script, &mut session, &mut out, &mut err, || called = true).unwrap();
        assert!(called);
        assert_eq!(session.phase(), SessionPhase::Terminated);
    }
}
