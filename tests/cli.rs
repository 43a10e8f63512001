// パス: tests/cli.rs
// 役割: ビルド済みバイナリを起動してバッチ/対話モードと終了コードを確かめる
// 意図: 引数解釈・環境変数・標準入出力の扱いをプロセス境界で保証する
// 関連ファイル: src/bin/nosper.rs, src/app.rs, src/config.rs
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn nosper_cli_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_nosper"))
}

fn nosper(args: &[&str], stdin: &str, history: Option<&std::path::Path>) -> Output {
    let mut cmd = Command::new(nosper_cli_path());
    // `--` より後ろはすべて位置引数になるため、フラグを先に置く
    match history {
        Some(path) => cmd.env("NOSPER_HISTORY", path),
        None => cmd.env_remove("NOSPER_HISTORY").arg("--no-history"),
    };
    cmd.args(args)
        .env_remove("NOSPER_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().expect("spawn nosper");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait nosper")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

#[test]
fn batch_prints_result() {
    let o = nosper(&["2+2"], "", None);
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "4\n");
    assert!(stderr(&o).is_empty());
}

#[test]
fn batch_failure_exits_one() {
    let o = nosper(&["2+"], "", None);
    assert_eq!(o.status.code(), Some(1));
    assert!(stdout(&o).is_empty());
    assert!(stderr(&o).starts_with("[PAR010]"), "{}", stderr(&o));
}

#[test]
/// 深すぎる入れ子も通常の評価エラーとして終了コード 1 になる。
fn batch_deep_nesting_exits_one() {
    let src = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let o = nosper(&[&src], "", None);
    assert_eq!(o.status.code(), Some(1));
    assert!(stderr(&o).starts_with("[PAR060]"), "{}", stderr(&o));
}

#[test]
/// 起動オプションがバッチ評価に反映される。
fn batch_honors_startup_options() {
    let o = nosper(&["--degrees", "sin 90"], "", None);
    assert_eq!(stdout(&o), "1\n");
    let o = nosper(&["--sci=2", "1234"], "", None);
    assert_eq!(stdout(&o), "1.23e+3\n");
    let o = nosper(&["--sci", "1234"], "", None);
    assert_eq!(stdout(&o), "1.2340e+3\n");
    let o = nosper(&["--load", "unit", "3 in"], "", None);
    assert_eq!(stdout(&o), "0.0762\n");
    let o = nosper(&["--", "-2 * 3"], "", None);
    assert_eq!(stdout(&o), "-6\n");
}

#[test]
fn configuration_errors_exit_two() {
    let o = nosper(&["--load", "nope", "1"], "", None);
    assert_eq!(o.status.code(), Some(2));
    assert!(stderr(&o).contains("nope"));
    let o = nosper(&["--log-level", "loud", "1"], "", None);
    assert_eq!(o.status.code(), Some(2));
}

#[test]
/// 端末でない標準入力からも対話セッションが動き、入力終端で正常終了する。
fn interactive_session_over_pipe() {
    let o = nosper(&[], "1 + 2\nload nope\nexit\n4\n", None);
    assert_eq!(o.status.code(), Some(0));
    let out = stdout(&o);
    assert!(out.starts_with("Nosper TTY"), "{}", out);
    assert!(out.contains("\n3\n"), "{}", out);
    assert!(!out.contains("\n4\n"), "{}", out);
    assert!(stderr(&o).contains("Loadable nope does not exist"));
}

#[test]
/// 対話モードでも深すぎる入れ子はその行のエラーで済み、セッションは続く。
fn interactive_deep_nesting_keeps_session() {
    let line = format!("{}1{}\n2 * 21\n", "(".repeat(50_000), ")".repeat(50_000));
    let o = nosper(&[], &line, None);
    assert_eq!(o.status.code(), Some(0));
    assert!(stderr(&o).contains("[PAR060]"));
    assert!(stdout(&o).contains("\n42\n"));
}

#[test]
/// 入力した行は履歴ファイルに保存される。
fn interactive_session_writes_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history");
    let o = nosper(&[], "6 * 7\n", Some(&path));
    assert_eq!(o.status.code(), Some(0));
    assert!(stdout(&o).contains("\n42\n"));
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.lines().any(|l| l == "6 * 7"), "{}", saved);
}
