// パス: src/bin/nosper.rs
// 役割: Binary entrypoint that parses arguments and hands off to the app
// 意図: Keep process exit handling in one testable library function
// 関連ファイル: src/app.rs, src/config.rs, src/lib.rs
use std::process::ExitCode;

use clap::Parser;
use nosper::config::Cli;

fn main() -> ExitCode {
    nosper::app::run(Cli::parse())
}
