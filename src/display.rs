// パス: src/display.rs
// 役割: 評価結果の数値を表示用文字列へ整形する表示モード
// 意図: 通常表示と指数表示を閉じた列挙で表し、セッション中に丸ごと差し替えられるようにする
// 関連ファイル: src/repl/cmd.rs, src/app.rs
//! 表示モード
//!
//! - `Normal`: 有効数字 15 桁に丸めたうえで最短の 10 進表記。`1e21` 以上と `1e-6` 未満は
//!   `1e+21` / `1.5e-7` の指数表記になる。
//! - `Scientific`: 小数部をちょうど `precision` 桁にした指数表記（`1.23e+3`）。

use std::fmt;

/// `dispsci` に桁数が与えられなかった場合の既定値。
pub const DEFAULT_SCI_PRECISION: usize = 4;
/// 指数表記で指定できる小数部の最大桁数。
pub const MAX_SCI_PRECISION: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Normal,
    Scientific {
        precision: usize,
    },
}

impl DisplayMode {
    /// `dispsci` の引数から指数表示モードを作る。
    ///
    /// 数値として読めない・欠けている場合は既定の桁数。負数は 0、端数は切り捨て、上限は 100。
    pub fn scientific_from_arg(arg: Option<&str>) -> Self {
        let precision = arg
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|p| !p.is_nan())
            .map(|p| p.clamp(0.0, MAX_SCI_PRECISION as f64) as usize)
            .unwrap_or(DEFAULT_SCI_PRECISION);
        DisplayMode::Scientific { precision }
    }

    pub fn format(&self, value: f64) -> String {
        if let Some(s) = format_non_finite(value) {
            return s;
        }
        match *self {
            DisplayMode::Normal => format_normal(value),
            DisplayMode::Scientific { precision } => {
                signed_exponent(&format!("{:.*e}", precision, value))
            }
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Normal => write!(f, "normal"),
            DisplayMode::Scientific { precision } => {
                write!(f, "scientific ({} digits)", precision)
            }
        }
    }
}

fn format_non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".into())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        None
    }
}

fn format_normal(value: f64) -> String {
    if value == 0.0 {
        // -0 も 0 と表示する
        return "0".into();
    }
    // 2 進誤差（3 * 0.0254 = 0.07619999999999999 など）を表示から落とす
    let rounded = format!("{:.14e}", value)
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .unwrap_or(value);
    let magnitude = rounded.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        signed_exponent(&format!("{:e}", rounded))
    } else {
        format!("{}", rounded)
    }
}

/// Rust の `1.5e3` / `1.5e-3` を `1.5e+3` / `1.5e-3` に揃える。
fn signed_exponent(s: &str) -> String {
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s.to_string(),
    }
}
