// パス: src/builtins.rs
// 役割: 組み込み定数・組み込み関数の定義メタデータと数値実装を集約する
// 意図: 評価文脈の初期化とヘルプ表示で同じ一覧を共有する
// 関連ファイル: src/context.rs, src/evaluator.rs, src/repl/printer.rs
//! 組み込み定義モジュール
//!
//! - 名前と分類情報を `BUILTINS` に一元管理し、文脈の初期化・`morehelp` の一覧で重複列挙を防ぐ。
//! - 三角関数は角度モードを引数に取り、度数法では入力（逆関数は出力）を変換する。

use std::f64::consts::{E, PI, TAU};

/// 組み込みの単項関数。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Cbrt,
    Abs,
    Log,
    Ln,
    Round,
    Floor,
    Ceil,
}

impl BuiltinFn {
    /// 現在の角度モードで関数を適用する。
    pub fn apply(self, x: f64, use_radians: bool) -> f64 {
        let to_rad = |v: f64| if use_radians { v } else { v.to_radians() };
        let from_rad = |v: f64| if use_radians { v } else { v.to_degrees() };
        match self {
            BuiltinFn::Sin => to_rad(x).sin(),
            BuiltinFn::Cos => to_rad(x).cos(),
            BuiltinFn::Tan => to_rad(x).tan(),
            BuiltinFn::Asin => from_rad(x.asin()),
            BuiltinFn::Acos => from_rad(x.acos()),
            BuiltinFn::Atan => from_rad(x.atan()),
            BuiltinFn::Sqrt => x.sqrt(),
            BuiltinFn::Cbrt => x.cbrt(),
            BuiltinFn::Abs => x.abs(),
            BuiltinFn::Log => x.log10(),
            BuiltinFn::Ln => x.ln(),
            BuiltinFn::Round => x.round(),
            BuiltinFn::Floor => x.floor(),
            BuiltinFn::Ceil => x.ceil(),
        }
    }
}

/// 組み込みの分類。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuiltinKind {
    Constant(f64),
    Function(BuiltinFn),
}

/// 組み込み定義。`example` はヘルプに載せる入力例。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuiltinDef {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub description: &'static str,
    pub example: &'static str,
}

const fn constant(
    name: &'static str,
    value: f64,
    description: &'static str,
    example: &'static str,
) -> BuiltinDef {
    BuiltinDef {
        name,
        kind: BuiltinKind::Constant(value),
        description,
        example,
    }
}

const fn function(
    name: &'static str,
    f: BuiltinFn,
    description: &'static str,
    example: &'static str,
) -> BuiltinDef {
    BuiltinDef {
        name,
        kind: BuiltinKind::Function(f),
        description,
        example,
    }
}

/// 黄金比 (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;
/// 白銀比 1 + √2
pub const SILVER_RATIO: f64 = 2.414_213_562_373_095;

/// 計算機が標準で提供する定数・関数の一覧（ヘルプの表示順）。
pub const BUILTINS: &[BuiltinDef] = &[
    constant("pi", PI, "Pi", "3.141..."),
    constant("tau", TAU, "Tau", "6.283..."),
    constant("e", E, "Euler's number", "2.718..."),
    constant("phi", PHI, "Phi (golden ratio)", "1.618..."),
    constant("silv", SILVER_RATIO, "Silver ratio", "2.414..."),
    function("sin", BuiltinFn::Sin, "Sine", "sin 45"),
    function("cos", BuiltinFn::Cos, "Cosine", "cos 45"),
    function("tan", BuiltinFn::Tan, "Tangent", "tan 45"),
    function("asin", BuiltinFn::Asin, "Arc sine", "asin 1"),
    function("acos", BuiltinFn::Acos, "Arc cosine", "acos 0.5"),
    function("atan", BuiltinFn::Atan, "Arc tangent", "atan 1"),
    function("sqrt", BuiltinFn::Sqrt, "Square root", "sqrt 2"),
    function("cbrt", BuiltinFn::Cbrt, "Cube root", "cbrt 8"),
    function("abs", BuiltinFn::Abs, "Absolute value", "abs -1"),
    function("log", BuiltinFn::Log, "Logarithm (base 10)", "log 250"),
    function("ln", BuiltinFn::Ln, "Natural logarithm", "ln 10"),
    function("round", BuiltinFn::Round, "Round half away from zero", "round 0.64"),
    function("floor", BuiltinFn::Floor, "Round down", "floor 0.77"),
    function("ceil", BuiltinFn::Ceil, "Round up", "ceil 4.55"),
];
