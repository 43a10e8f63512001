//! 抽象構文木（AST）
//!
//! 目的:
//! - 構文解析結果を評価器と loadable カタログで共用できる表現に落とし込む。
//!
//! 設計ノート:
//! - 識別子は構文解析時に解決済み。仮引数は `Arg`（番号）、それ以外は `Symbol`（名前）となる。
//! - `Symbol` と `Call` は評価時に名前で引き直す（遅延束縛）。
//! - 代入は文レベルのみで、式の内部には現れない。

use std::fmt;

/// 二項演算子の種別。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
        }
    }
}

// 式ノード
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number {
        value: f64,
    },
    /// 変数参照（評価時に文脈から値を引く）。
    Symbol {
        name: String,
    },
    /// 関数本体内の仮引数スロット。
    Arg {
        index: usize,
    },
    Neg {
        operand: Box<Expr>,
    },
    Factorial {
        operand: Box<Expr>,
    },
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// `;` で区切られた 1 文。
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `a = b = expr` は `targets = [a, b]` として保持する。
    Assign { targets: Vec<String>, value: Expr },
    Expr(Expr),
}

/// 1 行分の入力。最後の文の値が結果になる。
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// 仮引数付きでコンパイル済みの関数本体。
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value } => write!(f, "{}", value),
            Expr::Symbol { name } => write!(f, "{}", name),
            Expr::Arg { index } => write!(f, "${}", index),
            Expr::Neg { operand } => write!(f, "(-{})", operand),
            Expr::Factorial { operand } => write!(f, "{}!", operand),
            Expr::BinOp { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = {}", self.name, self.params.join(", "), self.body)
    }
}
