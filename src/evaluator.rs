//! 評価器（evaluator）
//!
//! 目的:
//! - 解析済みの `Program` を `f64` で評価する。
//!
//! 動作の要点:
//! - 記号と関数呼び出しは評価時に名前で文脈から引く（遅延束縛）。loadable の解除後に
//!   同じ関数を呼ぶと、その時点の文脈に従ってエラーになる。
//! - 派生関数の呼び出しごとに新しい引数フレームを作り、入れ子の深さは `MAX_CALL_DEPTH` で打ち切る。
//! - `n!` は非負整数のみ。170 を超えると `f64` では無限大になる。

use crate::ast::{BinOp, Expr, Program, Statement};
use crate::context::{Context, Symbol};
use crate::errors::{EngineError, EvalError};

/// 派生関数の入れ子呼び出しの上限。
pub const MAX_CALL_DEPTH: usize = 256;

/// 1 行分のプログラムを評価し、最後の文の値を返す。
///
/// 代入は文ごとに即座に文脈へ反映されるため、途中で失敗しても先行する代入は残る。
pub fn eval_program(program: &Program, ctx: &mut Context) -> Result<f64, EngineError> {
    let mut last = None;
    for stmt in &program.statements {
        let v = match stmt {
            Statement::Assign { targets, value } => {
                let v = eval_expr(value, ctx)?;
                for name in targets {
                    ctx.assign(name, v);
                }
                v
            }
            Statement::Expr(e) => eval_expr(e, ctx)?,
        };
        last = Some(v);
    }
    last.ok_or_else(|| EngineError::Internal("empty program".into()))
}

/// 単一の式を評価する（引数フレームなし）。
pub fn eval_expr(e: &Expr, ctx: &Context) -> Result<f64, EngineError> {
    Evaluator { ctx }.eval(e, &[], 0)
}

struct Evaluator<'c> {
    ctx: &'c Context,
}

impl Evaluator<'_> {
    fn eval(&self, e: &Expr, frame: &[f64], depth: usize) -> Result<f64, EngineError> {
        match e {
            Expr::Number { value } => Ok(*value),
            Expr::Arg { index } => frame.get(*index).copied().ok_or_else(|| {
                EngineError::Internal(format!(
                    "argument slot {} out of range (frame has {})",
                    index,
                    frame.len()
                ))
            }),
            Expr::Symbol { name } => match self.ctx.get(name) {
                Some(Symbol::Value(v)) => Ok(*v),
                Some(_) => Err(EvalError::new(
                    "EVAL022",
                    format!("function `{}` used as a value", name),
                )
                .into()),
                None => Err(undefined(name)),
            },
            Expr::Neg { operand } => Ok(-self.eval(operand, frame, depth)?),
            Expr::Factorial { operand } => factorial(self.eval(operand, frame, depth)?),
            Expr::BinOp { op, left, right } => {
                let l = self.eval(left, frame, depth)?;
                let r = self.eval(right, frame, depth)?;
                Ok(apply_binop(*op, l, r))
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(self.eval(a, frame, depth)?);
                }
                self.call(name, &values, depth)
            }
        }
    }

    fn call(&self, name: &str, args: &[f64], depth: usize) -> Result<f64, EngineError> {
        match self.ctx.get(name) {
            Some(Symbol::Builtin(f)) => match args {
                [x] => Ok(f.apply(*x, self.ctx.use_radians)),
                _ => Err(arity_mismatch(name, 1, args.len())),
            },
            Some(Symbol::Derived(func)) => {
                if func.arity() != args.len() {
                    return Err(arity_mismatch(name, func.arity(), args.len()));
                }
                if depth >= MAX_CALL_DEPTH {
                    return Err(EvalError::new(
                        "EVAL030",
                        format!("maximum call depth {} exceeded in `{}`", MAX_CALL_DEPTH, name),
                    )
                    .into());
                }
                self.eval(&func.body, args, depth + 1)
            }
            Some(Symbol::Value(_)) => Err(EvalError::new(
                "EVAL020",
                format!("`{}` is not a function", name),
            )
            .into()),
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &str) -> EngineError {
    EvalError::new("EVAL010", format!("undefined symbol `{}`", name)).into()
}

fn arity_mismatch(name: &str, expected: usize, got: usize) -> EngineError {
    EvalError::new(
        "EVAL021",
        format!(
            "function `{}` expects {} argument(s), got {}",
            name, expected, got
        ),
    )
    .into()
}

fn apply_binop(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Rem => l % r,
        BinOp::Pow => l.powf(r),
    }
}

fn factorial(n: f64) -> Result<f64, EngineError> {
    if !(n >= 0.0 && n.fract() == 0.0) {
        return Err(EvalError::new(
            "EVAL040",
            format!("factorial is only defined for non-negative integers, got {}", n),
        )
        .into());
    }
    if n > 170.0 {
        return Ok(f64::INFINITY);
    }
    // n <= 170 なので u32 に収まる
    Ok((2..=n as u32).fold(1.0, |acc, k| acc * f64::from(k)))
}
