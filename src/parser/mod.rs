// パス: src/parser/mod.rs
// 役割: トークン列から AST を生成する再帰下降パーサのエントリポイント
// 意図: 識別子をスコープで解決しながら構文解析し、評価器と loadable の両方へ渡す
// 関連ファイル: src/parser/expr.rs, src/lexer.rs, src/context.rs
//! 構文解析モジュール
//!
//! - 演算子の優先順位は `add > quot(//) > mul(暗黙含む) > unary > pow > postfix(!)` の順でハンドコードする。
//! - 識別子は `Scope` に問い合わせて変数・関数を区別する。未知の名前は構文解析の時点でエラー。
//! - `compile_function` は loadable の関数本体を仮引数付きでコンパイルする独立した入口。

use std::collections::HashSet;

use crate::ast::{Expr, Function, Program};
use crate::errors::ParseError;
use crate::lexer::{lex, Token, TokenKind};

mod expr;

/// 括弧・前置演算子・演算子の連鎖を合わせた入れ子の上限。
pub const MAX_NESTING: usize = 256;

/// 構文解析時に識別子が指すものの種別。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Value,
    Function { arity: usize },
}

/// 構文解析時の名前解決に使う読み取り専用の問い合わせ口。
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<SymbolKind>;
}

pub struct Parser<'s> {
    ts: Vec<Token>,
    i: usize,
    scope: &'s dyn Scope,
    params: &'s [String],
    // 同じ入力内で先に代入された名前
    assigned: HashSet<String>,
    depth: usize,
}

impl<'s> Parser<'s> {
    /// トークン列から新しいパーサインスタンスを構築する。
    pub fn new(tokens: Vec<Token>, scope: &'s dyn Scope, params: &'s [String]) -> Self {
        Self {
            ts: tokens,
            i: 0,
            scope,
            params,
            assigned: HashSet::new(),
            depth: 0,
        }
    }

    /// 入れ子を 1 段深くする。上限を超えたら PAR060。
    pub(super) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::new(
                "PAR060",
                format!("expression nested too deeply (limit {})", MAX_NESTING),
                Some(self.peek().pos),
            ));
        }
        Ok(())
    }

    pub(super) fn peek(&self) -> &Token {
        // lex は必ず末尾に EOF を置くため、末尾を越えたら EOF を返し続ける
        let last = self.ts.len().saturating_sub(1);
        &self.ts[self.i.min(last)]
    }

    pub(super) fn pop_any(&mut self) -> Token {
        let t = self.peek().clone();
        if t.kind != TokenKind::EOF {
            self.i += 1;
        }
        t
    }

    pub(super) fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.ts.get(self.i + offset).map(|t| t.kind)
    }

    pub(super) fn pop(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let t = self.peek().clone();
        if t.kind != kind {
            return Err(unexpected(&t, &format!("{:?}", kind)));
        }
        self.i += 1;
        Ok(t)
    }

    pub(super) fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek().kind == kind {
            Some(self.pop_any())
        } else {
            None
        }
    }

    /// 仮引数 → 同一入力内の代入 → スコープの順で名前を解決する。
    pub(super) fn resolve(&self, name: &str) -> Option<Resolved> {
        if let Some(index) = self.params.iter().position(|p| p == name) {
            return Some(Resolved::Arg(index));
        }
        if self.assigned.contains(name) {
            return Some(Resolved::Symbol(SymbolKind::Value));
        }
        self.scope.lookup(name).map(Resolved::Symbol)
    }

    pub(super) fn expect_eof(&self) -> Result<(), ParseError> {
        let t = self.peek();
        if t.kind != TokenKind::EOF {
            return Err(ParseError::new(
                "PAR090",
                format!("unexpected token `{}`", t.value),
                Some(t.pos),
            ));
        }
        Ok(())
    }
}

pub(super) enum Resolved {
    Arg(usize),
    Symbol(SymbolKind),
}

pub(super) fn unexpected(t: &Token, expected: &str) -> ParseError {
    if t.kind == TokenKind::EOF {
        ParseError::new(
            "PAR010",
            format!("unexpected end of input, expected {}", expected),
            Some(t.pos),
        )
    } else {
        ParseError::new(
            "PAR001",
            format!("expected {} but found `{}`", expected, t.value),
            Some(t.pos),
        )
    }
}

/// 1 行分の入力（`;` 区切りの文の並び）を解析する。
pub fn parse_program(src: &str, scope: &dyn Scope) -> Result<Program, ParseError> {
    let ts = lex(src)?;
    let mut p = Parser::new(ts, scope, &[]);
    let program = p.parse_program()?;
    p.expect_eof()?;
    Ok(program)
}

/// 単一の式を解析する（代入や `;` は含まない）。
pub fn parse_expr(src: &str, scope: &dyn Scope) -> Result<Expr, ParseError> {
    let ts = lex(src)?;
    let mut p = Parser::new(ts, scope, &[]);
    let e = p.parse_expr()?;
    p.expect_eof()?;
    Ok(e)
}

/// 仮引数 `params` を `Arg(0..N-1)` として解決しながら関数本体をコンパイルする。
///
/// # Examples
/// ```
/// use nosper::context::Context;
/// use nosper::parser::compile_function;
/// let ctx = Context::new();
/// let params = vec!["r".to_string()];
/// let f = compile_function("circlearea", &params, "pi r^2", &ctx).unwrap();
/// assert_eq!(f.arity(), 1);
/// ```
pub fn compile_function(
    name: &str,
    params: &[String],
    body: &str,
    scope: &dyn Scope,
) -> Result<Function, ParseError> {
    let mut seen = HashSet::new();
    for p in params {
        if !seen.insert(p.as_str()) {
            return Err(ParseError::new(
                "PAR040",
                format!("duplicate parameter `{}`", p),
                None,
            ));
        }
    }
    let ts = lex(body)?;
    let mut parser = Parser::new(ts, scope, params);
    let body = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(Function {
        name: name.to_string(),
        params: params.to_vec(),
        body,
    })
}
