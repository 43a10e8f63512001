// パス: src/parser/expr.rs
// 役割: 文・式の解析に関する `Parser` 実装をまとめる
// 意図: 優先順位ごとの再帰下降と暗黙の乗算・括弧なし関数呼び出しを専用モジュールに切り分ける
// 関連ファイル: src/parser/mod.rs, src/ast.rs

use super::*;
use crate::ast::{BinOp, Statement};

impl<'s> Parser<'s> {
    pub(super) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = vec![self.parse_statement()?];
        while self.accept(TokenKind::SEMI).is_some() {
            if self.peek().kind == TokenKind::EOF {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let mut targets = Vec::new();
        while self.peek().kind == TokenKind::IDENT && self.peek_kind(1) == Some(TokenKind::EQUAL) {
            let name_tok = self.pop(TokenKind::IDENT)?;
            if let Some(Resolved::Symbol(SymbolKind::Function { .. })) = self.resolve(&name_tok.value)
            {
                return Err(ParseError::new(
                    "PAR050",
                    format!("cannot assign to function `{}`", name_tok.value),
                    Some(name_tok.pos),
                ));
            }
            self.pop(TokenKind::EQUAL)?;
            targets.push(name_tok.value);
        }
        let value = self.parse_expr()?;
        if targets.is_empty() {
            return Ok(Statement::Expr(value));
        }
        // 右辺の解析が終わってから名前を見えるようにする（`x = x + 1` は既存の x を要求する）
        self.assigned.extend(targets.iter().cloned());
        Ok(Statement::Assign { targets, value })
    }

    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.parse_quotient()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::PLUS => BinOp::Add,
                TokenKind::MINUS => BinOp::Sub,
                _ => break,
            };
            self.pop_any();
            // 左結合の連鎖も木を 1 段ずつ深くする
            self.enter()?;
            let rhs = self.parse_quotient()?;
            lhs = binop(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn parse_quotient(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.parse_term()?;
        while self.accept(TokenKind::DSLASH).is_some() {
            self.enter()?;
            let rhs = self.parse_term()?;
            lhs = binop(BinOp::Div, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::STAR => Some(BinOp::Mul),
                TokenKind::SLASH => Some(BinOp::Div),
                TokenKind::PERCENT => Some(BinOp::Rem),
                k if starts_primary(k) => None,
                _ => break,
            };
            // 演算子なしで項が続く場合は暗黙の乗算
            let op = match op {
                Some(op) => {
                    self.pop_any();
                    op
                }
                None => BinOp::Mul,
            };
            self.enter()?;
            let rhs = self.parse_unary()?;
            lhs = binop(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    /// 括弧・前置演算子・冪の右辺・関数の引数はすべてここを通るため、再帰の深さはここで数える。
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let e = self.parse_signed();
        self.depth -= 1;
        e
    }

    fn parse_signed(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind {
            TokenKind::MINUS => {
                self.pop_any();
                let operand = self.parse_unary()?;
                Ok(Expr::Neg {
                    operand: Box::new(operand),
                })
            }
            TokenKind::PLUS => {
                self.pop_any();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if matches!(self.peek().kind, TokenKind::CARET | TokenKind::DBLSTAR) {
            self.pop_any();
            // 右辺を unary で取るため `2^3^2 = 2^(3^2)`、`2^-1` も書ける
            let exponent = self.parse_unary()?;
            return Ok(binop(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut e = self.parse_primary()?;
        while self.accept(TokenKind::BANG).is_some() {
            self.enter()?;
            e = Expr::Factorial {
                operand: Box::new(e),
            };
        }
        self.depth = base;
        Ok(e)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::NUMBER => {
                self.pop_any();
                let value = t.value.parse::<f64>().map_err(|_| {
                    ParseError::new("PAR002", format!("invalid number `{}`", t.value), Some(t.pos))
                })?;
                Ok(Expr::Number { value })
            }
            TokenKind::LPAREN => {
                self.pop_any();
                let e = self.parse_expr()?;
                self.pop(TokenKind::RPAREN)?;
                Ok(e)
            }
            TokenKind::IDENT => {
                self.pop_any();
                self.parse_identifier(t)
            }
            _ => Err(unexpected(&t, "expression")),
        }
    }

    fn parse_identifier(&mut self, t: Token) -> Result<Expr, ParseError> {
        match self.resolve(&t.value) {
            Some(Resolved::Arg(index)) => Ok(Expr::Arg { index }),
            Some(Resolved::Symbol(SymbolKind::Value)) => Ok(Expr::Symbol { name: t.value }),
            Some(Resolved::Symbol(SymbolKind::Function { arity })) => self.parse_call(t, arity),
            None => Err(ParseError::new(
                "PAR020",
                format!("unknown symbol `{}`", t.value),
                Some(t.pos),
            )),
        }
    }

    fn parse_call(&mut self, name_tok: Token, arity: usize) -> Result<Expr, ParseError> {
        let args = if self.accept(TokenKind::LPAREN).is_some() {
            let mut args = Vec::new();
            if self.accept(TokenKind::RPAREN).is_none() {
                loop {
                    args.push(self.parse_expr()?);
                    if self.accept(TokenKind::COMMA).is_none() {
                        break;
                    }
                }
                self.pop(TokenKind::RPAREN)?;
            }
            if args.len() != arity {
                return Err(ParseError::new(
                    "PAR030",
                    format!(
                        "function `{}` expects {} argument(s), got {}",
                        name_tok.value,
                        arity,
                        args.len()
                    ),
                    Some(name_tok.pos),
                ));
            }
            args
        } else {
            match arity {
                0 => Vec::new(),
                1 => vec![self.parse_unary()?],
                _ => {
                    return Err(ParseError::new(
                        "PAR031",
                        format!(
                            "function `{}` expects {} arguments; use `{}(a, b, ...)`",
                            name_tok.value, arity, name_tok.value
                        ),
                        Some(name_tok.pos),
                    ))
                }
            }
        };
        Ok(Expr::Call {
            name: name_tok.value,
            args,
        })
    }
}

fn starts_primary(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::NUMBER | TokenKind::IDENT | TokenKind::LPAREN
    )
}

fn binop(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
