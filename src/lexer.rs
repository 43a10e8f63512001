// パス: src/lexer.rs
// 役割: 数式 1 行分を位置付きトークン列へ変換する字句解析器
// 意図: 構文解析に必要な最小限のトークンと診断位置を提供する
// 関連ファイル: src/parser/mod.rs, src/errors.rs, tests/expressions.rs
//! 字句解析モジュール
//!
//! - 入力は REPL の 1 行（またはバッチ引数）を想定し、行・列ではなくバイト位置のみ記録する。
//! - 数値は `10` / `0.5` / `.5` / `5e3` / `1.2E-4` を受け付ける。
//! - 識別子の直前に数値があっても分割する（`3in` は `3` と `in`）。

use crate::errors::LexerError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// 生成されたトークンとその位置情報を保持するレコード。
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// 字句解析で識別されるトークンの分類。
pub enum TokenKind {
    EOF,
    NUMBER,
    IDENT,
    PLUS,
    MINUS,
    STAR,
    DBLSTAR,
    SLASH,
    DSLASH, // 低優先度の除算 `//`
    PERCENT,
    CARET,
    BANG,
    LPAREN,
    RPAREN,
    COMMA,
    SEMI,
    EQUAL,
}

/// 空白文字かどうかを判定するユーティリティ。
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
/// 10 進数字かどうかを判定するユーティリティ。
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}
/// 識別子の先頭に使用可能な文字かどうかを判定する。
fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
/// 識別子の後続として許容される文字か判定する。
fn is_ident_rest(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    src: &'a str,
    cursor: usize,
    len: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            cursor: 0,
            len: src.len(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexerError> {
        while self.cursor < self.len {
            if self.consume_whitespace() {
                continue;
            }
            self.lex_token()?;
        }
        self.push_simple(TokenKind::EOF, "", self.len);
        Ok(self.tokens)
    }

    fn consume_whitespace(&mut self) -> bool {
        let mut advanced = false;
        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) {
                self.advance_char();
                advanced = true;
            } else {
                break;
            }
        }
        advanced
    }

    fn lex_token(&mut self) -> Result<(), LexerError> {
        let start = self.cursor;
        let Some(ch) = self.peek_char() else {
            return Ok(());
        };
        if self.try_multi_char_symbol(ch) {
            return Ok(());
        }
        if self.try_single_char_symbol(ch) {
            return Ok(());
        }
        if is_digit(ch) || (ch == '.' && self.peek_second_char().is_some_and(is_digit)) {
            self.lex_number();
            return Ok(());
        }
        if is_letter(ch) {
            self.lex_identifier();
            return Ok(());
        }
        Err(LexerError::new(
            "LEX090",
            format!("unexpected character {:?}", ch),
            Some(start),
        ))
    }

    fn try_multi_char_symbol(&mut self, first: char) -> bool {
        let Some(second) = self.peek_second_char() else {
            return false;
        };
        let token = match (first, second) {
            ('*', '*') => Some((TokenKind::DBLSTAR, "**")),
            ('/', '/') => Some((TokenKind::DSLASH, "//")),
            _ => None,
        };
        if let Some((kind, value)) = token {
            let start = self.cursor;
            self.advance_bytes(first.len_utf8() + second.len_utf8());
            self.push_simple(kind, value, start);
            return true;
        }
        false
    }

    fn try_single_char_symbol(&mut self, ch: char) -> bool {
        let token = match ch {
            '+' => Some((TokenKind::PLUS, "+")),
            '-' => Some((TokenKind::MINUS, "-")),
            '*' => Some((TokenKind::STAR, "*")),
            '/' => Some((TokenKind::SLASH, "/")),
            '%' => Some((TokenKind::PERCENT, "%")),
            '^' => Some((TokenKind::CARET, "^")),
            '!' => Some((TokenKind::BANG, "!")),
            '(' => Some((TokenKind::LPAREN, "(")),
            ')' => Some((TokenKind::RPAREN, ")")),
            ',' => Some((TokenKind::COMMA, ",")),
            ';' => Some((TokenKind::SEMI, ";")),
            '=' => Some((TokenKind::EQUAL, "=")),
            _ => None,
        };
        if let Some((kind, value)) = token {
            let start = self.cursor;
            self.advance_bytes(ch.len_utf8());
            self.push_simple(kind, value, start);
            return true;
        }
        false
    }

    fn lex_number(&mut self) {
        let start = self.cursor;
        self.consume_digits();

        if self.peek_char() == Some('.') && self.peek_second_char().is_some_and(is_digit) {
            self.advance_char(); // '.'
            self.consume_digits();
        }

        // 指数部は数字が続く場合のみ取り込む（`2e` は `2` と識別子 `e`）
        if let Some('e') | Some('E') = self.peek_char() {
            let mut idx = self.cursor + 1;
            if let Some('+') | Some('-') = self.char_at(idx) {
                idx += 1;
            }
            let mut scan = idx;
            while let Some(ch) = self.char_at(scan) {
                if is_digit(ch) {
                    scan += ch.len_utf8();
                } else {
                    break;
                }
            }
            if scan > idx {
                self.cursor = scan;
            }
        }

        let end = self.cursor;
        self.push_slice(TokenKind::NUMBER, start, end);
    }

    fn consume_digits(&mut self) {
        while let Some(ch) = self.peek_char() {
            if is_digit(ch) {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn lex_identifier(&mut self) {
        let start = self.cursor;
        self.advance_char();
        while let Some(ch) = self.peek_char() {
            if is_ident_rest(ch) {
                self.advance_char();
            } else {
                break;
            }
        }
        let end = self.cursor;
        self.push_slice(TokenKind::IDENT, start, end);
    }

    fn push_simple(&mut self, kind: TokenKind, value: &str, start: usize) {
        self.tokens.push(Token {
            kind,
            value: value.into(),
            pos: start,
        });
    }

    fn push_slice(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            value: self.src[start..end].into(),
            pos: start,
        });
    }

    fn peek_char(&self) -> Option<char> {
        self.char_at(self.cursor)
    }

    fn peek_second_char(&self) -> Option<char> {
        let mut iter = self.src.get(self.cursor..)?.chars();
        iter.next()?;
        iter.next()
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        if idx >= self.len {
            None
        } else {
            self.src.get(idx..)?.chars().next()
        }
    }

    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.advance_bytes(ch.len_utf8());
        Some(ch)
    }

    fn advance_bytes(&mut self, count: usize) {
        self.cursor = (self.cursor + count).min(self.len);
    }
}

pub fn lex(src: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(src).run()
}
