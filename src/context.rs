// パス: src/context.rs
// 役割: 評価時に参照される記号表（所有者付きの重ね合わせ）と角度モードを保持する
// 意図: loadable の適用・解除を他の所有者の値を壊さずに行えるようにする
// 関連ファイル: src/engine.rs, src/evaluator.rs, src/loadable/mod.rs
//! 評価文脈モジュール
//!
//! 記号ごとに「束縛のスタック」を持ち、末尾の束縛が現在見えている値になる。
//!
//! - 同じ所有者による再定義は、その所有者の古い束縛を取り除いてから末尾に積む（後勝ち・冪等）。
//! - 所有者単位の解除は、その所有者の束縛だけを取り除く。
//!   後から別の所有者が上書きしていても、その値は消えず、解除された値も復活しない。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::Function;
use crate::builtins::{BuiltinFn, BuiltinKind, BUILTINS};
use crate::parser::{Scope, SymbolKind};

/// 束縛の所有者。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Builtin,
    User,
    Loadable(String),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Builtin => write!(f, "builtin"),
            Owner::User => write!(f, "user"),
            Owner::Loadable(name) => write!(f, "loadable {}", name),
        }
    }
}

/// 記号に束縛される値。
#[derive(Clone, Debug)]
pub enum Symbol {
    Value(f64),
    Builtin(BuiltinFn),
    Derived(Arc<Function>),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Value(_) => SymbolKind::Value,
            Symbol::Builtin(_) => SymbolKind::Function { arity: 1 },
            Symbol::Derived(f) => SymbolKind::Function { arity: f.arity() },
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // NaN 同士も同一の値として扱う
            (Symbol::Value(a), Symbol::Value(b)) => a.to_bits() == b.to_bits(),
            (Symbol::Builtin(a), Symbol::Builtin(b)) => a == b,
            (Symbol::Derived(a), Symbol::Derived(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub symbol: Symbol,
    pub owner: Owner,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    /// true = ラジアン
    pub use_radians: bool,
    symbols: HashMap<String, Vec<Binding>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// 組み込み定義と `ans = 0` を持つ文脈を作る。
    pub fn new() -> Self {
        let mut ctx = Self {
            use_radians: true,
            symbols: HashMap::new(),
        };
        for def in BUILTINS {
            let symbol = match def.kind {
                BuiltinKind::Constant(v) => Symbol::Value(v),
                BuiltinKind::Function(f) => Symbol::Builtin(f),
            };
            ctx.define(def.name, symbol, Owner::Builtin);
        }
        ctx.define("ans", Symbol::Value(0.0), Owner::User);
        ctx
    }

    /// 現在見えている束縛を返す。
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.visible(name).map(|b| &b.symbol)
    }

    pub fn owner_of(&self, name: &str) -> Option<&Owner> {
        self.visible(name).map(|b| &b.owner)
    }

    fn visible(&self, name: &str) -> Option<&Binding> {
        self.symbols.get(name).and_then(|stack| stack.last())
    }

    /// `owner` の束縛として `name` を定義する。同じ所有者の既存束縛は置き換わる。
    pub fn define(&mut self, name: &str, symbol: Symbol, owner: Owner) {
        let stack = self.symbols.entry(name.to_string()).or_default();
        stack.retain(|b| b.owner != owner);
        stack.push(Binding { symbol, owner });
    }

    /// `owner` が持つ `name` の束縛を取り除く。持っていなければ何もしない。
    pub fn undefine(&mut self, name: &str, owner: &Owner) {
        if let Some(stack) = self.symbols.get_mut(name) {
            stack.retain(|b| &b.owner != owner);
            if stack.is_empty() {
                self.symbols.remove(name);
            }
        }
    }

    /// 記号の断片をまとめて `owner` の束縛として重ねる。
    pub fn merge<I>(&mut self, owner: &Owner, fragment: I)
    where
        I: IntoIterator<Item = (String, Symbol)>,
    {
        for (name, symbol) in fragment {
            self.define(&name, symbol, owner.clone());
        }
    }

    /// `merge` した断片を名前で取り除く。
    pub fn unmerge<'n, I>(&mut self, owner: &Owner, names: I)
    where
        I: IntoIterator<Item = &'n str>,
    {
        for name in names {
            self.undefine(name, owner);
        }
    }

    /// 利用者の代入（`x = 5`）。
    pub fn assign(&mut self, name: &str, value: f64) {
        self.define(name, Symbol::Value(value), Owner::User);
    }
}

impl Scope for Context {
    fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.get(name).map(Symbol::kind)
    }
}
