// パス: src/loadable/mod.rs
// 役割: 名前付きの定数・派生関数の束（loadable）と、その一覧（カタログ）を構築する
// 意図: 起動時に一度だけコンパイルし、以後は適用・解除を何度繰り返しても再コンパイルしない
// 関連ファイル: src/loadable/source.rs, src/engine.rs, data/loadables.json
//! loadable カタログ
//!
//! 構築手順（loadable ごと）:
//! 1. 変数表を解決する。同じ表の中でキーが重複した場合は最後の値が残る（位置は最初の出現）。
//! 2. 関数本体を、組み込み定義とその loadable 自身の宣言だけが見える使い捨てのスコープで
//!    コンパイルする。他の loadable や利用者の変数は見えない。
//!
//! どちらかが失敗した場合はカタログ全体の構築が失敗する（起動時の致命的エラー）。

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::Function;
use crate::context::{Context, Symbol};
use crate::errors::{CatalogError, EngineError};
use crate::evaluator::eval_expr;
use crate::parser::{compile_function, parse_expr, Scope, SymbolKind};

mod source;

use source::{CatalogSource, LoadableSource, ValueSource};

/// 組み込み loadable の定義（JSON）。
pub const BUILTIN_DATA: &str = include_str!("../../data/loadables.json");

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub value: f64,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct LoadableFunction {
    pub description: String,
    pub function: Arc<Function>,
}

impl LoadableFunction {
    pub fn params(&self) -> &[String] {
        &self.function.params
    }
}

/// コンパイル済みの loadable。構築後は不変。
#[derive(Clone, Debug)]
pub struct Loadable {
    name: String,
    description: String,
    long_description: String,
    variables: IndexMap<String, Variable>,
    functions: IndexMap<String, LoadableFunction>,
}

impl Loadable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn functions(&self) -> &IndexMap<String, LoadableFunction> {
        &self.functions
    }

    /// 文脈へ重ねる記号の断片（変数 → 関数の順）。
    pub fn symbols(&self) -> impl Iterator<Item = (String, Symbol)> + '_ {
        let vars = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), Symbol::Value(v.value)));
        let funcs = self
            .functions
            .iter()
            .map(|(k, f)| (k.clone(), Symbol::Derived(Arc::clone(&f.function))));
        vars.chain(funcs)
    }

    /// この loadable が宣言するすべての記号名。
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables
            .keys()
            .chain(self.functions.keys())
            .map(String::as_str)
    }
}

/// 起動時に一度だけ構築される loadable の順序付き一覧。
#[derive(Clone, Debug)]
pub struct Catalog {
    loadables: IndexMap<String, Loadable>,
}

impl Catalog {
    /// バイナリに埋め込まれた定義からカタログを構築する。
    pub fn build() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_DATA)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let source: CatalogSource = serde_json::from_str(text)?;
        let mut loadables = IndexMap::with_capacity(source.len());
        for (name, src) in source {
            let loadable = compile_loadable(&name, src)?;
            tracing::debug!(
                loadable = %name,
                variables = loadable.variables.len(),
                functions = loadable.functions.len(),
                "compiled loadable"
            );
            loadables.insert(name, loadable);
        }
        Ok(Self { loadables })
    }

    pub fn get(&self, name: &str) -> Option<&Loadable> {
        self.loadables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loadable> {
        self.loadables.values()
    }

    pub fn len(&self) -> usize {
        self.loadables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loadables.is_empty()
    }
}

/// 組み込み定義の上に、loadable 自身の宣言を重ねた構築専用スコープ。
struct DeclarationScope<'a> {
    base: &'a Context,
    own: HashMap<&'a str, SymbolKind>,
}

impl Scope for DeclarationScope<'_> {
    fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.own
            .get(name)
            .copied()
            .or_else(|| self.base.lookup(name))
    }
}

fn resolve_value(base: &Context, value: &ValueSource) -> Result<f64, EngineError> {
    match value {
        ValueSource::Number(v) => Ok(*v),
        ValueSource::Expression(text) => {
            let expr = parse_expr(text, base)?;
            eval_expr(&expr, base)
        }
    }
}

fn compile_loadable(name: &str, src: LoadableSource) -> Result<Loadable, CatalogError> {
    // 使い捨ての文脈: 組み込み定義のみ
    let base = Context::new();
    let variable_error = |variable: &str, source: EngineError| CatalogError::Variable {
        loadable: name.to_string(),
        variable: variable.to_string(),
        source,
    };

    let mut variables = IndexMap::new();
    for (key, var) in &src.variables {
        let value = resolve_value(&base, &var.value).map_err(|e| variable_error(key, e))?;
        variables.insert(
            key.clone(),
            Variable {
                value,
                description: var.description.clone(),
            },
        );
    }
    for (key, var) in &src.lengths {
        let value = resolve_value(&base, &var.value).map_err(|e| variable_error(key, e))?;
        let powers = [
            (key.clone(), value, var.description.clone()),
            (
                format!("{}2", key),
                value.powi(2),
                format!("{} squared", var.description),
            ),
            (
                format!("{}3", key),
                value.powi(3),
                format!("{} cubed", var.description),
            ),
        ];
        for (k, value, description) in powers {
            variables.insert(k, Variable { value, description });
        }
    }

    let mut own: HashMap<&str, SymbolKind> = variables
        .keys()
        .map(|k| (k.as_str(), SymbolKind::Value))
        .collect();
    for (key, f) in &src.functions {
        own.insert(
            key.as_str(),
            SymbolKind::Function {
                arity: f.args.len(),
            },
        );
    }
    let scope = DeclarationScope { base: &base, own };

    let mut functions = IndexMap::new();
    for (key, f) in &src.functions {
        let function = compile_function(key, &f.args, &f.body, &scope).map_err(|source| {
            CatalogError::Compile {
                loadable: name.to_string(),
                function: key.clone(),
                source,
            }
        })?;
        tracing::trace!(loadable = name, function = %function, "compiled function");
        functions.insert(
            key.clone(),
            LoadableFunction {
                description: f.description.clone(),
                function: Arc::new(function),
            },
        );
    }

    Ok(Loadable {
        name: name.to_string(),
        description: src.description,
        long_description: src.long_description,
        variables,
        functions,
    })
}
