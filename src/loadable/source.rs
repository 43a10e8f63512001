// パス: src/loadable/source.rs
// 役割: 埋め込み JSON の loadable 定義をそのまま受け取る serde 用の中間表現
// 意図: データ形式の都合（数式で書かれた値・長さ単位の展開）をコンパイル側から切り離す
// 関連ファイル: src/loadable/mod.rs, data/loadables.json

use indexmap::IndexMap;
use serde::Deserialize;

/// カタログ全体。キーが loadable 名で、記述順がそのまま表示順になる。
pub(super) type CatalogSource = IndexMap<String, LoadableSource>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct LoadableSource {
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub variables: IndexMap<String, VariableSource>,
    /// 2 乗・3 乗の単位（`m2`, `m3` など）を自動生成する長さ単位。
    #[serde(default)]
    pub lengths: IndexMap<String, VariableSource>,
    #[serde(default)]
    pub functions: IndexMap<String, FunctionSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct VariableSource {
    pub value: ValueSource,
    pub description: String,
}

/// 値は数値リテラルか、組み込み定義だけで評価できる式（`"pi / 180"` など）。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum ValueSource {
    Number(f64),
    Expression(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct FunctionSource {
    pub args: Vec<String>,
    pub body: String,
    pub description: String,
}
