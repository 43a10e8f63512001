// パス: src/engine.rs
// 役割: セッションから見た評価エンジンの窓口（評価・loadable の適用/解除・角度モード）
// 意図: 文脈の更新経路をこの型に絞り、セッション側は狭いインタフェースだけを使う
// 関連ファイル: src/context.rs, src/evaluator.rs, src/repl/cmd.rs

use crate::context::{Context, Owner};
use crate::errors::EngineError;
use crate::evaluator::eval_program;
use crate::loadable::Loadable;
use crate::parser::parse_program;

/// 生きた評価文脈を 1 つ所有するエンジン。
#[derive(Clone, Debug, Default)]
pub struct Engine {
    context: Context,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
        }
    }

    /// 1 行を評価する。成功すると `ans` が結果で更新される。
    pub fn evaluate(&mut self, text: &str) -> Result<f64, EngineError> {
        let program = parse_program(text, &self.context)?;
        let value = eval_program(&program, &mut self.context)?;
        self.context.assign("ans", value);
        Ok(value)
    }

    /// loadable の変数・関数を後勝ちで重ねる。同じ loadable の再適用は置き換えになる。
    pub fn apply_loadable(&mut self, loadable: &Loadable) {
        let owner = Owner::Loadable(loadable.name().to_string());
        self.context.merge(&owner, loadable.symbols());
        tracing::debug!(loadable = loadable.name(), "applied loadable");
    }

    /// loadable が宣言した記号のうち、その loadable が所有する束縛だけを取り除く。
    pub fn remove_loadable(&mut self, loadable: &Loadable) {
        let owner = Owner::Loadable(loadable.name().to_string());
        self.context.unmerge(&owner, loadable.symbol_names());
        tracing::debug!(loadable = loadable.name(), "removed loadable");
    }

    /// true = ラジアン
    pub fn angle_mode(&self) -> bool {
        self.context.use_radians
    }

    pub fn set_angle_mode(&mut self, use_radians: bool) {
        self.context.use_radians = use_radians;
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}
