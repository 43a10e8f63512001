// パス: tests/engine_overlay.rs
// 役割: loadable の適用・解除が評価文脈をどう変えるかの性質テスト
// 意図: 任意の順序で重ねて外しても、他の束縛を壊さずに元の文脈へ戻ることを保証する
// 関連ファイル: src/engine.rs, src/context.rs, src/loadable/mod.rs
#[path = "test_support.rs"]
mod support;

use proptest::prelude::*;

use nosper::context::Owner;
use nosper::engine::Engine;
use nosper::loadable::Catalog;
use support::{eval_err, eval_ok, CATALOG};

const SHARED_JSON: &str = r#"{
    "first": {
        "description": "first set",
        "variables": { "k": { "value": 2, "description": "" } },
        "functions": {
            "twice": { "args": ["x"], "body": "k x", "description": "" }
        }
    },
    "second": {
        "description": "second set",
        "variables": { "k": { "value": 5, "description": "" } }
    }
}"#;

fn loadable_names() -> Vec<String> {
    CATALOG.iter().map(|l| l.name().to_string()).collect()
}

/// カタログ内の loadable 名の部分列（重複なし）。
fn distinct_names() -> impl Strategy<Value = Vec<String>> {
    Just(loadable_names())
        .prop_shuffle()
        .prop_flat_map(|names| {
            let len = names.len();
            (Just(names), 0..=len)
        })
        .prop_map(|(names, n)| names.into_iter().take(n).collect())
}

proptest! {
    #[test]
    fn applying_then_removing_all_restores_context(names in distinct_names(), order in any::<u64>()) {
        let mut engine = Engine::new();
        let fresh = engine.context().clone();
        for name in &names {
            engine.apply_loadable(CATALOG.get(name).unwrap());
        }
        let mut removal = names.clone();
        let shift = (order as usize) % removal.len().max(1);
        removal.rotate_left(shift);
        for name in &removal {
            engine.remove_loadable(CATALOG.get(name).unwrap());
        }
        prop_assert_eq!(engine.context(), &fresh);
    }

    #[test]
    fn removing_one_loadable_keeps_the_others(names in distinct_names(), extra in 0usize..5) {
        let all = loadable_names();
        let target = &all[extra % all.len()];
        prop_assume!(!names.contains(target));

        let mut engine = Engine::new();
        for name in &names {
            engine.apply_loadable(CATALOG.get(name).unwrap());
        }
        let before = engine.context().clone();
        engine.apply_loadable(CATALOG.get(target).unwrap());
        engine.remove_loadable(CATALOG.get(target).unwrap());
        prop_assert_eq!(engine.context(), &before);
    }

    #[test]
    /// 既存の loadable に適用していない loadable の解除は何も変えない。
    fn removing_unapplied_loadable_is_a_no_op(names in distinct_names()) {
        let mut engine = Engine::new();
        for name in &names {
            engine.apply_loadable(CATALOG.get(name).unwrap());
        }
        let before = engine.context().clone();
        for l in CATALOG.iter().filter(|l| !names.iter().any(|n| n == l.name())) {
            engine.remove_loadable(l);
        }
        prop_assert_eq!(engine.context(), &before);
    }

    #[test]
    fn integer_arithmetic_matches_rust(a in -1000i64..1000, b in -1000i64..1000) {
        let mut engine = Engine::new();
        prop_assert_eq!(eval_ok(&mut engine, &format!("{} + {}", a, b)), (a + b) as f64);
        prop_assert_eq!(eval_ok(&mut engine, &format!("({})({})", a, b)), (a * b) as f64);
        prop_assert_eq!(eval_ok(&mut engine, &format!("{} - ans", a)), (a - a * b) as f64);
    }
}

#[test]
/// 同じ loadable を 2 回適用しても 1 回の解除で消える。
fn applying_twice_then_removing_once_clears() {
    let mut engine = Engine::new();
    let unit = CATALOG.get("unit").unwrap();
    engine.apply_loadable(unit);
    engine.apply_loadable(unit);
    engine.remove_loadable(unit);
    assert!(engine.context().get("in").is_none());
    assert!(engine.context().get("convert").is_none());
}

#[test]
/// 後から適用した loadable が同名の記号を隠し、解除すると前の値が見える。
fn later_loadable_wins_and_unwinds() {
    let catalog = Catalog::from_json(SHARED_JSON).unwrap();
    let (first, second) = (catalog.get("first").unwrap(), catalog.get("second").unwrap());
    let mut engine = Engine::new();
    engine.apply_loadable(first);
    engine.apply_loadable(second);
    assert_eq!(eval_ok(&mut engine, "k"), 5.0);
    assert_eq!(
        engine.context().owner_of("k"),
        Some(&Owner::Loadable("second".into()))
    );
    // 関数本体の参照は評価時に解決される
    assert_eq!(eval_ok(&mut engine, "twice 3"), 15.0);

    engine.remove_loadable(second);
    assert_eq!(eval_ok(&mut engine, "k"), 2.0);
    assert_eq!(eval_ok(&mut engine, "twice 3"), 6.0);

    // 先に適用したほうを外しても、後の loadable の束縛は残る
    engine.apply_loadable(second);
    engine.remove_loadable(first);
    assert_eq!(eval_ok(&mut engine, "k"), 5.0);
    assert!(eval_err(&mut engine, "twice 3").contains("unknown symbol `twice`"));
}

#[test]
/// 利用者の代入は loadable の解除で消えない。
fn user_assignment_survives_unload() {
    let catalog = Catalog::from_json(SHARED_JSON).unwrap();
    let first = catalog.get("first").unwrap();
    let mut engine = Engine::new();
    engine.apply_loadable(first);
    eval_ok(&mut engine, "k = 10");
    assert_eq!(eval_ok(&mut engine, "twice 3"), 30.0);
    engine.remove_loadable(first);
    assert_eq!(eval_ok(&mut engine, "k"), 10.0);
    assert_eq!(engine.context().owner_of("k"), Some(&Owner::User));
}
