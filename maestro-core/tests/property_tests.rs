//! Property tests for the compiler pipeline.
//!
//! Uses proptest to verify:
//! 1. Resolver totality — every accepted operand form resolves to the
//!    documented function/window pair; arbitrary junk is rejected
//! 2. Function equality — compiled documents never carry an rhs-fn that
//!    differs from lhs-fn, for any generated condition
//! 3. Compile → preflight — any generated strategy either fails to compile
//!    or produces a document that passes preflight (never both-succeed-
//!    then-reject, never a panic)
//! 4. Idempotence — recompiling yields identical fingerprints

use proptest::prelude::*;
use std::collections::BTreeMap;

use maestro_core::compiler::compile_strategy;
use maestro_core::domain::{ConditionDef, LogicTreeNode, RebalanceCadence, Strategy as StrategyDef};
use maestro_core::operand::{self, IndicatorFn, Operand};
use maestro_core::validate::preflight;

// ── Strategies (proptest) ────────────────────────────────────────────

const TICKERS: &[&str] = &["SPY", "QQQ", "AGG", "VIXY", "TQQQ", "BIL", "GLD", "ZZZQ"];

fn arb_ticker() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TICKERS.to_vec())
}

fn arb_window() -> impl Strategy<Value = u32> {
    1..365u32
}

/// An operand in one of the accepted windowed text forms, with the
/// function it must resolve to.
fn arb_windowed_operand() -> impl Strategy<Value = (String, IndicatorFn, u32)> {
    (arb_ticker(), arb_window(), 0..4usize).prop_map(|(ticker, window, form)| match form {
        0 => (
            format!("{ticker}_{window}d_MA"),
            IndicatorFn::MovingAveragePrice,
            window,
        ),
        1 => (
            format!("{ticker}_cumulative_return_{window}d"),
            IndicatorFn::CumulativeReturn,
            window,
        ),
        2 => (
            format!("{ticker}_RSI_{window}d"),
            IndicatorFn::RelativeStrengthIndex,
            window,
        ),
        _ => (
            format!("{ticker}_EMA_{window}d"),
            IndicatorFn::ExponentialMovingAveragePrice,
            window,
        ),
    })
}

const COMPARATOR_TOKENS: &[&str] = &[">", "<", ">=", "<=", "=="];

fn arb_comparator_token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(COMPARATOR_TOKENS.to_vec())
}

/// A valid condition string: windowed reference vs literal, or two
/// references sharing a function.
fn arb_condition_text() -> impl Strategy<Value = String> {
    let vs_literal = (arb_windowed_operand(), arb_comparator_token(), 0.0..100.0f64)
        .prop_map(|((lhs, _, _), cmp, value)| format!("{lhs} {cmp} {value:.2}"));
    let price_vs_literal = (arb_ticker(), arb_comparator_token(), 0.0..100.0f64)
        .prop_map(|(ticker, cmp, value)| format!("{ticker}_price {cmp} {value:.2}"));
    let ma_vs_ma = (arb_ticker(), arb_window(), arb_ticker(), arb_window(), arb_comparator_token())
        .prop_map(|(a, wa, b, wb, cmp)| format!("{a}_{wa}d_MA {cmp} {b}_{wb}d_MA"));
    prop_oneof![vs_literal, price_vs_literal, ma_vs_ma]
}

/// A logic tree of bounded depth with valid conditions.
fn arb_logic_tree() -> impl Strategy<Value = LogicTreeNode> {
    let leaf = prop::collection::vec(arb_ticker(), 1..4).prop_map(|assets| {
        LogicTreeNode::Allocation {
            assets: assets.iter().map(|s| s.to_string()).collect(),
            weights: BTreeMap::new(),
        }
    });
    leaf.prop_recursive(3, 8, 2, |inner| {
        (arb_condition_text(), inner.clone(), inner).prop_map(
            |(condition, if_true, if_false)| LogicTreeNode::Conditional {
                condition: ConditionDef::Text(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
        )
    })
}

fn arb_strategy() -> impl Strategy<Value = StrategyDef> {
    (
        prop::collection::vec(arb_ticker(), 1..4),
        prop::option::of(arb_logic_tree()),
    )
        .prop_map(|(assets, logic)| StrategyDef {
            name: "Generated".into(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
            weights: BTreeMap::new(),
            rebalance: RebalanceCadence::Daily,
            description: String::new(),
            logic,
        })
}

// ── 1. Resolver totality ─────────────────────────────────────────────

proptest! {
    /// Every accepted windowed form resolves to its documented function
    /// and window.
    #[test]
    fn windowed_forms_resolve((text, function, window) in arb_windowed_operand()) {
        match operand::resolve(&text) {
            Ok(Operand::Ref(r)) => {
                prop_assert_eq!(r.function, function);
                prop_assert_eq!(r.window, Some(window));
            }
            other => prop_assert!(false, "expected reference for '{}', got {:?}", text, other),
        }
    }

    /// Bare tickers and `_price` forms resolve to the current-price function.
    #[test]
    fn price_forms_resolve(ticker in arb_ticker(), suffixed in prop::bool::ANY) {
        let text = if suffixed { format!("{ticker}_price") } else { ticker.to_string() };
        match operand::resolve(&text) {
            Ok(Operand::Ref(r)) => {
                prop_assert_eq!(r.function, IndicatorFn::CurrentPrice);
                prop_assert_eq!(r.window, None);
            }
            other => prop_assert!(false, "expected reference for '{}', got {:?}", text, other),
        }
    }

    /// Non-negative numbers resolve to literals; junk is rejected, never
    /// silently defaulted.
    #[test]
    fn junk_is_rejected(junk in "[a-z]{1,8}(_[a-z]{1,8}){0,2}") {
        prop_assert!(operand::resolve(&junk).is_err());
    }
}

// ── 2 & 3. Compile-level properties ──────────────────────────────────

/// Collect every (lhs-fn, rhs-fn) pair in a document.
fn function_pairs(value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    if value["step"] == "if-child" && value["is-else-condition?"] == false {
        out.push((
            value["lhs-fn"].as_str().unwrap_or_default().to_string(),
            value["rhs-fn"].as_str().unwrap_or_default().to_string(),
        ));
    }
    if let Some(children) = value["children"].as_array() {
        for child in children {
            function_pairs(child, out);
        }
    }
}

proptest! {
    /// The compiled document never carries an independently chosen
    /// right-hand function.
    #[test]
    fn rhs_fn_always_equals_lhs_fn(strategy in arb_strategy()) {
        if let Ok(compiled) = compile_strategy(&strategy) {
            let mut pairs = Vec::new();
            function_pairs(&compiled.document, &mut pairs);
            for (lhs, rhs) in pairs {
                prop_assert_eq!(&lhs, &rhs);
            }
        }
    }

    /// Anything that compiles passes preflight, and the conditional count
    /// in the report matches the input tree.
    #[test]
    fn compiled_documents_pass_preflight(strategy in arb_strategy()) {
        if let Ok(compiled) = compile_strategy(&strategy) {
            let report = preflight(&compiled.document);
            prop_assert!(report.is_ok(), "preflight failed: {:?}", report);
            let expected = strategy.logic.as_ref().map_or(0, |t| t.conditional_count());
            prop_assert_eq!(report.unwrap().conditionals, expected);
        }
    }

    /// Recompiling the same strategy produces the same fingerprint.
    #[test]
    fn recompilation_is_idempotent(strategy in arb_strategy()) {
        if let Ok(first) = compile_strategy(&strategy) {
            let second = compile_strategy(&strategy).unwrap();
            prop_assert_eq!(first.fingerprint, second.fingerprint);
            prop_assert_eq!(first.document, second.document);
        }
    }
}
