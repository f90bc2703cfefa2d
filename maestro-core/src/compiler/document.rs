//! Document assembly — wrap a compiled fragment under the root node.

use serde_json::Value;

use super::allocation::build_allocation;
use super::tree::compile_node;
use super::CompileError;
use crate::domain::Strategy;
use crate::fingerprint::document_fingerprint;
use crate::schema::SchemaNode;

/// A fully assembled symphony document, ready for preflight validation.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    /// Typed node tree, root at the top.
    pub root: SchemaNode,
    /// Serialized form — what the validator walks and the client submits.
    pub document: Value,
    /// Non-fatal notes collected during compilation (unknown venues, ...).
    pub warnings: Vec<String>,
    /// BLAKE3 fingerprint of `document`. Identical strategies compile to
    /// identical fingerprints.
    pub fingerprint: String,
}

/// Compile a strategy into a symphony document.
///
/// Static strategies (no logic tree) compile to a single weighting node
/// under the root; dynamic strategies compile their conditional tree. The
/// input is read-only — every call builds fresh values, so independent
/// strategies can compile concurrently with no shared state.
pub fn compile_strategy(strategy: &Strategy) -> Result<CompiledDocument, CompileError> {
    let mut warnings = Vec::new();

    let fragment = match &strategy.logic {
        Some(tree) => compile_node(tree, &mut warnings)?,
        None => build_allocation(&strategy.assets, &strategy.weights, &mut warnings)?,
    };

    let root = SchemaNode::root(
        &strategy.name,
        &strategy.description,
        strategy.rebalance,
        fragment,
    );

    let document = serde_json::to_value(&root).expect("symphony document serialization failed");
    let fingerprint = document_fingerprint(&document);

    Ok(CompiledDocument {
        root,
        document,
        warnings,
        fingerprint,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionDef, LogicTreeNode, RebalanceCadence};
    use std::collections::BTreeMap;

    fn static_strategy() -> Strategy {
        Strategy {
            name: "Balanced Three".into(),
            assets: vec!["SPY".into(), "QQQ".into(), "AGG".into()],
            weights: BTreeMap::from([
                ("SPY".into(), 0.5),
                ("QQQ".into(), 0.3),
                ("AGG".into(), 0.2),
            ]),
            rebalance: RebalanceCadence::Quarterly,
            description: "Static three-fund mix".into(),
            logic: None,
        }
    }

    fn dynamic_strategy() -> Strategy {
        Strategy {
            name: "Vol Gate".into(),
            assets: vec!["TQQQ".into(), "BIL".into()],
            weights: BTreeMap::new(),
            rebalance: RebalanceCadence::Daily,
            description: String::new(),
            logic: Some(LogicTreeNode::Conditional {
                condition: ConditionDef::Text("VIXY_price > 22".into()),
                if_true: Box::new(LogicTreeNode::Allocation {
                    assets: vec!["BIL".into()],
                    weights: BTreeMap::new(),
                }),
                if_false: Box::new(LogicTreeNode::Allocation {
                    assets: vec!["TQQQ".into()],
                    weights: BTreeMap::new(),
                }),
            }),
        }
    }

    #[test]
    fn static_strategy_compiles_to_specified_weights_under_root() {
        let compiled = compile_strategy(&static_strategy()).unwrap();
        let doc = &compiled.document;

        assert_eq!(doc["step"], "root");
        assert_eq!(doc["name"], "Balanced Three");
        assert_eq!(doc["rebalance"], "quarterly");
        assert_eq!(doc["children"][0]["step"], "wt-cash-specified");
        let allocations: Vec<f64> = doc["children"][0]["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["allocation"].as_f64().unwrap())
            .collect();
        assert_eq!(allocations.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn dynamic_strategy_compiles_conditional_fragment() {
        let compiled = compile_strategy(&dynamic_strategy()).unwrap();
        assert_eq!(compiled.document["children"][0]["step"], "if");
    }

    #[test]
    fn compilation_does_not_mutate_the_strategy() {
        let strategy = dynamic_strategy();
        let before = strategy.clone();
        let _ = compile_strategy(&strategy).unwrap();
        assert_eq!(strategy, before);
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        let strategy = dynamic_strategy();
        let a = compile_strategy(&strategy).unwrap();
        let b = compile_strategy(&strategy).unwrap();
        assert_eq!(a.document, b.document);
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn different_strategies_have_different_fingerprints() {
        let a = compile_strategy(&static_strategy()).unwrap();
        let b = compile_strategy(&dynamic_strategy()).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn root_weight_and_corridor_are_null() {
        let compiled = compile_strategy(&static_strategy()).unwrap();
        assert!(compiled.document["weight"].is_null());
        assert!(compiled.document["rebalance-corridor-width"].is_null());
    }

    #[test]
    fn warnings_surface_unknown_venues() {
        let mut strategy = static_strategy();
        strategy.assets.push("ZZZTOP".into());
        strategy.weights = BTreeMap::new();
        let compiled = compile_strategy(&strategy).unwrap();
        assert_eq!(compiled.warnings.len(), 1);
        assert!(compiled.warnings[0].contains("ZZZTOP"));
    }

    #[test]
    fn compile_error_surfaces_from_logic_tree() {
        let mut strategy = dynamic_strategy();
        strategy.logic = Some(LogicTreeNode::Conditional {
            condition: ConditionDef::Text("VIXY_banana > 5".into()),
            if_true: Box::new(LogicTreeNode::Allocation {
                assets: vec!["BIL".into()],
                weights: BTreeMap::new(),
            }),
            if_false: Box::new(LogicTreeNode::Allocation {
                assets: vec!["TQQQ".into()],
                weights: BTreeMap::new(),
            }),
        });
        assert!(matches!(
            compile_strategy(&strategy),
            Err(CompileError::Condition(_))
        ));
    }
}
