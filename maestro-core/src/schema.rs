//! Symphony schema nodes — the remote platform's exact wire format.
//!
//! Field names are bit-exact: the platform validates submissions against
//! an under-documented schema and rejects any deviation with an opaque
//! "not valid under any of the given schemas" message. Invariants held by
//! construction (and re-checked by the preflight validator):
//! - no node ever carries an `id` — the platform assigns identifiers
//! - every node serializes `weight` as null
//! - only children of a `wt-cash-specified` node carry an `allocation`
//! - `asset` nodes are leaves
//! - `if` nodes have exactly two `if-child` branches, one flagged else,
//!   and the else branch carries none of the comparison fields

use serde::{Deserialize, Serialize};

use crate::domain::RebalanceCadence;

/// A node of the symphony document, discriminated by the `step` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step")]
pub enum SchemaNode {
    /// Document root carrying strategy-level metadata.
    #[serde(rename = "root")]
    Root {
        name: String,
        description: String,
        rebalance: String,
        /// Corridor-based rebalancing is unused; the platform still wants
        /// the field present.
        #[serde(rename = "rebalance-corridor-width")]
        rebalance_corridor_width: Option<f64>,
        weight: Option<f64>,
        children: Vec<SchemaNode>,
    },

    /// Equal-weight allocation across its children.
    #[serde(rename = "wt-cash-equal")]
    WtCashEqual {
        weight: Option<f64>,
        children: Vec<SchemaNode>,
    },

    /// Specified-weight allocation; every child carries an `allocation`.
    #[serde(rename = "wt-cash-specified")]
    WtCashSpecified {
        weight: Option<f64>,
        children: Vec<SchemaNode>,
    },

    /// Conditional node: exactly two `if-child` branches.
    #[serde(rename = "if")]
    If {
        weight: Option<f64>,
        children: Vec<SchemaNode>,
    },

    /// One branch of a conditional. The comparison fields are present on
    /// the condition branch and all absent on the else branch.
    #[serde(rename = "if-child")]
    IfChild {
        #[serde(rename = "is-else-condition?")]
        is_else_condition: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        comparator: Option<String>,
        #[serde(rename = "lhs-val", skip_serializing_if = "Option::is_none")]
        lhs_val: Option<String>,
        #[serde(rename = "lhs-fn", skip_serializing_if = "Option::is_none")]
        lhs_fn: Option<String>,
        #[serde(rename = "lhs-fn-params", skip_serializing_if = "Option::is_none")]
        lhs_fn_params: Option<FnParams>,
        #[serde(rename = "rhs-val", skip_serializing_if = "Option::is_none")]
        rhs_val: Option<ValField>,
        #[serde(rename = "rhs-fn", skip_serializing_if = "Option::is_none")]
        rhs_fn: Option<String>,
        #[serde(rename = "rhs-fn-params", skip_serializing_if = "Option::is_none")]
        rhs_fn_params: Option<FnParams>,
        #[serde(rename = "rhs-fixed-value?", skip_serializing_if = "Option::is_none")]
        rhs_fixed_value: Option<bool>,
        weight: Option<f64>,
        children: Vec<SchemaNode>,
    },

    /// Leaf asset: ticker, venue code, display name.
    #[serde(rename = "asset")]
    Asset {
        ticker: String,
        exchange: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        allocation: Option<f64>,
        weight: Option<f64>,
    },
}

/// The comparison fields of a condition branch, bundled for construction.
///
/// `rhs_fn` always equals `lhs_fn`: the platform has no independent
/// right-hand function in practice, so a fixed-value comparison duplicates
/// the left function and a computed comparison must match it.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchCondition {
    pub comparator: String,
    pub lhs_val: String,
    pub lhs_fn: String,
    pub lhs_fn_params: FnParams,
    pub rhs_val: ValField,
    pub rhs_fn: String,
    pub rhs_fn_params: FnParams,
    pub rhs_fixed_value: bool,
}

/// Window parameter block for an indicator function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FnParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
}

/// `rhs-val` holds a ticker string for computed references and a plain
/// number for fixed literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValField {
    Ticker(String),
    Number(f64),
}

impl SchemaNode {
    /// Root node wrapping a single compiled fragment.
    pub fn root(
        name: &str,
        description: &str,
        rebalance: RebalanceCadence,
        fragment: SchemaNode,
    ) -> Self {
        SchemaNode::Root {
            name: name.to_string(),
            description: description.to_string(),
            rebalance: rebalance.as_str().to_string(),
            rebalance_corridor_width: None,
            weight: None,
            children: vec![fragment],
        }
    }

    /// Equal-weight node over the given children.
    pub fn wt_cash_equal(children: Vec<SchemaNode>) -> Self {
        SchemaNode::WtCashEqual {
            weight: None,
            children,
        }
    }

    /// Specified-weight node; children are expected to carry allocations.
    pub fn wt_cash_specified(children: Vec<SchemaNode>) -> Self {
        SchemaNode::WtCashSpecified {
            weight: None,
            children,
        }
    }

    /// Conditional node over its two branches.
    pub fn if_node(branches: Vec<SchemaNode>) -> Self {
        SchemaNode::If {
            weight: None,
            children: branches,
        }
    }

    /// The condition-carrying branch, wrapping the true subtree.
    pub fn if_branch(condition: BranchCondition, child: SchemaNode) -> Self {
        SchemaNode::IfChild {
            is_else_condition: false,
            comparator: Some(condition.comparator),
            lhs_val: Some(condition.lhs_val),
            lhs_fn: Some(condition.lhs_fn),
            lhs_fn_params: Some(condition.lhs_fn_params),
            rhs_val: Some(condition.rhs_val),
            rhs_fn: Some(condition.rhs_fn),
            rhs_fn_params: Some(condition.rhs_fn_params),
            rhs_fixed_value: Some(condition.rhs_fixed_value),
            weight: None,
            children: vec![child],
        }
    }

    /// The else/default branch, wrapping the false subtree. Carries no
    /// comparison fields at all.
    pub fn else_branch(child: SchemaNode) -> Self {
        SchemaNode::IfChild {
            is_else_condition: true,
            comparator: None,
            lhs_val: None,
            lhs_fn: None,
            lhs_fn_params: None,
            rhs_val: None,
            rhs_fn: None,
            rhs_fn_params: None,
            rhs_fixed_value: None,
            weight: None,
            children: vec![child],
        }
    }

    /// Asset leaf with resolved venue metadata.
    pub fn asset(ticker: &str, exchange: &str, name: &str, allocation: Option<f64>) -> Self {
        SchemaNode::Asset {
            ticker: ticker.to_string(),
            exchange: exchange.to_string(),
            name: name.to_string(),
            allocation,
            weight: None,
        }
    }

    /// The `step` discriminator of this node.
    pub fn step(&self) -> &'static str {
        match self {
            SchemaNode::Root { .. } => "root",
            SchemaNode::WtCashEqual { .. } => "wt-cash-equal",
            SchemaNode::WtCashSpecified { .. } => "wt-cash-specified",
            SchemaNode::If { .. } => "if",
            SchemaNode::IfChild { .. } => "if-child",
            SchemaNode::Asset { .. } => "asset",
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_condition() -> BranchCondition {
        BranchCondition {
            comparator: "gt".into(),
            lhs_val: "VIXY".into(),
            lhs_fn: "moving-average-price".into(),
            lhs_fn_params: FnParams { window: Some(1) },
            rhs_val: ValField::Number(22.0),
            rhs_fn: "moving-average-price".into(),
            rhs_fn_params: FnParams { window: Some(1) },
            rhs_fixed_value: true,
        }
    }

    #[test]
    fn asset_serializes_exact_field_names() {
        let node = SchemaNode::asset("SPY", "ARCX", "SPDR S&P 500 ETF Trust", None);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["step"], "asset");
        assert_eq!(json["ticker"], "SPY");
        assert_eq!(json["exchange"], "ARCX");
        assert_eq!(json["name"], "SPDR S&P 500 ETF Trust");
        assert!(json["weight"].is_null());
        // Leaves carry no children and no allocation unless specified.
        assert!(json.get("children").is_none());
        assert!(json.get("allocation").is_none());
    }

    #[test]
    fn asset_with_allocation_serializes_fraction() {
        let node = SchemaNode::asset(
            "AGG",
            "ARCX",
            "iShares Core U.S. Aggregate Bond ETF",
            Some(0.2),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["allocation"], 0.2);
    }

    #[test]
    fn root_serializes_metadata_and_null_corridor() {
        let node = SchemaNode::root(
            "Test",
            "desc",
            RebalanceCadence::Daily,
            SchemaNode::wt_cash_equal(vec![]),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["step"], "root");
        assert_eq!(json["name"], "Test");
        assert_eq!(json["rebalance"], "daily");
        assert!(json["rebalance-corridor-width"].is_null());
        assert!(json["weight"].is_null());
        assert_eq!(json["children"][0]["step"], "wt-cash-equal");
    }

    #[test]
    fn else_branch_has_no_condition_fields() {
        let node = SchemaNode::else_branch(SchemaNode::wt_cash_equal(vec![]));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["is-else-condition?"], true);
        assert!(json.get("comparator").is_none());
        assert!(json.get("lhs-fn").is_none());
        assert!(json.get("lhs-fn-params").is_none());
        assert!(json.get("rhs-val").is_none());
        assert!(json.get("rhs-fixed-value?").is_none());
    }

    #[test]
    fn condition_branch_serializes_wire_fields() {
        let node = SchemaNode::if_branch(sample_condition(), SchemaNode::wt_cash_equal(vec![]));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["is-else-condition?"], false);
        assert_eq!(json["comparator"], "gt");
        assert_eq!(json["lhs-val"], "VIXY");
        assert_eq!(json["lhs-fn"], "moving-average-price");
        assert_eq!(json["lhs-fn-params"]["window"], 1);
        assert_eq!(json["rhs-val"], 22.0);
        assert_eq!(json["rhs-fn"], "moving-average-price");
        assert_eq!(json["rhs-fn-params"]["window"], 1);
        assert_eq!(json["rhs-fixed-value?"], true);
    }

    #[test]
    fn ticker_rhs_serializes_as_string() {
        let v = serde_json::to_value(ValField::Ticker("AGG".into())).unwrap();
        assert_eq!(v, serde_json::Value::String("AGG".into()));
        let v = serde_json::to_value(ValField::Number(70.0)).unwrap();
        assert_eq!(v, serde_json::json!(70.0));
    }

    #[test]
    fn no_node_kind_emits_an_id() {
        let doc = SchemaNode::root(
            "t",
            "",
            RebalanceCadence::None,
            SchemaNode::if_node(vec![
                SchemaNode::if_branch(
                    sample_condition(),
                    SchemaNode::wt_cash_equal(vec![SchemaNode::asset("SPY", "ARCX", "SPY", None)]),
                ),
                SchemaNode::else_branch(SchemaNode::wt_cash_equal(vec![SchemaNode::asset(
                    "AGG", "ARCX", "AGG", None,
                )])),
            ]),
        );
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn round_trips_through_serde() {
        let doc = SchemaNode::root(
            "t",
            "d",
            RebalanceCadence::Weekly,
            SchemaNode::if_node(vec![
                SchemaNode::if_branch(
                    sample_condition(),
                    SchemaNode::wt_cash_specified(vec![
                        SchemaNode::asset("SPY", "ARCX", "SPY", Some(0.6)),
                        SchemaNode::asset("AGG", "ARCX", "AGG", Some(0.4)),
                    ]),
                ),
                SchemaNode::else_branch(SchemaNode::wt_cash_equal(vec![SchemaNode::asset(
                    "BIL", "ARCX", "BIL", None,
                )])),
            ]),
        );
        let json = serde_json::to_string(&doc).unwrap();
        let back: SchemaNode = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn step_strings_match_serde_tags() {
        let nodes = [
            SchemaNode::wt_cash_equal(vec![]),
            SchemaNode::wt_cash_specified(vec![]),
            SchemaNode::if_node(vec![]),
            SchemaNode::else_branch(SchemaNode::wt_cash_equal(vec![])),
            SchemaNode::asset("SPY", "ARCX", "SPY", None),
        ];
        for node in nodes {
            let json = serde_json::to_value(&node).unwrap();
            assert_eq!(json["step"], node.step());
        }
    }
}
