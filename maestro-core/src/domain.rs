//! Domain types — the upstream strategy record and its logic tree.
//!
//! A `Strategy` is produced by the external generation/selection pipeline
//! and is read-only from the compiler's point of view: compilation builds
//! fresh schema values and never mutates its input. Conditions inside the
//! logic tree arrive either already typed or as free text in the condition
//! micro-language; [`ConditionDef::resolve`] is the thin adapter between
//! the two.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::condition::{Condition, ConditionError};

/// Rebalancing cadence accepted by the execution platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceCadence {
    None,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RebalanceCadence {
    /// Wire string used by the remote schema's `rebalance` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RebalanceCadence::None => "none",
            RebalanceCadence::Daily => "daily",
            RebalanceCadence::Weekly => "weekly",
            RebalanceCadence::Monthly => "monthly",
            RebalanceCadence::Quarterly => "quarterly",
            RebalanceCadence::Yearly => "yearly",
        }
    }
}

/// A strategy candidate as handed over by the upstream pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Display name for the deployed symphony.
    pub name: String,

    /// Ticker universe (non-empty; document order follows this order).
    pub assets: Vec<String>,

    /// Static weights per ticker. Empty means equal-weight; otherwise the
    /// fractions must sum to 1.0 within tolerance.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,

    /// Rebalancing cadence.
    pub rebalance: RebalanceCadence,

    /// Free-text description carried onto the root node.
    #[serde(default)]
    pub description: String,

    /// Conditional allocation rule; `None` means a static strategy.
    #[serde(default)]
    pub logic: Option<LogicTreeNode>,
}

/// A node of the strategy's conditional logic tree.
///
/// Either a terminal allocation or a binary if/else decision. The tree is
/// finite by construction upstream, so compiler recursion terminates by
/// structural induction. Only binary branching is modeled — the platform
/// has never been observed to accept wider structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogicTreeNode {
    /// Terminal allocation over a set of assets.
    Allocation {
        assets: Vec<String>,
        #[serde(default)]
        weights: BTreeMap<String, f64>,
    },

    /// Binary decision: condition, true branch, false branch.
    Conditional {
        condition: ConditionDef,
        if_true: Box<LogicTreeNode>,
        if_false: Box<LogicTreeNode>,
    },
}

impl LogicTreeNode {
    /// Number of conditional nodes in this subtree.
    pub fn conditional_count(&self) -> usize {
        match self {
            LogicTreeNode::Allocation { .. } => 0,
            LogicTreeNode::Conditional {
                if_true, if_false, ..
            } => 1 + if_true.conditional_count() + if_false.conditional_count(),
        }
    }
}

/// A condition as it appears in an upstream record: either already typed
/// or free text in the condition micro-language (e.g. `"VIXY_price > 22"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionDef {
    Typed(Condition),
    Text(String),
}

impl ConditionDef {
    /// Resolve to a typed [`Condition`], parsing the text form at this
    /// boundary. Typed input is re-checked against the same rules, so a
    /// hand-built condition cannot smuggle a function mismatch through.
    pub fn resolve(&self) -> Result<Condition, ConditionError> {
        match self {
            ConditionDef::Typed(c) => {
                Condition::new(c.lhs.clone(), c.comparator, c.rhs.clone())
            }
            ConditionDef::Text(text) => Condition::parse(text),
        }
    }
}

/// Identifier assigned by the remote platform on successful deployment.
///
/// The only durable record of a deployment — the compiler itself never
/// emits identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymphonyId(pub String);

impl fmt::Display for SymphonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
