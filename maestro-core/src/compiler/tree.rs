//! Logic tree compiler — recursive conditional structure to schema nodes.

use super::allocation::build_allocation;
use super::CompileError;
use crate::condition::Condition;
use crate::domain::LogicTreeNode;
use crate::operand::{IndicatorFn, Operand};
use crate::schema::{BranchCondition, FnParams, SchemaNode, ValField};

/// Window used when a condition asks for an instantaneous price.
///
/// The platform's conditional nodes reject the current-price function even
/// though it is valid elsewhere in a symphony; a one-day moving average is
/// the accepted equivalent. The substitution is deliberate, named, and
/// tested so a future schema change shows up as a test failure rather than
/// a silent behavior shift.
pub const PRICE_PROXY_WINDOW: u32 = 1;

/// Compile a logic tree node into a schema fragment.
///
/// Allocation nodes delegate to the allocation builder; conditional nodes
/// compile their condition and both branches, producing an `if` node with
/// one condition-carrying branch and one else branch. No artificial depth
/// limit — every branch is a strictly smaller subtree, so recursion
/// terminates on any finite input.
pub fn compile_node(
    node: &LogicTreeNode,
    warnings: &mut Vec<String>,
) -> Result<SchemaNode, CompileError> {
    match node {
        LogicTreeNode::Allocation { assets, weights } => {
            build_allocation(assets, weights, warnings)
        }
        LogicTreeNode::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            let condition = condition.resolve()?;
            let then_child = compile_node(if_true, warnings)?;
            let else_child = compile_node(if_false, warnings)?;
            Ok(SchemaNode::if_node(vec![
                SchemaNode::if_branch(branch_condition(&condition), then_child),
                SchemaNode::else_branch(else_child),
            ]))
        }
    }
}

/// Project a typed condition onto the platform's branch fields.
///
/// Applies the current-price proxy to both sides, and duplicates the
/// left-hand function (and its params) onto the right when the right side
/// is a fixed literal — the remote schema wants `rhs-fn` present
/// regardless.
fn branch_condition(condition: &Condition) -> BranchCondition {
    let (lhs_fn, lhs_window) = condition_fn(condition.lhs.function, condition.lhs.window);

    let (rhs_val, rhs_fn, rhs_window, rhs_fixed) = match &condition.rhs {
        Operand::Literal(value) => (ValField::Number(*value), lhs_fn, lhs_window, true),
        Operand::Ref(r) => {
            let (function, window) = condition_fn(r.function, r.window);
            (ValField::Ticker(r.ticker.clone()), function, window, false)
        }
    };

    BranchCondition {
        comparator: condition.comparator.as_str().to_string(),
        lhs_val: condition.lhs.ticker.clone(),
        lhs_fn: lhs_fn.as_str().to_string(),
        lhs_fn_params: FnParams { window: lhs_window },
        rhs_val,
        rhs_fn: rhs_fn.as_str().to_string(),
        rhs_fn_params: FnParams { window: rhs_window },
        rhs_fixed_value: rhs_fixed,
    }
}

/// The function actually emitted inside a condition: current price becomes
/// its one-day moving-average proxy, everything else passes through.
fn condition_fn(function: IndicatorFn, window: Option<u32>) -> (IndicatorFn, Option<u32>) {
    match function {
        IndicatorFn::CurrentPrice => {
            (IndicatorFn::MovingAveragePrice, Some(PRICE_PROXY_WINDOW))
        }
        other => (other, window),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
