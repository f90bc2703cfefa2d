//! Preflight validation — every known remote-schema constraint, checked locally.
//!
//! The platform's only signal on malformed input is an opaque "not valid
//! under any of the given schemas" message with no field detail, so this
//! walk is the system's primary debugging aid. Every schema-rejection
//! incident observed against the platform becomes a rule here, not a
//! one-off patch. The walk is pure and deterministic, operates on the
//! serialized document (the exact bytes the platform will see), and runs
//! unconditionally before every submission attempt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A structural invariant violation, qualified by a field path.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("schema invariant violated at {path}: {message}")]
pub struct ValidateError {
    /// Dotted path from the document root, e.g. `root.children[0].children[1]`.
    pub path: String,
    pub message: String,
}

/// Summary of a successful preflight pass — carried alongside platform
/// rejections so "our validator missed something" is distinguishable from
/// a platform-side transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightReport {
    /// Total nodes walked.
    pub nodes: usize,
    /// Conditional (`if`) nodes seen.
    pub conditionals: usize,
}

/// Accepted `comparator` wire values.
const COMPARATORS: &[&str] = &["gt", "lt", "gte", "lte", "eq"];

/// Functions accepted inside conditional nodes. `current-price` is absent
/// on purpose: the platform rejects it in conditions even though it is
/// valid elsewhere, so its appearance here means the compiler's proxy
/// substitution was bypassed.
const CONDITION_FNS: &[&str] = &[
    "moving-average-price",
    "cumulative-return",
    "relative-strength-index",
    "exponential-moving-average-price",
];

/// Accepted `rebalance` wire values.
const CADENCES: &[&str] = &["none", "daily", "weekly", "monthly", "quarterly", "yearly"];

/// Condition field names carried by a non-else branch (and forbidden on
/// the else branch).
const CONDITION_FIELDS: &[&str] = &[
    "comparator",
    "lhs-val",
    "lhs-fn",
    "lhs-fn-params",
    "rhs-val",
    "rhs-fn",
    "rhs-fn-params",
    "rhs-fixed-value?",
];

/// Tolerance for per-sibling-group allocation sums.
const ALLOCATION_TOLERANCE: f64 = 1e-6;

/// Validate an assembled document against every known remote constraint.
pub fn preflight(document: &Value) -> Result<PreflightReport, ValidateError> {
    let mut walker = Walker {
        nodes: 0,
        conditionals: 0,
    };

    let obj = as_object(document, "root")?;
    if step_of(obj, "root")? != "root" {
        return Err(violation("root", "document must start with a root node"));
    }
    walker.check_root(obj)?;

    Ok(PreflightReport {
        nodes: walker.nodes,
        conditionals: walker.conditionals,
    })
}

/// What kind of parent a node is being checked under — the shape rules
/// differ per position in the tree.
#[derive(Clone, Copy, PartialEq)]
enum Position {
    /// Direct child of the root or of an `if-child` branch.
    Fragment,
    /// Branch of an `if` node.
    Branch,
    /// Child of a weighting node; `specified` controls the allocation rule.
    Leaf { specified: bool },
}

struct Walker {
    nodes: usize,
    conditionals: usize,
}

impl Walker {
    fn check_root(&mut self, obj: &Map<String, Value>) -> Result<(), ValidateError> {
        let path = "root";
        self.check_common(obj, path)?;

        let name = str_field(obj, path, "name")?;
        if name.is_empty() {
            return Err(violation(path, "root 'name' must not be empty"));
        }
        str_field(obj, path, "description")?;

        let rebalance = str_field(obj, path, "rebalance")?;
        if !CADENCES.contains(&rebalance) {
            return Err(violation(
                path,
                format!("unknown rebalance cadence '{rebalance}'"),
            ));
        }

        null_field(obj, path, "rebalance-corridor-width")?;

        let children = children_of(obj, path)?;
        if children.len() != 1 {
            return Err(violation(
                path,
                format!("root must have exactly 1 child, found {}", children.len()),
            ));
        }
        self.check_node(&children[0], &child_path(path, 0), Position::Fragment)
    }

    fn check_node(
        &mut self,
        node: &Value,
        path: &str,
        position: Position,
    ) -> Result<(), ValidateError> {
        let obj = as_object(node, path)?;
        let step = step_of(obj, path)?.to_string();
        self.check_common(obj, path)?;

        match (step.as_str(), position) {
            ("wt-cash-equal", Position::Fragment) => self.check_weighting(obj, path, false),
            ("wt-cash-specified", Position::Fragment) => self.check_weighting(obj, path, true),
            ("if", Position::Fragment) => self.check_if(obj, path),
            ("if-child", Position::Branch) => self.check_branch(obj, path),
            ("asset", Position::Leaf { specified }) => self.check_asset(obj, path, specified),
            ("root", _) => Err(violation(path, "root node below the document top")),
            (other, Position::Branch) => Err(violation(
                path,
                format!("children of an 'if' node must be 'if-child', found '{other}'"),
            )),
            (other, Position::Leaf { .. }) => Err(violation(
                path,
                format!("children of a weighting node must be 'asset', found '{other}'"),
            )),
            (other, Position::Fragment) => Err(violation(
                path,
                format!("expected a weighting or conditional node here, found '{other}'"),
            )),
        }
    }

    /// Checks every node kind shares: counted, no identifier, null weight.
    fn check_common(&mut self, obj: &Map<String, Value>, path: &str) -> Result<(), ValidateError> {
        self.nodes += 1;

        if obj.contains_key("id") {
            return Err(violation(
                path,
                "node carries an 'id'; identifiers are platform-assigned",
            ));
        }

        null_field(obj, path, "weight")
    }

    fn check_weighting(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        specified: bool,
    ) -> Result<(), ValidateError> {
        let children = children_of(obj, path)?;
        if children.is_empty() {
            return Err(violation(path, "weighting node has no children"));
        }

        for (i, child) in children.iter().enumerate() {
            self.check_node(child, &child_path(path, i), Position::Leaf { specified })?;
        }

        if specified {
            let sum: f64 = children
                .iter()
                .map(|c| c["allocation"].as_f64().unwrap_or(0.0))
                .sum();
            if (sum - 1.0).abs() > ALLOCATION_TOLERANCE {
                return Err(violation(
                    path,
                    format!("child allocations sum to {sum}, expected 1.0"),
                ));
            }
        }

        Ok(())
    }

    fn check_if(&mut self, obj: &Map<String, Value>, path: &str) -> Result<(), ValidateError> {
        self.conditionals += 1;

        let children = children_of(obj, path)?;
        if children.len() != 2 {
            return Err(violation(
                path,
                format!(
                    "conditional must have exactly 2 branches, found {}",
                    children.len()
                ),
            ));
        }

        let mut else_count = 0;
        for (i, child) in children.iter().enumerate() {
            let branch_path = child_path(path, i);
            self.check_node(child, &branch_path, Position::Branch)?;
            if child["is-else-condition?"] == Value::Bool(true) {
                else_count += 1;
            }
        }
        if else_count != 1 {
            return Err(violation(
                path,
                format!("conditional must have exactly 1 else branch, found {else_count}"),
            ));
        }

        Ok(())
    }

    fn check_branch(&mut self, obj: &Map<String, Value>, path: &str) -> Result<(), ValidateError> {
        let is_else = match obj.get("is-else-condition?") {
            Some(Value::Bool(b)) => *b,
            _ => {
                return Err(violation(
                    path,
                    "branch is missing the 'is-else-condition?' boolean",
                ))
            }
        };

        if is_else {
            for field in CONDITION_FIELDS {
                if obj.contains_key(*field) {
                    return Err(violation(
                        path,
                        format!("else branch must not carry condition field '{field}'"),
                    ));
                }
            }
        } else {
            self.check_condition_fields(obj, path)?;
        }

        let children = children_of(obj, path)?;
        if children.len() != 1 {
            return Err(violation(
                path,
                format!(
                    "branch must wrap exactly 1 subtree, found {} children",
                    children.len()
                ),
            ));
        }
        self.check_node(&children[0], &child_path(path, 0), Position::Fragment)
    }

    /// The complete condition field set on a non-else branch, with the
    /// function-equality rule re-checked.
    fn check_condition_fields(
        &self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<(), ValidateError> {
        for field in CONDITION_FIELDS {
            if !obj.contains_key(*field) {
                return Err(violation(
                    path,
                    format!("condition branch is missing '{field}'"),
                ));
            }
        }

        let comparator = str_field(obj, path, "comparator")?;
        if !COMPARATORS.contains(&comparator) {
            return Err(violation(
                path,
                format!("unknown comparator '{comparator}'"),
            ));
        }

        let lhs_val = str_field(obj, path, "lhs-val")?;
        if lhs_val.is_empty() {
            return Err(violation(path, "'lhs-val' must name a ticker"));
        }

        let lhs_fn = str_field(obj, path, "lhs-fn")?;
        if !CONDITION_FNS.contains(&lhs_fn) {
            return Err(violation(
                path,
                format!("function '{lhs_fn}' is not accepted inside conditions"),
            ));
        }
        check_window(obj, path, "lhs-fn-params")?;

        let rhs_fn = str_field(obj, path, "rhs-fn")?;
        if rhs_fn != lhs_fn {
            return Err(violation(
                path,
                format!("'rhs-fn' ({rhs_fn}) must equal 'lhs-fn' ({lhs_fn})"),
            ));
        }
        check_window(obj, path, "rhs-fn-params")?;

        let fixed = match obj.get("rhs-fixed-value?") {
            Some(Value::Bool(b)) => *b,
            _ => return Err(violation(path, "'rhs-fixed-value?' must be a boolean")),
        };

        match (fixed, &obj["rhs-val"]) {
            (true, Value::Number(n)) => {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if !v.is_finite() || v < 0.0 {
                    return Err(violation(
                        path,
                        format!("fixed 'rhs-val' must be a non-negative number, found {v}"),
                    ));
                }
            }
            (true, other) => {
                return Err(violation(
                    path,
                    format!("fixed 'rhs-val' must be a number, found {other}"),
                ));
            }
            (false, Value::String(ticker)) if !ticker.is_empty() => {}
            (false, other) => {
                return Err(violation(
                    path,
                    format!("computed 'rhs-val' must name a ticker, found {other}"),
                ));
            }
        }

        Ok(())
    }

    fn check_asset(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        under_specified: bool,
    ) -> Result<(), ValidateError> {
        for field in ["ticker", "exchange", "name"] {
            let value = str_field(obj, path, field)?;
            if value.is_empty() {
                return Err(violation(path, format!("asset '{field}' must not be empty")));
            }
        }

        if obj.contains_key("children") {
            return Err(violation(path, "asset nodes are leaves and take no children"));
        }

        match (under_specified, obj.get("allocation")) {
            (true, Some(Value::Number(n))) => {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if !(0.0..=1.0).contains(&v) {
                    return Err(violation(
                        path,
                        format!("'allocation' must be a fraction in [0, 1], found {v}"),
                    ));
                }
            }
            (true, _) => {
                return Err(violation(
                    path,
                    "children of a specified-weight node must carry a numeric 'allocation'",
                ));
            }
            (false, Some(_)) => {
                return Err(violation(
                    path,
                    "'allocation' is only valid under a specified-weight node",
                ));
            }
            (false, None) => {}
        }

        Ok(())
    }
}

// ─── Field helpers ───────────────────────────────────────────────────

fn violation(path: &str, message: impl Into<String>) -> ValidateError {
    ValidateError {
        path: path.to_string(),
        message: message.into(),
    }
}

fn child_path(path: &str, index: usize) -> String {
    format!("{path}.children[{index}]")
}

fn as_object<'a>(node: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidateError> {
    node.as_object()
        .ok_or_else(|| violation(path, "node must be a JSON object"))
}

fn step_of<'a>(obj: &'a Map<String, Value>, path: &str) -> Result<&'a str, ValidateError> {
    obj.get("step")
        .and_then(Value::as_str)
        .ok_or_else(|| violation(path, "node is missing the 'step' discriminator"))
}

fn str_field<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a str, ValidateError> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| violation(path, format!("'{key}' must be a string")))
}

fn null_field(obj: &Map<String, Value>, path: &str, key: &str) -> Result<(), ValidateError> {
    match obj.get(key) {
        Some(Value::Null) => Ok(()),
        Some(other) => Err(violation(
            path,
            format!("'{key}' must be null, found {other}"),
        )),
        None => Err(violation(path, format!("'{key}' must be present and null"))),
    }
}

fn children_of<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
) -> Result<&'a Vec<Value>, ValidateError> {
    obj.get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| violation(path, "'children' must be an array"))
}

/// `window` must be a positive integer inside the params block.
fn check_window(obj: &Map<String, Value>, path: &str, key: &str) -> Result<(), ValidateError> {
    let params = obj
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| violation(path, format!("'{key}' must be an object")))?;
    match params.get("window") {
        Some(Value::Number(n)) if n.as_u64().map(|w| w > 0).unwrap_or(false) => Ok(()),
        Some(other) => Err(violation(
            path,
            format!("'{key}.window' must be a positive integer, found {other}"),
        )),
        None => Err(violation(path, format!("'{key}' is missing 'window'"))),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
