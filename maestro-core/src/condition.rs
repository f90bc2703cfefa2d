//! Condition parsing — `<lhs> <comparator> <rhs>` over the operand grammar.
//!
//! The platform carries a single function per comparison in practice: when
//! the right side is itself a computed reference, its function must equal
//! the left side's, and when it is a fixed literal the left-hand function
//! is duplicated onto the right at compile time. The equality rule is
//! enforced here at construction, so a `Condition` value never reaches the
//! validator (or the platform) with mismatched functions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operand::{self, Operand, OperandError, OperandRef};

/// Comparison operators accepted by the platform's conditional nodes.
///
/// Serde names are the wire strings of the `comparator` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
}

impl Comparator {
    /// Wire string for the remote `comparator` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Gt => "gt",
            Comparator::Lt => "lt",
            Comparator::Gte => "gte",
            Comparator::Lte => "lte",
            Comparator::Eq => "eq",
        }
    }
}

/// Comparator tokens in source text, longest first so `>=` wins over `>`.
const COMPARATOR_TOKENS: &[(&str, Comparator)] = &[
    (">=", Comparator::Gte),
    ("<=", Comparator::Lte),
    ("==", Comparator::Eq),
    (">", Comparator::Gt),
    ("<", Comparator::Lt),
    ("=", Comparator::Eq),
];

/// A parsed, rule-checked condition.
///
/// Construct through [`Condition::new`] (typed input) or
/// [`Condition::parse`] (free text); both apply the same rules. The left
/// side is always a ticker reference — the platform has no literal-vs-X
/// comparison shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub lhs: OperandRef,
    pub comparator: Comparator,
    pub rhs: Operand,
}

/// Condition construction / parse failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConditionError {
    #[error(transparent)]
    Operand(#[from] OperandError),

    /// No comparator token found in the condition text.
    #[error("no comparator in condition '{0}' (expected one of >=, <=, ==, >, <)")]
    MissingComparator(String),

    /// The left side resolved to a bare number instead of a reference.
    #[error("left side of a condition must be a ticker-qualified reference, got literal {0}")]
    LiteralLeftSide(f64),

    /// Literal thresholds must be finite and non-negative.
    #[error("literal value {0} must be a finite, non-negative number")]
    InvalidLiteral(f64),

    /// Right side computed with a different function than the left. The
    /// platform accepts such documents from naive builders and rejects
    /// them remotely with no diagnostic, so this is a hard local error.
    #[error("right-hand function '{rhs}' must equal left-hand function '{lhs}'")]
    FunctionMismatch {
        lhs: &'static str,
        rhs: &'static str,
    },
}

impl Condition {
    /// Build a condition from typed operands, enforcing the platform rules.
    pub fn new(
        lhs: OperandRef,
        comparator: Comparator,
        rhs: Operand,
    ) -> Result<Self, ConditionError> {
        match &rhs {
            Operand::Literal(value) => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ConditionError::InvalidLiteral(*value));
                }
            }
            Operand::Ref(r) => {
                if r.function != lhs.function {
                    return Err(ConditionError::FunctionMismatch {
                        lhs: lhs.function.as_str(),
                        rhs: r.function.as_str(),
                    });
                }
            }
        }

        Ok(Self {
            lhs,
            comparator,
            rhs,
        })
    }

    /// Parse a free-text condition — the adapter at the upstream boundary.
    ///
    /// Splits on the longest comparator token present, resolves both sides
    /// through the operand grammar, then applies the same construction
    /// rules as [`Condition::new`].
    pub fn parse(text: &str) -> Result<Self, ConditionError> {
        let (lhs_text, comparator, rhs_text) = split_on_comparator(text)
            .ok_or_else(|| ConditionError::MissingComparator(text.trim().to_string()))?;

        let lhs = match operand::resolve(lhs_text)? {
            Operand::Ref(r) => r,
            Operand::Literal(v) => return Err(ConditionError::LiteralLeftSide(v)),
        };
        let rhs = operand::resolve(rhs_text)?;

        Self::new(lhs, comparator, rhs)
    }

    /// Whether the right side is a fixed literal (`rhs-fixed-value?`).
    pub fn rhs_is_fixed(&self) -> bool {
        self.rhs.is_literal()
    }
}

/// Find the first comparator token (longest tokens first) and split around it.
fn split_on_comparator(text: &str) -> Option<(&str, Comparator, &str)> {
    for &(token, comparator) in COMPARATOR_TOKENS {
        if let Some(idx) = text.find(token) {
            let lhs = &text[..idx];
            let rhs = &text[idx + token.len()..];
            return Some((lhs, comparator, rhs));
        }
    }
    None
}

// ─── Tests ───────────────────────────────────────────────────────────
