//! Allocation node builder — `{assets, weights}` to a weighting node.

use std::collections::BTreeMap;

use super::{CompileError, WEIGHT_TOLERANCE};
use crate::exchanges;
use crate::schema::SchemaNode;

/// Build a weighting node for a terminal allocation.
///
/// Empty `weights` produces the equal-weight variant; otherwise the
/// specified-weight variant with a per-child `allocation` fraction. The
/// fractions must sum to 1.0 within tolerance — checked here at
/// construction, not deferred to the validator.
pub fn build_allocation(
    assets: &[String],
    weights: &BTreeMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Result<SchemaNode, CompileError> {
    if assets.is_empty() {
        return Err(CompileError::EmptyAssets);
    }

    if weights.is_empty() {
        let children = assets
            .iter()
            .map(|ticker| asset_leaf(ticker, None, warnings))
            .collect();
        return Ok(SchemaNode::wt_cash_equal(children));
    }

    for ticker in weights.keys() {
        if !assets.iter().any(|a| a == ticker) {
            return Err(CompileError::UnknownWeightTicker {
                ticker: ticker.clone(),
            });
        }
    }

    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(CompileError::WeightSumMismatch { sum });
    }

    let children = assets
        .iter()
        .map(|ticker| {
            let allocation = weights.get(ticker).copied().unwrap_or(0.0);
            asset_leaf(ticker, Some(allocation), warnings)
        })
        .collect();
    Ok(SchemaNode::wt_cash_specified(children))
}

/// Asset leaf with resolved venue metadata. Unknown tickers get the
/// default venue code and a collected warning.
fn asset_leaf(ticker: &str, allocation: Option<f64>, warnings: &mut Vec<String>) -> SchemaNode {
    match exchanges::lookup(ticker) {
        Some(listing) => SchemaNode::asset(ticker, listing.exchange, listing.name, allocation),
        None => {
            warnings.push(format!(
                "no known venue for '{ticker}', defaulting to {}",
                exchanges::DEFAULT_EXCHANGE
            ));
            SchemaNode::asset(ticker, exchanges::DEFAULT_EXCHANGE, ticker, allocation)
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
