//! Operand resolver — the leaf grammar of the condition micro-language.
//!
//! Maps a textual operand to a canonical reference (ticker + indicator
//! function + optional window) or a fixed numeric literal. Accepted
//! ticker-qualified forms:
//! - `SPY` / `SPY_price`          → current price
//! - `SPY_<N>d_MA`                → moving-average price over N days
//! - `SPY_cumulative_return_<N>d` → cumulative return over N days
//! - `SPY_RSI_<N>d`               → relative strength index over N days
//! - `SPY_EMA_<N>d`               → exponential moving average over N days
//!
//! A bare non-negative number resolves to a fixed literal. Anything else
//! is a hard `UnsupportedFormat` error, never a silent default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Indicator functions understood by the execution platform.
///
/// Serde names are the platform's wire strings (`lhs-fn` / `rhs-fn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorFn {
    #[serde(rename = "current-price")]
    CurrentPrice,
    #[serde(rename = "moving-average-price")]
    MovingAveragePrice,
    #[serde(rename = "cumulative-return")]
    CumulativeReturn,
    #[serde(rename = "relative-strength-index")]
    RelativeStrengthIndex,
    #[serde(rename = "exponential-moving-average-price")]
    ExponentialMovingAveragePrice,
}

impl IndicatorFn {
    /// Wire name used by the remote schema's function fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorFn::CurrentPrice => "current-price",
            IndicatorFn::MovingAveragePrice => "moving-average-price",
            IndicatorFn::CumulativeReturn => "cumulative-return",
            IndicatorFn::RelativeStrengthIndex => "relative-strength-index",
            IndicatorFn::ExponentialMovingAveragePrice => "exponential-moving-average-price",
        }
    }

    /// Whether this function takes a lookback window.
    pub fn windowed(&self) -> bool {
        !matches!(self, IndicatorFn::CurrentPrice)
    }
}

/// A ticker-qualified indicator reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperandRef {
    pub ticker: String,
    pub function: IndicatorFn,
    /// Lookback window in days; `None` only for the current-price function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
}

/// A resolved operand: a fixed number or an indicator reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Literal(f64),
    Ref(OperandRef),
}

impl Operand {
    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }
}

/// The accepted operand shapes, quoted back to the caller on failure so a
/// bad upstream strategy description can be fixed without guesswork.
pub const ACCEPTED_FORMS: &str = "TICKER, TICKER_price, TICKER_<N>d_MA, \
     TICKER_cumulative_return_<N>d, TICKER_RSI_<N>d, TICKER_EMA_<N>d, \
     or a non-negative number";

/// Operand resolution failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OperandError {
    /// The text matches none of the accepted operand formats.
    #[error("unsupported operand format '{text}' (accepted: {forms})", forms = ACCEPTED_FORMS)]
    UnsupportedFormat { text: String },
}

/// Resolve operand text to a canonical `Operand`.
///
/// Pure and total over the accepted grammar; any other shape fails with
/// [`OperandError::UnsupportedFormat`] naming the offending text.
pub fn resolve(text: &str) -> Result<Operand, OperandError> {
    let trimmed = text.trim();

    // Bare number → fixed literal. Negative and non-finite values are not
    // part of the grammar (thresholds are prices, returns, RSI levels).
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() && value >= 0.0 {
            return Ok(Operand::Literal(value));
        }
        return Err(unsupported(trimmed));
    }

    // `TICKER_cumulative_return_<N>d`
    if let Some((ticker, rest)) = trimmed.split_once("_cumulative_return_") {
        return windowed_ref(trimmed, ticker, rest, IndicatorFn::CumulativeReturn);
    }

    // `TICKER_RSI_<N>d`
    if let Some((ticker, rest)) = trimmed.split_once("_RSI_") {
        return windowed_ref(trimmed, ticker, rest, IndicatorFn::RelativeStrengthIndex);
    }

    // `TICKER_EMA_<N>d`
    if let Some((ticker, rest)) = trimmed.split_once("_EMA_") {
        return windowed_ref(trimmed, ticker, rest, IndicatorFn::ExponentialMovingAveragePrice);
    }

    // `TICKER_<N>d_MA` — the generic moving-average pattern. Subsumes the
    // legacy `_200d_MA` / `_50d_MA` forms found in older condition text.
    if let Some(rest) = trimmed.strip_suffix("_MA") {
        if let Some((ticker, win)) = rest.rsplit_once('_') {
            return windowed_ref(trimmed, ticker, win, IndicatorFn::MovingAveragePrice);
        }
        return Err(unsupported(trimmed));
    }

    // `TICKER_price`
    if let Some(ticker) = trimmed.strip_suffix("_price") {
        if let Some(ticker) = parse_ticker(ticker) {
            return Ok(Operand::Ref(OperandRef {
                ticker,
                function: IndicatorFn::CurrentPrice,
                window: None,
            }));
        }
        return Err(unsupported(trimmed));
    }

    // Bare `TICKER`
    if let Some(ticker) = parse_ticker(trimmed) {
        return Ok(Operand::Ref(OperandRef {
            ticker,
            function: IndicatorFn::CurrentPrice,
            window: None,
        }));
    }

    Err(unsupported(trimmed))
}

fn unsupported(text: &str) -> OperandError {
    OperandError::UnsupportedFormat {
        text: text.to_string(),
    }
}

/// Build a windowed reference from a ticker part and a `<N>d` window part.
fn windowed_ref(
    full: &str,
    ticker: &str,
    window: &str,
    function: IndicatorFn,
) -> Result<Operand, OperandError> {
    let ticker = parse_ticker(ticker).ok_or_else(|| unsupported(full))?;
    let window = parse_window_days(window).ok_or_else(|| unsupported(full))?;
    Ok(Operand::Ref(OperandRef {
        ticker,
        function,
        window: Some(window),
    }))
}

/// `<N>d` with N a positive integer.
fn parse_window_days(text: &str) -> Option<u32> {
    let digits = text.strip_suffix('d')?;
    let n: u32 = digits.parse().ok()?;
    (n > 0).then_some(n)
}

/// Tickers are short uppercase symbols: letters, digits, and the `.` / `-`
/// used by share classes (BRK.B), starting with a letter.
fn parse_ticker(text: &str) -> Option<String> {
    let valid = !text.is_empty()
        && text.len() <= 10
        && text.starts_with(|c: char| c.is_ascii_uppercase())
        && text
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    valid.then(|| text.to_string())
}

// ─── Tests ───────────────────────────────────────────────────────────
