//! Numeric aggregation over rendered text.
//!
//! Many scenarios verify that a displayed total equals the sum of line-item
//! values rendered elsewhere ("total cost = sum of per-row costs"). Rendered
//! numbers carry decorations (currency prefixes, group separators), so
//! parsing goes through a configurable strip list instead of ad-hoc
//! string-replace chains scattered per page.

use serde::{Deserialize, Serialize};

use crate::result::{EscenarioError, EscenarioResult};

/// Decoration-stripping number parser.
///
/// Each pattern in the strip list is removed from the raw string (all
/// occurrences), the remainder is trimmed, then parsed as `f64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberFormat {
    strip: Vec<String>,
}

impl Default for NumberFormat {
    /// Strips group separators only; use [`NumberFormat::currency`] when a
    /// symbol prefix is also present.
    fn default() -> Self {
        Self {
            strip: vec![",".to_string()],
        }
    }
}

impl NumberFormat {
    /// Create a format with an explicit strip list
    #[must_use]
    pub fn new(strip: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            strip: strip.into_iter().map(Into::into).collect(),
        }
    }

    /// Format for a currency-prefixed rendering, e.g. `"Rs 1,234.50"`
    #[must_use]
    pub fn currency(symbol: impl Into<String>) -> Self {
        Self {
            strip: vec![symbol.into(), ",".to_string()],
        }
    }

    /// Add one more pattern to the strip list
    #[must_use]
    pub fn strip(mut self, pattern: impl Into<String>) -> Self {
        self.strip.push(pattern.into());
        self
    }

    /// Patterns currently stripped before parsing
    #[must_use]
    pub fn strip_patterns(&self) -> &[String] {
        &self.strip
    }

    /// Strip decorations and parse the remainder as a number.
    ///
    /// # Errors
    ///
    /// Returns [`EscenarioError::ParseError`] naming the raw input when the
    /// stripped remainder does not parse.
    pub fn parse(&self, raw: &str) -> EscenarioResult<f64> {
        let mut stripped = raw.to_string();
        for pattern in &self.strip {
            stripped = stripped.replace(pattern.as_str(), "");
        }
        stripped
            .trim()
            .parse::<f64>()
            .map_err(|_| EscenarioError::ParseError {
                raw: raw.to_string(),
            })
    }
}

/// Parse each value and reduce the results, starting from `seed`.
///
/// An empty input yields `seed`.
///
/// # Errors
///
/// Fails on the first value the parser rejects.
pub fn aggregate<'a, I, P, R>(values: I, parser: P, reducer: R, seed: f64) -> EscenarioResult<f64>
where
    I: IntoIterator<Item = &'a str>,
    P: Fn(&str) -> EscenarioResult<f64>,
    R: Fn(f64, f64) -> f64,
{
    let mut acc = seed;
    for value in values {
        acc = reducer(acc, parser(value)?);
    }
    Ok(acc)
}

/// Sum of all values under a format, seeded at zero.
///
/// # Errors
///
/// Fails on the first value that does not parse.
pub fn sum<'a, I>(values: I, format: &NumberFormat) -> EscenarioResult<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    aggregate(values, |raw| format.parse(raw), |a, b| a + b, 0.0)
}

/// Pass when `|actual - expected| <= tolerance`.
///
/// Used where rounding drift is expected between independently computed
/// aggregates. The tolerance is always caller-supplied: what window the
/// system under test actually warrants must be confirmed against it, not
/// assumed.
///
/// # Errors
///
/// Returns [`EscenarioError::AssertionFailure`] with both values and the
/// window when the difference exceeds it.
pub fn compare_approx(actual: f64, expected: f64, tolerance: f64) -> EscenarioResult<()> {
    if (actual - expected).abs() <= tolerance {
        Ok(())
    } else {
        Err(EscenarioError::AssertionFailure {
            message: format!(
                "expected {expected} ± {tolerance}, got {actual} (off by {})",
                (actual - expected).abs()
            ),
        })
    }
}

/// Pass when both values truncate to the same integer.
///
/// Used where fractional cents differ by rendering rounding.
///
/// # Errors
///
/// Returns [`EscenarioError::AssertionFailure`] with both truncations when
/// they differ.
pub fn compare_truncated(actual: f64, expected: f64) -> EscenarioResult<()> {
    if actual.trunc() == expected.trunc() {
        Ok(())
    } else {
        Err(EscenarioError::AssertionFailure {
            message: format!(
                "expected truncation {} (from {expected}), got {} (from {actual})",
                expected.trunc(),
                actual.trunc()
            ),
        })
    }
}
