//! General-purpose checks for assertion steps.
//!
//! Each check returns `Err(AssertionFailure)` with an expected/actual
//! message rather than a bare boolean, so a failing check aborts the
//! scenario with full context through the ordinary error path.

use std::fmt::Debug;

use crate::result::{EscenarioError, EscenarioResult};

/// Assertion helpers for scenario steps
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    pub fn equals<T: PartialEq + Debug>(actual: &T, expected: &T) -> EscenarioResult<()> {
        if actual == expected {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected {expected:?}, got {actual:?}"),
            })
        }
    }

    /// Assert a string contains a substring
    pub fn contains(haystack: &str, needle: &str) -> EscenarioResult<()> {
        if haystack.contains(needle) {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected '{haystack}' to contain '{needle}'"),
            })
        }
    }

    /// Assert a value lies in an inclusive range
    pub fn in_range(value: f64, min: f64, max: f64) -> EscenarioResult<()> {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected {value} to be in range [{min}, {max}]"),
            })
        }
    }

    /// Assert a condition holds
    pub fn is_true(condition: bool, message: &str) -> EscenarioResult<()> {
        if condition {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: message.to_string(),
            })
        }
    }

    /// Assert a collection has the expected length
    pub fn has_length<T>(collection: &[T], expected: usize) -> EscenarioResult<()> {
        if collection.len() == expected {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected length {expected}, got {}", collection.len()),
            })
        }
    }

    /// Assert an attribute read matched the expected value
    pub fn attribute_is(
        actual: Option<&str>,
        expected: &str,
        attribute: &str,
    ) -> EscenarioResult<()> {
        match actual {
            Some(value) if value == expected => Ok(()),
            Some(value) => Err(EscenarioError::AssertionFailure {
                message: format!("expected {attribute}='{expected}', got '{value}'"),
            }),
            None => Err(EscenarioError::AssertionFailure {
                message: format!("expected {attribute}='{expected}', attribute absent"),
            }),
        }
    }

    /// Assert a URL contains a fragment (path, query, origin)
    pub fn url_contains(url: &str, fragment: &str) -> EscenarioResult<()> {
        if url.contains(fragment) {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected URL '{url}' to contain '{fragment}'"),
            })
        }
    }

    /// Assert an HTTP status code
    pub fn status_is(actual: u16, expected: u16) -> EscenarioResult<()> {
        if actual == expected {
            Ok(())
        } else {
            Err(EscenarioError::AssertionFailure {
                message: format!("expected status {expected}, got {actual}"),
            })
        }
    }
}
