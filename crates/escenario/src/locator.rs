//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a query expression tagged with its dialect (CSS or
//! XPath). Locators are immutable once defined and are validated when a
//! [`SelectorRegistry`](crate::registry::SelectorRegistry) is built, not at
//! first use: a typo fails the suite at load time instead of mid-scenario.

use serde::{Deserialize, Serialize};

use crate::result::{EscenarioError, EscenarioResult};

/// Query dialect a locator expression is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryDialect {
    /// CSS selector (e.g., `button[aria-label="search-btn"]`)
    Css,
    /// XPath expression (e.g., `//div/*[contains(text(),"Dashboard")]`)
    XPath,
}

impl QueryDialect {
    /// Human-readable dialect name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
        }
    }
}

/// A query expression tagged with its dialect.
///
/// Many interactions may reference the same locator; cloning is cheap
/// relative to a DOM round trip and keeps the type freely shareable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    dialect: QueryDialect,
    expression: String,
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(expression: impl Into<String>) -> Self {
        Self {
            dialect: QueryDialect::Css,
            expression: expression.into(),
        }
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self {
            dialect: QueryDialect::XPath,
            expression: expression.into(),
        }
    }

    /// The dialect this locator is written in
    #[must_use]
    pub const fn dialect(&self) -> QueryDialect {
        self.dialect
    }

    /// The raw query expression
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Validate the expression for suite-load checks.
    ///
    /// This is a plausibility check, not a full parse: empty or
    /// whitespace-only expressions are rejected for both dialects, and an
    /// XPath expression must begin with `/`, `.` or `(`. The host engine
    /// remains the authority on whether the query actually resolves.
    ///
    /// # Errors
    ///
    /// Returns [`EscenarioError::InvalidLocator`] with `name` describing
    /// where the locator was declared.
    pub fn validate(&self, name: &str) -> EscenarioResult<()> {
        let trimmed = self.expression.trim();
        if trimmed.is_empty() {
            return Err(EscenarioError::InvalidLocator {
                name: name.to_string(),
                message: "expression is empty".to_string(),
            });
        }
        match self.dialect {
            QueryDialect::Css => {
                if !balanced(trimmed, '[', ']') || !balanced(trimmed, '(', ')') {
                    return Err(EscenarioError::InvalidLocator {
                        name: name.to_string(),
                        message: format!("unbalanced brackets in '{trimmed}'"),
                    });
                }
            }
            QueryDialect::XPath => {
                if !trimmed.starts_with('/') && !trimmed.starts_with('.') && !trimmed.starts_with('(')
                {
                    return Err(EscenarioError::InvalidLocator {
                        name: name.to_string(),
                        message: format!("XPath must start with '/', '.' or '(': '{trimmed}'"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Convert to a JavaScript query expression resolving the first match.
    #[must_use]
    pub fn to_query(&self) -> String {
        match self.dialect {
            QueryDialect::Css => format!("document.querySelector({:?})", self.expression),
            QueryDialect::XPath => format!(
                "document.evaluate({:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                self.expression
            ),
        }
    }

    /// Convert to a JavaScript expression counting all matches.
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self.dialect {
            QueryDialect::Css => format!("document.querySelectorAll({:?}).length", self.expression),
            QueryDialect::XPath => format!(
                "document.evaluate({:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                self.expression
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.dialect.as_str(), self.expression)
    }
}

/// Check that `open`/`close` pairs in `s` are balanced, ignoring quoted runs.
fn balanced(s: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    let mut quote: Option<char> = None;
    for c in s.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
            }
        }
    }
    depth == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_css_locator() {
            let locator = Locator::css("button[title=\"Add Overheads\"] svg");
            assert_eq!(locator.dialect(), QueryDialect::Css);
            assert_eq!(locator.expression(), "button[title=\"Add Overheads\"] svg");
        }

        #[test]
        fn test_xpath_locator() {
            let locator = Locator::xpath("//div/*[contains(text(),\"Dashboard\")]");
            assert_eq!(locator.dialect(), QueryDialect::XPath);
        }

        #[test]
        fn test_display_includes_dialect() {
            let locator = Locator::css("#simple-tab-2019");
            assert_eq!(locator.to_string(), "css:#simple-tab-2019");
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_empty_expression_rejected() {
            let err = Locator::css("   ").validate("submit_button").unwrap_err();
            assert!(err.to_string().contains("submit_button"));
        }

        #[test]
        fn test_unbalanced_css_rejected() {
            assert!(Locator::css("div[aria-label=\"amount\"").validate("amount").is_err());
        }

        #[test]
        fn test_quoted_brackets_ignored() {
            // A bracket inside a quoted attribute value is not a delimiter.
            let locator = Locator::css("input[placeholder=\"[optional]\"]");
            assert!(locator.validate("field").is_ok());
        }

        #[test]
        fn test_xpath_must_be_rooted() {
            assert!(Locator::xpath("div/span").validate("x").is_err());
            assert!(Locator::xpath("//div/span").validate("x").is_ok());
            assert!(Locator::xpath("(//tr)[1]").validate("x").is_ok());
            assert!(Locator::xpath(".//td").validate("x").is_ok());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let query = Locator::css("td[aria-label=\"amount\"]").to_query();
            assert!(query.contains("querySelector"));
            assert!(query.contains("amount"));
        }

        #[test]
        fn test_xpath_query() {
            let query = Locator::xpath("//button").to_query();
            assert!(query.contains("evaluate"));
            assert!(query.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_css_count_query() {
            let query = Locator::css("div[aria-label*=\"month-detail\"]").to_count_query();
            assert!(query.contains("querySelectorAll"));
            assert!(query.contains(".length"));
        }

        #[test]
        fn test_xpath_count_query() {
            let query = Locator::xpath("//tr").to_count_query();
            assert!(query.contains("snapshotLength"));
        }
    }
}
