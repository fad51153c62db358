//! Selector registry: logical element names mapped to tagged locators.
//!
//! One registry per page object. Every entry is validated when the registry
//! is built, so a malformed selector fails at suite load rather than at
//! first use inside a scenario.

use std::collections::BTreeMap;

use crate::locator::Locator;
use crate::result::{EscenarioError, EscenarioResult};

/// A validated, immutable mapping from logical element name to [`Locator`].
#[derive(Debug, Clone)]
pub struct SelectorRegistry {
    page: String,
    entries: BTreeMap<String, Locator>,
}

impl SelectorRegistry {
    /// Start building a registry for the named page.
    #[must_use]
    pub fn builder(page: impl Into<String>) -> SelectorRegistryBuilder {
        SelectorRegistryBuilder {
            page: page.into(),
            entries: Vec::new(),
        }
    }

    /// The page name this registry belongs to
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Look up a locator by its logical name.
    ///
    /// # Errors
    ///
    /// Returns [`EscenarioError::UnknownElement`] if the name was never
    /// registered.
    pub fn get(&self, name: &str) -> EscenarioResult<&Locator> {
        self.entries
            .get(name)
            .ok_or_else(|| EscenarioError::UnknownElement {
                name: name.to_string(),
            })
    }

    /// All registered logical names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder collecting entries for a [`SelectorRegistry`].
///
/// Entries are checked in [`SelectorRegistryBuilder::build`]: duplicate
/// names and invalid expressions are both rejected.
#[derive(Debug, Clone)]
pub struct SelectorRegistryBuilder {
    page: String,
    entries: Vec<(String, Locator)>,
}

impl SelectorRegistryBuilder {
    /// Register a CSS selector under a logical name
    #[must_use]
    pub fn css(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.entries.push((name.into(), Locator::css(expression)));
        self
    }

    /// Register an XPath expression under a logical name
    #[must_use]
    pub fn xpath(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.entries.push((name.into(), Locator::xpath(expression)));
        self
    }

    /// Register a pre-built locator under a logical name
    #[must_use]
    pub fn locator(mut self, name: impl Into<String>, locator: Locator) -> Self {
        self.entries.push((name.into(), locator));
        self
    }

    /// Validate every entry and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns [`EscenarioError::InvalidLocator`] for an empty name,
    /// a duplicate name, or an expression that fails
    /// [`Locator::validate`].
    pub fn build(self) -> EscenarioResult<SelectorRegistry> {
        let mut entries = BTreeMap::new();
        for (name, locator) in self.entries {
            if name.trim().is_empty() {
                return Err(EscenarioError::InvalidLocator {
                    name: format!("<unnamed on page '{}'>", self.page),
                    message: "element name is empty".to_string(),
                });
            }
            locator.validate(&name)?;
            if entries.insert(name.clone(), locator).is_some() {
                return Err(EscenarioError::InvalidLocator {
                    name,
                    message: format!("registered twice on page '{}'", self.page),
                });
            }
        }
        Ok(SelectorRegistry {
            page: self.page,
            entries,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::QueryDialect;

    fn costing_registry() -> SelectorRegistry {
        SelectorRegistry::builder("costing")
            .css("tab_2019", "#simple-tab-2019")
            .css("overhead_amounts", "td[aria-label=\"amount\"]")
            .css("total_overhead_cost", "div[aria-label=\"total-overheads-cost\"] h3:nth-of-type(1)")
            .xpath("dashboard_tab", "//div/*[contains(text(),\"Dashboard\")]")
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_returns_registered_locator() {
        let registry = costing_registry();
        let locator = registry.get("tab_2019").unwrap();
        assert_eq!(locator.dialect(), QueryDialect::Css);
        assert_eq!(locator.expression(), "#simple-tab-2019");
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        let registry = costing_registry();
        let err = registry.get("does_not_exist").unwrap_err();
        assert_eq!(err.kind(), "UnknownElement");
    }

    #[test]
    fn test_names_sorted() {
        let registry = costing_registry();
        let names = registry.names();
        assert_eq!(names.len(), 4);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_duplicate_name_rejected_at_build() {
        let err = SelectorRegistry::builder("login")
            .css("submit", "button[type='submit']")
            .css("submit", "#submit")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidLocator");
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_invalid_expression_rejected_at_build() {
        let err = SelectorRegistry::builder("login")
            .css("broken", "div[aria-label=\"amount\"")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidLocator");
    }

    #[test]
    fn test_empty_name_rejected_at_build() {
        let err = SelectorRegistry::builder("login")
            .css("", "#ok")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidLocator");
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let registry = SelectorRegistry::builder("blank").build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.page(), "blank");
    }
}
