//! Abstract seam over the host browser-automation engine.
//!
//! The real DOM-query engine is an external collaborator. Everything the
//! runner needs from it is expressed by the [`Driver`] trait: resolve a
//! locator, act on the match, read back text/attributes, and reach the
//! origin-scoped key/value storage. Implementations are expected to perform
//! their own bounded implicit wait before surfacing a not-found error; the
//! runner never retries on top of that.
//!
//! [`MockDriver`] is an in-memory implementation for unit-testing suites
//! without a browser.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::locator::Locator;
use crate::result::{EscenarioError, EscenarioResult};

/// Default implicit wait for element resolution (5 seconds)
pub const DEFAULT_IMPLICIT_WAIT_MS: u64 = 5000;

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// A resolved DOM element, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Engine-assigned identifier
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Rendered text content
    pub text: String,
    /// Attribute map at resolution time
    pub attributes: HashMap<String, String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Read an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Configuration handed to a driver implementation at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Bounded implicit wait for element resolution
    pub implicit_wait: Duration,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            implicit_wait: Duration::from_millis(DEFAULT_IMPLICIT_WAIT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            user_agent: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the implicit wait for element resolution
    #[must_use]
    pub const fn implicit_wait(mut self, wait: Duration) -> Self {
        self.implicit_wait = wait;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set a user agent override
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

/// Abstract driver trait for browser automation.
///
/// Implementations bind the runner to a concrete engine (CDP, WebDriver, an
/// in-process fake). Resolution is strict: [`Driver::find`] must yield
/// exactly one element or fail with `ElementNotFound`/`AmbiguousMatch`;
/// [`Driver::find_all`] yields a well-defined ordered list, possibly empty.
pub trait Driver: Send {
    /// Navigate to a URL
    fn navigate(&mut self, url: &str) -> EscenarioResult<()>;

    /// Current page URL
    fn current_url(&self) -> EscenarioResult<String>;

    /// Reload the current page
    fn reload(&mut self) -> EscenarioResult<()>;

    /// Resolve a locator to exactly one element
    fn find(&self, locator: &Locator) -> EscenarioResult<ElementHandle>;

    /// Resolve a locator to all matching elements, in document order
    fn find_all(&self, locator: &Locator) -> EscenarioResult<Vec<ElementHandle>>;

    /// Click the single element matching the locator
    fn click(&mut self, locator: &Locator) -> EscenarioResult<()>;

    /// Type text into the single element matching the locator
    fn type_text(&mut self, locator: &Locator, text: &str) -> EscenarioResult<()>;

    /// Check or uncheck the single element matching the locator
    fn set_checked(&mut self, locator: &Locator, checked: bool) -> EscenarioResult<()>;

    /// Select an option value on the single element matching the locator
    fn select_option(&mut self, locator: &Locator, value: &str) -> EscenarioResult<()>;

    /// Scroll the single element matching the locator into view
    fn scroll_into_view(&mut self, locator: &Locator) -> EscenarioResult<()>;

    /// Read the text content of the single element matching the locator
    fn text_of(&self, locator: &Locator) -> EscenarioResult<String> {
        Ok(self.find(locator)?.text)
    }

    /// Read an attribute of the single element matching the locator
    fn attribute_of(&self, locator: &Locator, name: &str) -> EscenarioResult<Option<String>> {
        Ok(self
            .find(locator)?
            .attributes
            .get(name)
            .cloned())
    }

    /// All key/value pairs in the active origin's persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`EscenarioError::StorageUnavailable`] when the storage API
    /// cannot be reached (e.g. a cross-origin context).
    fn storage_snapshot(&self) -> EscenarioResult<BTreeMap<String, String>>;

    /// Write one key/value pair into the active origin's persisted storage
    fn storage_set(&mut self, key: &str, value: &str) -> EscenarioResult<()>;
}

/// In-memory driver for unit-testing suites without a browser.
///
/// Elements are installed under the exact locator expression that will be
/// used to query them; the mock does not interpret CSS or XPath.
#[derive(Debug, Default)]
pub struct MockDriver {
    url: String,
    elements: HashMap<String, Vec<ElementHandle>>,
    storage: Option<BTreeMap<String, String>>,
    calls: Vec<String>,
    next_id: u64,
}

impl MockDriver {
    /// Create a new mock driver with empty (but available) storage
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Some(BTreeMap::new()),
            ..Self::default()
        }
    }

    /// Install a single element under a locator expression
    #[must_use]
    pub fn with_element(mut self, expression: impl Into<String>, element: ElementHandle) -> Self {
        self.elements.entry(expression.into()).or_default().push(element);
        self
    }

    /// Install one `<td>` per text under a locator expression.
    ///
    /// Convenience for column-scrape scenarios (cost tables, hour totals).
    #[must_use]
    pub fn with_texts(mut self, expression: impl Into<String>, texts: &[&str]) -> Self {
        let expression = expression.into();
        for text in texts {
            self.next_id += 1;
            let handle = ElementHandle::new(format!("e{}", self.next_id), "td").with_text(*text);
            self.elements.entry(expression.clone()).or_default().push(handle);
        }
        self
    }

    /// Seed a storage key/value pair
    #[must_use]
    pub fn with_storage_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Make the storage API unavailable (simulates a cross-origin context)
    #[must_use]
    pub fn without_storage(mut self) -> Self {
        self.storage = None;
        self
    }

    /// Recorded interaction calls, in order
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Direct view of the mock's storage, if available
    #[must_use]
    pub fn storage(&self) -> Option<&BTreeMap<String, String>> {
        self.storage.as_ref()
    }

    /// Replace the element list under an expression (simulates a DOM update)
    pub fn set_elements(&mut self, expression: impl Into<String>, elements: Vec<ElementHandle>) {
        let _ = self.elements.insert(expression.into(), elements);
    }

    fn matches(&self, locator: &Locator) -> &[ElementHandle] {
        self.elements
            .get(locator.expression())
            .map_or(&[], Vec::as_slice)
    }

    fn find_one_mut(&mut self, locator: &Locator) -> EscenarioResult<&mut ElementHandle> {
        let selector = locator.expression().to_string();
        match self.elements.get_mut(&selector) {
            Some(matched) if matched.len() == 1 => Ok(&mut matched[0]),
            Some(matched) if !matched.is_empty() => Err(EscenarioError::AmbiguousMatch {
                selector,
                count: matched.len(),
            }),
            _ => Err(EscenarioError::ElementNotFound { selector }),
        }
    }
}

impl Driver for MockDriver {
    fn navigate(&mut self, url: &str) -> EscenarioResult<()> {
        self.calls.push(format!("navigate {url}"));
        self.url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> EscenarioResult<String> {
        Ok(self.url.clone())
    }

    fn reload(&mut self) -> EscenarioResult<()> {
        self.calls.push(format!("reload {}", self.url));
        Ok(())
    }

    fn find(&self, locator: &Locator) -> EscenarioResult<ElementHandle> {
        let matched = self.matches(locator);
        match matched.len() {
            0 => Err(EscenarioError::ElementNotFound {
                selector: locator.expression().to_string(),
            }),
            1 => Ok(matched[0].clone()),
            count => Err(EscenarioError::AmbiguousMatch {
                selector: locator.expression().to_string(),
                count,
            }),
        }
    }

    fn find_all(&self, locator: &Locator) -> EscenarioResult<Vec<ElementHandle>> {
        Ok(self.matches(locator).to_vec())
    }

    fn click(&mut self, locator: &Locator) -> EscenarioResult<()> {
        let _ = self.find_one_mut(locator)?;
        self.calls.push(format!("click {}", locator.expression()));
        Ok(())
    }

    fn type_text(&mut self, locator: &Locator, text: &str) -> EscenarioResult<()> {
        let element = self.find_one_mut(locator)?;
        let _ = element.attributes.insert("value".to_string(), text.to_string());
        self.calls.push(format!("type {} '{text}'", locator.expression()));
        Ok(())
    }

    fn set_checked(&mut self, locator: &Locator, checked: bool) -> EscenarioResult<()> {
        let element = self.find_one_mut(locator)?;
        let _ = element
            .attributes
            .insert("checked".to_string(), checked.to_string());
        self.calls.push(format!("set_checked {} {checked}", locator.expression()));
        Ok(())
    }

    fn select_option(&mut self, locator: &Locator, value: &str) -> EscenarioResult<()> {
        let element = self.find_one_mut(locator)?;
        let _ = element.attributes.insert("value".to_string(), value.to_string());
        self.calls.push(format!("select {} '{value}'", locator.expression()));
        Ok(())
    }

    fn scroll_into_view(&mut self, locator: &Locator) -> EscenarioResult<()> {
        let _ = self.find_one_mut(locator)?;
        self.calls.push(format!("scroll {}", locator.expression()));
        Ok(())
    }

    fn storage_snapshot(&self) -> EscenarioResult<BTreeMap<String, String>> {
        self.storage
            .clone()
            .ok_or_else(|| EscenarioError::StorageUnavailable {
                message: "storage API not reachable from this context".to_string(),
            })
    }

    fn storage_set(&mut self, key: &str, value: &str) -> EscenarioResult<()> {
        match self.storage.as_mut() {
            Some(storage) => {
                let _ = storage.insert(key.to_string(), value.to_string());
                Ok(())
            }
            None => Err(EscenarioError::StorageUnavailable {
                message: "storage API not reachable from this context".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let handle = ElementHandle::new("e1", "button")
                .with_text("Submit")
                .with_attribute("aria-label", "data-submit-btn");
            assert_eq!(handle.tag_name, "button");
            assert_eq!(handle.text, "Submit");
            assert_eq!(handle.attribute("aria-label"), Some("data-submit-btn"));
            assert_eq!(handle.attribute("missing"), None);
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.implicit_wait, Duration::from_millis(5000));
            assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        }

        #[test]
        fn test_builder_chain() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(1280, 720)
                .implicit_wait(Duration::from_secs(2))
                .user_agent("escenario-test");
            assert!(!config.headless);
            assert_eq!(config.viewport_width, 1280);
            assert_eq!(config.user_agent.as_deref(), Some("escenario-test"));
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[test]
        fn test_find_strict_single_match() {
            let driver = MockDriver::new().with_element(
                "#simple-tab-2019",
                ElementHandle::new("e1", "button").with_text("2019"),
            );
            let handle = driver.find(&Locator::css("#simple-tab-2019")).unwrap();
            assert_eq!(handle.text, "2019");
        }

        #[test]
        fn test_find_zero_matches_fails() {
            let driver = MockDriver::new();
            let err = driver.find(&Locator::css("#missing")).unwrap_err();
            assert_eq!(err.kind(), "ElementNotFound");
        }

        #[test]
        fn test_find_multiple_matches_fails_strict() {
            let driver = MockDriver::new().with_texts("td[aria-label=\"amount\"]", &["10", "20"]);
            let err = driver.find(&Locator::css("td[aria-label=\"amount\"]")).unwrap_err();
            assert_eq!(err.kind(), "AmbiguousMatch");
            assert!(err.to_string().contains('2'));
        }

        #[test]
        fn test_find_all_preserves_order() {
            let driver = MockDriver::new().with_texts("td", &["10", "20", "5"]);
            let texts: Vec<String> = driver
                .find_all(&Locator::css("td"))
                .unwrap()
                .into_iter()
                .map(|e| e.text)
                .collect();
            assert_eq!(texts, vec!["10", "20", "5"]);
        }

        #[test]
        fn test_find_all_empty_is_ok() {
            let driver = MockDriver::new();
            assert!(driver.find_all(&Locator::css("tr")).unwrap().is_empty());
        }

        #[test]
        fn test_type_text_sets_value() {
            let mut driver = MockDriver::new()
                .with_element("input#search", ElementHandle::new("e1", "input"));
            let locator = Locator::css("input#search");
            driver.type_text(&locator, "overhead").unwrap();
            assert_eq!(
                driver.find(&locator).unwrap().attribute("value"),
                Some("overhead")
            );
        }

        #[test]
        fn test_call_history_records_actions() {
            let mut driver = MockDriver::new()
                .with_element("button", ElementHandle::new("e1", "button"));
            driver.navigate("https://example.com/home/").unwrap();
            driver.click(&Locator::css("button")).unwrap();
            assert_eq!(driver.calls().len(), 2);
            assert!(driver.calls()[0].starts_with("navigate"));
            assert!(driver.calls()[1].starts_with("click"));
        }

        #[test]
        fn test_storage_roundtrip() {
            let mut driver = MockDriver::new().with_storage_entry("token", "abc123");
            driver.storage_set("userName", "tester").unwrap();
            let snapshot = driver.storage_snapshot().unwrap();
            assert_eq!(snapshot.get("token").map(String::as_str), Some("abc123"));
            assert_eq!(snapshot.get("userName").map(String::as_str), Some("tester"));
        }

        #[test]
        fn test_storage_unavailable_surfaces() {
            let driver = MockDriver::new().without_storage();
            let err = driver.storage_snapshot().unwrap_err();
            assert_eq!(err.kind(), "StorageUnavailable");
        }
    }
}
