//! Interaction primitives bound to a page's selector registry.
//!
//! A [`Page`] pairs a driver with one [`SelectorRegistry`] so scenario
//! steps act on logical element names ("submit_button") instead of raw
//! selector strings. Each primitive is a thin pass-through: resolve the
//! name, hand the locator to the engine, surface whatever it reports.

use tracing::trace;

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::registry::SelectorRegistry;
use crate::result::EscenarioResult;

/// A page object: named selectors plus the driver to act through.
pub struct Page<'a> {
    driver: &'a mut dyn Driver,
    selectors: &'a SelectorRegistry,
}

impl<'a> Page<'a> {
    /// Bind a driver to a selector registry
    pub fn new(driver: &'a mut dyn Driver, selectors: &'a SelectorRegistry) -> Self {
        Self { driver, selectors }
    }

    /// The locator registered under a logical name
    pub fn locator(&self, name: &str) -> EscenarioResult<&Locator> {
        self.selectors.get(name)
    }

    /// Navigate to a URL
    pub fn goto(&mut self, url: &str) -> EscenarioResult<()> {
        trace!(page = self.selectors.page(), url, "goto");
        self.driver.navigate(url)
    }

    /// Current page URL
    pub fn url(&self) -> EscenarioResult<String> {
        self.driver.current_url()
    }

    /// Click the named element
    pub fn click(&mut self, name: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        trace!(page = self.selectors.page(), element = name, "click");
        self.driver.click(locator)
    }

    /// Type text into the named element
    pub fn type_text(&mut self, name: &str, text: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        trace!(page = self.selectors.page(), element = name, "type");
        self.driver.type_text(locator, text)
    }

    /// Check the named element
    pub fn check(&mut self, name: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        self.driver.set_checked(locator, true)
    }

    /// Uncheck the named element
    pub fn uncheck(&mut self, name: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        self.driver.set_checked(locator, false)
    }

    /// Select an option value on the named element
    pub fn select(&mut self, name: &str, value: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        self.driver.select_option(locator, value)
    }

    /// Scroll the named element into view
    pub fn scroll_to(&mut self, name: &str) -> EscenarioResult<()> {
        let locator = self.selectors.get(name)?;
        self.driver.scroll_into_view(locator)
    }

    /// Text content of the named element (strict single match)
    pub fn text(&self, name: &str) -> EscenarioResult<String> {
        let locator = self.selectors.get(name)?;
        self.driver.text_of(locator)
    }

    /// Text content of every element matching the named selector, in
    /// document order. Empty when nothing matches.
    pub fn texts(&self, name: &str) -> EscenarioResult<Vec<String>> {
        let locator = self.selectors.get(name)?;
        Ok(self
            .driver
            .find_all(locator)?
            .into_iter()
            .map(|e| e.text)
            .collect())
    }

    /// Attribute of the named element (strict single match)
    pub fn attribute(&self, name: &str, attribute: &str) -> EscenarioResult<Option<String>> {
        let locator = self.selectors.get(name)?;
        self.driver.attribute_of(locator, attribute)
    }

    /// Number of elements matching the named selector
    pub fn count(&self, name: &str) -> EscenarioResult<usize> {
        let locator = self.selectors.get(name)?;
        Ok(self.driver.find_all(locator)?.len())
    }

    /// Resolve the named element (strict single match)
    pub fn find(&self, name: &str) -> EscenarioResult<ElementHandle> {
        let locator = self.selectors.get(name)?;
        self.driver.find(locator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::registry::SelectorRegistry;

    fn costing_selectors() -> SelectorRegistry {
        SelectorRegistry::builder("costing")
            .css("tab_2019", "#simple-tab-2019")
            .css("overhead_amounts", "td[aria-label=\"amount\"]")
            .css("search_field", "input[name=\"searchValue\"]")
            .build()
            .unwrap()
    }

    fn driver() -> MockDriver {
        MockDriver::new()
            .with_element(
                "#simple-tab-2019",
                ElementHandle::new("e1", "button")
                    .with_text("2019")
                    .with_attribute("aria-selected", "false"),
            )
            .with_element("input[name=\"searchValue\"]", ElementHandle::new("e2", "input"))
            .with_texts("td[aria-label=\"amount\"]", &["1,200", "800", "50"])
    }

    #[test]
    fn test_click_resolves_through_registry() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let mut page = Page::new(&mut driver, &selectors);
        page.click("tab_2019").unwrap();
        assert_eq!(driver.calls(), ["click #simple-tab-2019"]);
    }

    #[test]
    fn test_unknown_name_fails_before_touching_driver() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let mut page = Page::new(&mut driver, &selectors);
        let err = page.click("no_such_element").unwrap_err();
        assert_eq!(err.kind(), "UnknownElement");
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_text_reads_single_element() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let page = Page::new(&mut driver, &selectors);
        assert_eq!(page.text("tab_2019").unwrap(), "2019");
    }

    #[test]
    fn test_texts_reads_whole_column() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let page = Page::new(&mut driver, &selectors);
        let texts = page.texts("overhead_amounts").unwrap();
        assert_eq!(texts, vec!["1,200", "800", "50"]);
    }

    #[test]
    fn test_count_matches() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let page = Page::new(&mut driver, &selectors);
        assert_eq!(page.count("overhead_amounts").unwrap(), 3);
        assert_eq!(page.count("search_field").unwrap(), 1);
    }

    #[test]
    fn test_attribute_read() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let page = Page::new(&mut driver, &selectors);
        assert_eq!(
            page.attribute("tab_2019", "aria-selected").unwrap().as_deref(),
            Some("false")
        );
        assert_eq!(page.attribute("tab_2019", "hidden").unwrap(), None);
    }

    #[test]
    fn test_type_text_then_read_back() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let mut page = Page::new(&mut driver, &selectors);
        page.type_text("search_field", "rent").unwrap();
        assert_eq!(
            page.attribute("search_field", "value").unwrap().as_deref(),
            Some("rent")
        );
    }

    #[test]
    fn test_goto_and_url() {
        let mut driver = driver();
        let selectors = costing_selectors();
        let mut page = Page::new(&mut driver, &selectors);
        page.goto("https://x.com/costing/").unwrap();
        assert_eq!(page.url().unwrap(), "https://x.com/costing/");
    }
}
