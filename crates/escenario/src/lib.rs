//! Escenario: a browser-driven test-scenario runner.
//!
//! Distilled from the patterns page-object E2E suites repeat endlessly:
//! selector tables, session save/restore around every test, declarative
//! network intercepts, and "total equals sum of rendered rows" assertions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Scenario Runner (arrange -> act -> assert, hooks, reports)      │
//! │     │                │                  │                        │
//! │  Page/Selector    Session Store     Intercept Registry           │
//! │  Registry            │                  │                        │
//! │     └────────────────┴──────────┬───────┘                        │
//! │                          Driver trait                            │
//! │              (host automation engine, external)                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host automation engine is an external collaborator behind the
//! [`Driver`] trait; [`MockDriver`] ships for testing suites without a
//! browser.
//!
//! # Example
//!
//! ```
//! use escenario::prelude::*;
//!
//! # fn main() -> EscenarioResult<()> {
//! let selectors = SelectorRegistry::builder("login")
//!     .css("submit", "button[type='submit']")
//!     .build()?;
//!
//! let driver = MockDriver::new()
//!     .with_element("button[type='submit']", ElementHandle::new("e1", "button"));
//! let ctx = ScenarioContext::new(Box::new(driver), SuiteConfig::new("https://example.com"));
//!
//! let scenario = Scenario::builder("submit goes through")
//!     .arrange("open login", |ctx| ctx.goto("/login/"))
//!     .act("submit", move |ctx| ctx.page(&selectors).click("submit"))
//!     .build()?;
//!
//! let mut runner = ScenarioRunner::new(ctx);
//! assert!(runner.run(scenario).passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Numeric aggregation over rendered text
pub mod aggregate;
/// General-purpose assertion checks
pub mod assertion;
/// Credentials and login bootstrap
pub mod auth;
/// Suite configuration
pub mod config;
/// Host automation engine seam
pub mod driver;
/// Network intercept registry
pub mod intercept;
/// Tagged Css/XPath locators
pub mod locator;
/// Interaction primitives
pub mod page;
/// Selector registry
pub mod registry;
/// Suite report rendering
pub mod reporter;
mod result;
/// Scenario runner
pub mod scenario;
/// Session persistence
pub mod session;

pub use aggregate::{aggregate, compare_approx, compare_truncated, sum, NumberFormat};
pub use assertion::Assertion;
#[cfg(feature = "login")]
pub use auth::LoginClient;
pub use auth::{parse_auth_response, AuthSession, Credentials, LoginEndpoints};
pub use config::SuiteConfig;
pub use driver::{
    Driver, DriverConfig, ElementHandle, MockDriver, DEFAULT_IMPLICIT_WAIT_MS,
    DEFAULT_NAVIGATION_TIMEOUT_MS,
};
pub use intercept::{
    HttpMethod, InterceptFeed, InterceptRegistry, InterceptedExchange, UrlPattern,
    DEFAULT_INTERCEPT_TIMEOUT_MS,
};
pub use locator::{Locator, QueryDialect};
pub use page::Page;
pub use registry::{SelectorRegistry, SelectorRegistryBuilder};
pub use reporter::{install_tracing, Reporter};
pub use result::{EscenarioError, EscenarioResult};
pub use scenario::{
    Phase, Scenario, ScenarioBuilder, ScenarioContext, ScenarioReport, ScenarioRunner,
    ScenarioState, StepFailure, SuiteReport,
};
pub use session::{SessionSnapshot, SessionStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::aggregate::*;
    pub use super::assertion::*;
    pub use super::auth::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::intercept::*;
    pub use super::locator::*;
    pub use super::page::*;
    pub use super::registry::*;
    pub use super::reporter::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::session::*;
}
