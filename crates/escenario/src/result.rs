//! Result and error types for Escenario.

use thiserror::Error;

/// Result type for Escenario operations
pub type EscenarioResult<T> = Result<T, EscenarioError>;

/// Errors that can occur while running a scenario
#[derive(Debug, Error)]
pub enum EscenarioError {
    /// No element matched a locator
    #[error("No element matched locator '{selector}'")]
    ElementNotFound {
        /// The locator expression that failed to resolve
        selector: String,
    },

    /// A strict locator matched more than one element
    #[error("Locator '{selector}' matched {count} elements, expected exactly one")]
    AmbiguousMatch {
        /// The locator expression
        selector: String,
        /// Number of elements that matched
        count: usize,
    },

    /// An assertion step evaluated false
    #[error("Assertion failed: {message}")]
    AssertionFailure {
        /// Expected vs actual detail
        message: String,
    },

    /// No matching network exchange completed within the window
    #[error("Intercept '{alias}' timed out after {ms}ms")]
    InterceptTimeout {
        /// The alias that was awaited
        alias: String,
        /// The window that elapsed, in milliseconds
        ms: u64,
    },

    /// An alias was awaited without a live registration
    #[error("Intercept alias '{alias}' is not registered (or already consumed)")]
    UnknownAlias {
        /// The alias that was awaited
        alias: String,
    },

    /// An aggregation input could not be parsed after stripping
    #[error("Could not parse '{raw}' as a number")]
    ParseError {
        /// The offending raw string, before stripping
        raw: String,
    },

    /// The browser storage API could not be reached
    #[error("Browser storage unavailable: {message}")]
    StorageUnavailable {
        /// Error detail from the storage boundary
        message: String,
    },

    /// A registry entry failed suite-load validation
    #[error("Invalid locator '{name}': {message}")]
    InvalidLocator {
        /// Logical element name in the registry
        name: String,
        /// Validation detail
        message: String,
    },

    /// A logical element name has no registry entry
    #[error("No selector registered under '{name}'")]
    UnknownElement {
        /// The logical element name looked up
        name: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Error detail
        message: String,
    },

    /// The login bootstrap rejected the credentials or returned a bad body
    #[error("Login failed: {message}")]
    Login {
        /// Error detail
        message: String,
    },

    /// Operation called in the wrong state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error detail
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error from the login bootstrap client
    #[cfg(feature = "login")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EscenarioError {
    /// Short stable name for the error kind, used in failure reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound { .. } => "ElementNotFound",
            Self::AmbiguousMatch { .. } => "AmbiguousMatch",
            Self::AssertionFailure { .. } => "AssertionFailure",
            Self::InterceptTimeout { .. } => "InterceptTimeout",
            Self::UnknownAlias { .. } => "UnknownAlias",
            Self::ParseError { .. } => "ParseError",
            Self::StorageUnavailable { .. } => "StorageUnavailable",
            Self::InvalidLocator { .. } => "InvalidLocator",
            Self::UnknownElement { .. } => "UnknownElement",
            Self::Navigation { .. } => "Navigation",
            Self::Login { .. } => "Login",
            Self::InvalidState { .. } => "InvalidState",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            #[cfg(feature = "login")]
            Self::Http(_) => "Http",
        }
    }
}
