//! Network intercept registry.
//!
//! A scenario declares `(method, URL pattern) -> alias` bindings before the
//! UI action that triggers the traffic, then blocks on the alias until a
//! matching request/response pair completes. Interception is purely
//! observational: the registry sees completed exchanges fed from the host
//! engine's event stream and never blocks or alters the request itself.
//!
//! Ordering matters: registration must precede the triggering action. An
//! exchange observed before its alias is registered is not buffered; late
//! registration misses it, exactly as the underlying event stream would.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::result::{EscenarioError, EscenarioResult};

/// Default window for waiting on an alias (5 seconds)
pub const DEFAULT_INTERCEPT_TIMEOUT_MS: u64 = 5000;

/// HTTP methods for exchange matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// HEAD request
    Head,
    /// OPTIONS request
    Options,
    /// Any method
    Any,
}

impl HttpMethod {
    /// Convert to the wire-format string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Any => "*",
        }
    }

    /// Check whether this method matches another, with `Any` as wildcard
    #[must_use]
    pub fn matches(&self, other: Self) -> bool {
        *self == Self::Any || other == Self::Any || *self == other
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            _ => Self::Any,
        })
    }
}

/// Pattern for matching exchange URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., `**/api/v1/costing/overheads/`)
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(s) | Self::Prefix(s) | Self::Contains(s) | Self::Regex(s) | Self::Glob(s) => {
                write!(f, "{s}")
            }
            Self::Any => write!(f, "*"),
        }
    }
}

/// Simple glob matching for URLs. `*` matches any run of characters.
fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.is_empty() {
        return url.is_empty();
    }

    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if let Some(found) = url[pos..].find(part) {
            if i == 0 && found != 0 {
                return false;
            }
            pos += found + part.len();
        } else {
            return false;
        }
    }

    pattern.ends_with('*') || pos == url.len()
}

/// A completed request/response pair observed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptedExchange {
    /// HTTP method of the request
    pub method: HttpMethod,
    /// Full request URL
    pub url: String,
    /// Response status code
    pub status: u16,
    /// Request body, if any
    pub request_body: Option<Vec<u8>>,
    /// Response body, if any
    pub response_body: Option<Vec<u8>>,
}

impl InterceptedExchange {
    /// Create a new exchange record
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>, status: u16) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            request_body: None,
            response_body: None,
        }
    }

    /// Attach the request body
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Attach the response body
    #[must_use]
    pub fn with_response_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Response body as UTF-8 text (lossy)
    #[must_use]
    pub fn response_text(&self) -> Option<String> {
        self.response_body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Decode the response body as JSON
    ///
    /// # Errors
    ///
    /// Fails with `InvalidState` when there is no body, or a JSON error
    /// when the body does not decode.
    pub fn response_json<T: for<'de> Deserialize<'de>>(&self) -> EscenarioResult<T> {
        let body = self
            .response_body
            .as_ref()
            .ok_or_else(|| EscenarioError::InvalidState {
                message: format!("exchange for {} has no response body", self.url),
            })?;
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode the request body as JSON
    ///
    /// # Errors
    ///
    /// Fails with `InvalidState` when there is no body, or a JSON error
    /// when the body does not decode.
    pub fn request_json<T: for<'de> Deserialize<'de>>(&self) -> EscenarioResult<T> {
        let body = self
            .request_body
            .as_ref()
            .ok_or_else(|| EscenarioError::InvalidState {
                message: format!("exchange for {} has no request body", self.url),
            })?;
        Ok(serde_json::from_slice(body)?)
    }
}

/// One armed alias binding.
#[derive(Debug)]
struct Registration {
    alias: String,
    method: HttpMethod,
    pattern: UrlPattern,
    resolved: Option<InterceptedExchange>,
}

#[derive(Debug, Default)]
struct State {
    registrations: Vec<Registration>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    cv: Condvar,
}

impl Inner {
    fn observe(&self, exchange: &InterceptedExchange) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        for registration in &mut state.registrations {
            if registration.resolved.is_none()
                && registration.method.matches(exchange.method)
                && registration.pattern.matches(&exchange.url)
            {
                registration.resolved = Some(exchange.clone());
                delivered += 1;
                trace!(alias = %registration.alias, url = %exchange.url, "exchange matched alias");
            }
        }
        if delivered > 0 {
            self.cv.notify_all();
        }
        delivered
    }
}

/// Cloneable handle for the engine's event thread to feed completed
/// exchanges into the registry.
#[derive(Debug, Clone)]
pub struct InterceptFeed {
    inner: Arc<Inner>,
}

impl InterceptFeed {
    /// Feed one completed exchange. Returns how many armed aliases it
    /// resolved (zero when nothing was waiting for it).
    pub fn observe(&self, exchange: InterceptedExchange) -> usize {
        self.inner.observe(&exchange)
    }
}

/// Declarative registry of `(method, pattern) -> alias` bindings with
/// blocking waits.
#[derive(Debug)]
pub struct InterceptRegistry {
    inner: Arc<Inner>,
    default_timeout: Duration,
}

impl Default for InterceptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptRegistry {
    /// Create an empty registry with the default wait window
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::default()),
            default_timeout: Duration::from_millis(DEFAULT_INTERCEPT_TIMEOUT_MS),
        }
    }

    /// Override the default wait window
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Declare that subsequent matching exchanges resolve `alias`.
    ///
    /// Must be called before the UI action that triggers the request.
    /// Re-registering an existing alias re-arms it and discards any
    /// undelivered exchange held for it.
    pub fn register(&self, method: HttpMethod, pattern: UrlPattern, alias: impl Into<String>) {
        let alias = alias.into();
        debug!(alias = %alias, method = method.as_str(), pattern = %pattern, "registering intercept");
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = state.registrations.iter_mut().find(|r| r.alias == alias) {
            existing.method = method;
            existing.pattern = pattern;
            existing.resolved = None;
        } else {
            state.registrations.push(Registration {
                alias,
                method,
                pattern,
                resolved: None,
            });
        }
    }

    /// Handle for feeding exchanges from the engine's event stream
    #[must_use]
    pub fn feed(&self) -> InterceptFeed {
        InterceptFeed {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Feed one completed exchange directly (same as going through
    /// [`InterceptRegistry::feed`]).
    pub fn observe(&self, exchange: InterceptedExchange) -> usize {
        self.inner.observe(&exchange)
    }

    /// Block until `alias` resolves, using the default window.
    ///
    /// # Errors
    ///
    /// See [`InterceptRegistry::wait_with_timeout`].
    pub fn wait(&self, alias: &str) -> EscenarioResult<InterceptedExchange> {
        self.wait_with_timeout(alias, self.default_timeout)
    }

    /// Block until an exchange matching `alias` completes, or the window
    /// elapses.
    ///
    /// The registration is consumed on delivery: waiting again without
    /// re-registering fails fast with `UnknownAlias` rather than hanging
    /// for a second exchange that may never come.
    ///
    /// # Errors
    ///
    /// `UnknownAlias` if the alias has no live registration;
    /// `InterceptTimeout` if nothing matched within the window.
    pub fn wait_with_timeout(
        &self,
        alias: &str,
        timeout: Duration,
    ) -> EscenarioResult<InterceptedExchange> {
        let deadline = Instant::now() + timeout;
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        loop {
            let index = state.registrations.iter().position(|r| r.alias == alias);
            let Some(index) = index else {
                return Err(EscenarioError::UnknownAlias {
                    alias: alias.to_string(),
                });
            };
            if state.registrations[index].resolved.is_some() {
                let registration = state.registrations.remove(index);
                debug!(alias = %alias, "intercept resolved");
                // resolved checked just above
                return registration
                    .resolved
                    .ok_or_else(|| EscenarioError::InvalidState {
                        message: format!("registration for '{alias}' lost its exchange"),
                    });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(EscenarioError::InterceptTimeout {
                    alias: alias.to_string(),
                    ms: timeout.as_millis() as u64,
                });
            }
            // Spurious wakeups and condvar timeouts both loop back through
            // the resolution and deadline checks.
            let (guard, _timed_out) = self
                .inner
                .cv
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// Aliases that are armed but not yet resolved
    #[must_use]
    pub fn pending_aliases(&self) -> Vec<String> {
        let state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state
            .registrations
            .iter()
            .filter(|r| r.resolved.is_none())
            .map(|r| r.alias.clone())
            .collect()
    }

    /// Drop every registration
    pub fn clear(&self) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.registrations.clear();
    }
}
