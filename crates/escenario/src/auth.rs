//! Login bootstrap.
//!
//! Suites authenticate once through the application's API instead of
//! driving the login form in every scenario: POST the credentials to the
//! authentication endpoint, forward selected fields from its JSON body to a
//! second-stage session-establishment endpoint, then seed the browser's
//! origin storage so the UI starts out logged in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::driver::Driver;
use crate::result::{EscenarioError, EscenarioResult};

/// Credentials used to parametrize login steps.
///
/// Never mutated after construction. `invalid` holds deliberately wrong
/// variants for negative scenarios (wrong password, unknown account).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account identifier (email, username)
    pub identifier: String,
    /// Account secret
    pub secret: String,
    /// Deliberately wrong variants for negative login scenarios
    #[serde(default)]
    pub invalid: Vec<Credentials>,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            invalid: Vec::new(),
        }
    }

    /// Attach an invalid variant
    #[must_use]
    pub fn with_invalid(mut self, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        self.invalid.push(Self::new(identifier, secret));
        self
    }

    /// The invalid variants, in declaration order
    #[must_use]
    pub fn invalid_variants(&self) -> &[Credentials] {
        &self.invalid
    }
}

/// Endpoints and field selection for the two-stage login bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginEndpoints {
    /// Authentication endpoint receiving the credentials
    pub auth_url: String,
    /// Second-stage session-establishment endpoint
    pub session_url: Option<String>,
    /// Fields from the auth response forwarded to the second stage and
    /// seeded into browser storage
    pub forward_fields: Vec<String>,
}

impl LoginEndpoints {
    /// Bootstrap against a single authentication endpoint
    #[must_use]
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            session_url: None,
            forward_fields: Vec::new(),
        }
    }

    /// Add the second-stage endpoint
    #[must_use]
    pub fn session_url(mut self, url: impl Into<String>) -> Self {
        self.session_url = Some(url.into());
        self
    }

    /// Select a response field to forward and seed
    #[must_use]
    pub fn forward(mut self, field: impl Into<String>) -> Self {
        self.forward_fields.push(field.into());
        self
    }
}

/// An established session: the token plus the forwarded profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Authorization token from the auth response
    pub token: String,
    /// Selected profile fields, stringified
    pub profile: Vec<(String, String)>,
}

impl AuthSession {
    /// Seed the browser session: the token plus every profile field goes
    /// into origin storage, where the application expects them.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable` from the storage boundary.
    pub fn seed(&self, driver: &mut dyn Driver) -> EscenarioResult<()> {
        driver.storage_set("token", &self.token)?;
        for (key, value) in &self.profile {
            driver.storage_set(key, value)?;
        }
        Ok(())
    }
}

/// Wire format of the credential POST body.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    secret: &'a str,
}

/// Extract the token and the selected profile fields from an auth response
/// body.
///
/// # Errors
///
/// Fails with [`EscenarioError::Login`] when the body carries no `token`
/// field or a selected field is missing.
pub fn parse_auth_response(body: &Value, forward_fields: &[String]) -> EscenarioResult<AuthSession> {
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| EscenarioError::Login {
            message: "auth response carries no 'token' field".to_string(),
        })?
        .to_string();

    let mut profile = Vec::with_capacity(forward_fields.len());
    for field in forward_fields {
        let value = body.get(field).ok_or_else(|| EscenarioError::Login {
            message: format!("auth response carries no '{field}' field"),
        })?;
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        profile.push((field.clone(), rendered));
    }
    Ok(AuthSession { token, profile })
}

/// HTTP client for the login bootstrap.
#[cfg(feature = "login")]
#[derive(Debug)]
pub struct LoginClient {
    http: reqwest::blocking::Client,
    endpoints: LoginEndpoints,
}

#[cfg(feature = "login")]
impl LoginClient {
    /// Create a client for the given endpoints.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(endpoints: LoginEndpoints) -> EscenarioResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { http, endpoints })
    }

    /// Run the two-stage bootstrap and return the established session.
    ///
    /// Stage one POSTs `{identifier, secret}` to the auth endpoint. Stage
    /// two, when configured, forwards the selected fields under a bearer
    /// token to the session endpoint.
    ///
    /// # Errors
    ///
    /// [`EscenarioError::Login`] on a non-success status or a malformed
    /// body; transport errors surface as `Http`.
    pub fn login(&self, credentials: &Credentials) -> EscenarioResult<AuthSession> {
        tracing::info!(identifier = %credentials.identifier, "running login bootstrap");
        let response = self
            .http
            .post(&self.endpoints.auth_url)
            .json(&LoginRequest {
                identifier: &credentials.identifier,
                secret: &credentials.secret,
            })
            .send()?;
        let status = response.status();
        let body: Value = response.json().map_err(|e| EscenarioError::Login {
            message: format!("auth response was not JSON: {e}"),
        })?;
        if !status.is_success() {
            return Err(EscenarioError::Login {
                message: format!("auth endpoint returned {status}: {body}"),
            });
        }

        let session = parse_auth_response(&body, &self.endpoints.forward_fields)?;

        if let Some(session_url) = &self.endpoints.session_url {
            let forwarded: serde_json::Map<String, Value> = session
                .profile
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            let second = self
                .http
                .post(session_url)
                .bearer_auth(&session.token)
                .json(&Value::Object(forwarded))
                .send()?;
            if !second.status().is_success() {
                return Err(EscenarioError::Login {
                    message: format!("session endpoint returned {}", second.status()),
                });
            }
        }

        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    mod credentials_tests {
        use super::*;

        #[test]
        fn test_new() {
            let credentials = Credentials::new("qa@example.com", "secret");
            assert_eq!(credentials.identifier, "qa@example.com");
            assert!(credentials.invalid_variants().is_empty());
        }

        #[test]
        fn test_invalid_variants() {
            let credentials = Credentials::new("qa@example.com", "secret")
                .with_invalid("qa@example.com", "wrong-password")
                .with_invalid("nobody@example.com", "secret");
            assert_eq!(credentials.invalid_variants().len(), 2);
            assert_eq!(credentials.invalid_variants()[0].secret, "wrong-password");
        }

        #[test]
        fn test_deserializes_without_invalid_field() {
            let credentials: Credentials = serde_json::from_value(serde_json::json!({
                "identifier": "qa@example.com",
                "secret": "pw"
            }))
            .unwrap();
            assert!(credentials.invalid_variants().is_empty());
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_token_and_profile_extracted() {
            let body = serde_json::json!({
                "token": "abc123",
                "username": "tester",
                "userId": 42,
                "expires": "2026-09-01"
            });
            let fields = vec!["username".to_string(), "userId".to_string()];
            let session = parse_auth_response(&body, &fields).unwrap();
            assert_eq!(session.token, "abc123");
            assert_eq!(session.profile[0], ("username".to_string(), "tester".to_string()));
            // Non-string fields are stringified, not dropped.
            assert_eq!(session.profile[1], ("userId".to_string(), "42".to_string()));
        }

        #[test]
        fn test_missing_token_fails() {
            let body = serde_json::json!({ "username": "tester" });
            let err = parse_auth_response(&body, &[]).unwrap_err();
            assert_eq!(err.kind(), "Login");
            assert!(err.to_string().contains("token"));
        }

        #[test]
        fn test_missing_forward_field_fails() {
            let body = serde_json::json!({ "token": "abc" });
            let err =
                parse_auth_response(&body, &["username".to_string()]).unwrap_err();
            assert!(err.to_string().contains("username"));
        }
    }

    mod seed_tests {
        use super::*;

        #[test]
        fn test_seed_writes_token_and_profile() {
            let session = AuthSession {
                token: "abc123".to_string(),
                profile: vec![
                    ("userName".to_string(), "tester".to_string()),
                    ("userID".to_string(), "42".to_string()),
                ],
            };
            let mut driver = MockDriver::new();
            session.seed(&mut driver).unwrap();
            let storage = driver.storage().unwrap();
            assert_eq!(storage.get("token").map(String::as_str), Some("abc123"));
            assert_eq!(storage.get("userName").map(String::as_str), Some("tester"));
            assert_eq!(storage.get("userID").map(String::as_str), Some("42"));
        }

        #[test]
        fn test_seed_surfaces_storage_unavailable() {
            let session = AuthSession {
                token: "abc".to_string(),
                profile: Vec::new(),
            };
            let mut driver = MockDriver::new().without_storage();
            let err = session.seed(&mut driver).unwrap_err();
            assert_eq!(err.kind(), "StorageUnavailable");
        }
    }

    mod endpoint_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let endpoints = LoginEndpoints::new("https://x.com/api/v1/core/email-login/")
                .session_url("https://x.com/rewards/dashboard/")
                .forward("username")
                .forward("expires");
            assert!(endpoints.session_url.is_some());
            assert_eq!(endpoints.forward_fields, vec!["username", "expires"]);
        }
    }
}
