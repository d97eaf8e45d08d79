//! Authentication for the xMatters API.
//!
//! Two schemes are supported, one per client: HTTP basic auth with a
//! username/password pair, and bearer (OAuth) tokens. The header value is
//! computed once when the client is built and never refreshed.

use crate::errors::{XMattersError, XMattersResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

/// Authentication method for the xMatters API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// HTTP basic authentication.
    Basic {
        /// Login name.
        username: String,
        /// Password.
        password: SecretString,
    },
    /// OAuth bearer token.
    Bearer(SecretString),
}

impl AuthMethod {
    /// Creates a basic authentication method.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Creates a bearer token authentication method.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(SecretString::new(token.into()))
    }

    /// Scheme name, safe for logging.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "Basic",
            Self::Bearer(_) => "Bearer",
        }
    }
}

/// Produces the static `Authorization` header for a client.
#[derive(Debug, Clone)]
pub struct AuthManager {
    method: AuthMethod,
}

impl AuthManager {
    /// Creates a new authentication manager.
    pub fn new(method: AuthMethod) -> Self {
        Self { method }
    }

    /// Gets the authentication method.
    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// Builds the `Authorization` header value.
    pub fn auth_header(&self) -> XMattersResult<HeaderValue> {
        let raw = match &self.method {
            AuthMethod::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password.expose_secret());
                format!("Basic {}", STANDARD.encode(credentials))
            }
            AuthMethod::Bearer(token) => format!("Bearer {}", token.expose_secret()),
        };

        let mut value = HeaderValue::from_str(&raw).map_err(|_| {
            XMattersError::configuration("credentials contain characters not allowed in a header")
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}
