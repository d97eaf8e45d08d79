//! Configuration types for the xMatters client.

use crate::auth::AuthMethod;
use crate::errors::{XMattersError, XMattersResult};
use std::time::Duration;

/// API root appended to every host. Pagination links come back anchored here.
pub const API_ROOT: &str = "/api/xm/1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("xmatters-rs/", env!("CARGO_PKG_VERSION"));

/// Default steady request rate.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 4.0;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub min_retry_delay: Duration,
    /// Upper bound for any single delay.
    pub max_retry_delay: Duration,
    /// Response statuses that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            min_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            retryable_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Builds a policy from whole-second delays.
    pub fn from_secs(max_retries: u32, min_retry_delay_secs: u64, max_retry_delay_secs: u64) -> Self {
        Self {
            max_retries,
            min_retry_delay: Duration::from_secs(min_retry_delay_secs),
            max_retry_delay: Duration::from_secs(max_retry_delay_secs),
            ..Default::default()
        }
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }
}

/// Rate limit configuration. Bursting is always disabled.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Steady request rate.
    pub requests_per_second: f64,
    /// Enable client-side throttling.
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            enabled: true,
        }
    }
}

impl RateLimitConfig {
    /// Throttle at the given rate.
    pub fn per_second(requests_per_second: f64) -> Self {
        Self {
            requests_per_second,
            enabled: true,
        }
    }
}

/// xMatters client configuration.
#[derive(Debug, Clone)]
pub struct XMattersConfig {
    /// Base URL including the API root, without a trailing slash.
    pub base_url: String,
    /// Authentication method.
    pub auth: Option<AuthMethod>,
    /// Extra headers sent with every request; they win over defaults.
    pub headers: Vec<(String, String)>,
    /// User-Agent header.
    pub user_agent: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Rate limit configuration.
    pub rate_limit: RateLimitConfig,
}

impl XMattersConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> XMattersConfigBuilder {
        XMattersConfigBuilder::new()
    }

    /// Reads hostname and credentials from the environment.
    ///
    /// Uses `XMATTERS_HOSTNAME` plus either `XMATTERS_TOKEN` or the
    /// `XMATTERS_USERNAME` / `XMATTERS_PASSWORD` pair.
    pub fn from_env() -> XMattersResult<Self> {
        let hostname = std::env::var("XMATTERS_HOSTNAME")
            .map_err(|_| XMattersError::configuration("XMATTERS_HOSTNAME not set"))?;

        let auth = match std::env::var("XMATTERS_TOKEN") {
            Ok(token) => AuthMethod::bearer(token),
            Err(_) => {
                let username = std::env::var("XMATTERS_USERNAME").map_err(|_| {
                    XMattersError::configuration("neither XMATTERS_TOKEN nor XMATTERS_USERNAME set")
                })?;
                let password = std::env::var("XMATTERS_PASSWORD")
                    .map_err(|_| XMattersError::configuration("XMATTERS_PASSWORD not set"))?;
                AuthMethod::basic(username, password)
            }
        };

        Self::builder().hostname(hostname).auth(auth).build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> XMattersResult<()> {
        if self.base_url.is_empty() {
            return Err(XMattersError::configuration("missing hostname"));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| XMattersError::configuration(format!("invalid base URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(XMattersError::configuration(
                "base URL must start with http:// or https://",
            ));
        }

        if self.auth.is_none() {
            return Err(XMattersError::configuration("authentication required"));
        }

        if self.rate_limit.enabled
            && !(self.rate_limit.requests_per_second.is_finite()
                && self.rate_limit.requests_per_second > 0.0)
        {
            return Err(XMattersError::configuration(
                "requests_per_second must be a positive number",
            ));
        }

        if self.retry.min_retry_delay > self.retry.max_retry_delay {
            return Err(XMattersError::configuration(
                "min_retry_delay must not exceed max_retry_delay",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(XMattersError::configuration("User-Agent must not be empty"));
        }

        Ok(())
    }
}

/// Builder for XMattersConfig.
#[derive(Debug, Default)]
pub struct XMattersConfigBuilder {
    base_url: Option<String>,
    auth: Option<AuthMethod>,
    headers: Vec<(String, String)>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    rate_limit: Option<RateLimitConfig>,
}

impl XMattersConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets `https://<hostname>/api/xm/1`.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        let hostname = hostname.trim_end_matches('/');
        self.base_url = Some(format!("https://{}{}", hostname, API_ROOT));
        self
    }

    /// Overrides the scheme and host; the API root is appended.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = Some(format!("{}{}", url.trim_end_matches('/'), API_ROOT));
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.retry = Some(RetryConfig::disabled());
        self
    }

    /// Sets the rate limit configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Disables client-side throttling.
    pub fn no_rate_limit(mut self) -> Self {
        self.rate_limit = Some(RateLimitConfig {
            enabled: false,
            ..Default::default()
        });
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> XMattersResult<XMattersConfig> {
        let config = XMattersConfig {
            base_url: self.base_url.unwrap_or_default(),
            auth: self.auth,
            headers: self.headers,
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            retry: self.retry.unwrap_or_default(),
            rate_limit: self.rate_limit.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_builds_base_url() {
        let config = XMattersConfig::builder()
            .hostname("acme.xmatters.com")
            .auth(AuthMethod::bearer("t"))
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://acme.xmatters.com/api/xm/1");
        assert_eq!(config.rate_limit.requests_per_second, 4.0);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_base_url_override() {
        let config = XMattersConfig::builder()
            .base_url("http://127.0.0.1:8080/")
            .auth(AuthMethod::bearer("t"))
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/xm/1");
    }

    #[test]
    fn test_missing_hostname() {
        let result = XMattersConfig::builder().auth(AuthMethod::bearer("t")).build();
        assert!(matches!(result, Err(XMattersError::Configuration(_))));
    }

    #[test]
    fn test_missing_auth() {
        let result = XMattersConfig::builder().hostname("acme.xmatters.com").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_rate() {
        let result = XMattersConfig::builder()
            .hostname("acme.xmatters.com")
            .auth(AuthMethod::bearer("t"))
            .rate_limit(RateLimitConfig::per_second(0.0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_retry_delays() {
        let result = XMattersConfig::builder()
            .hostname("acme.xmatters.com")
            .auth(AuthMethod::bearer("t"))
            .retry(RetryConfig::from_secs(3, 10, 2))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_headers_kept_in_order() {
        let config = XMattersConfig::builder()
            .hostname("acme.xmatters.com")
            .auth(AuthMethod::bearer("t"))
            .header("X-Trace", "1")
            .header("User-Agent", "custom/2.0")
            .build()
            .unwrap();

        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.headers[1].0, "User-Agent");
    }
}
