//! Client configuration.
//!
//! Configuration is fixed when the adapter is built and never changes
//! afterwards, so a single client can be shared between tasks.

use std::time::Duration;

/// Default ABS2 QUBO solver host.
pub const DEFAULT_HOST: &str = "qubosolver.cs.hiroshima-u.ac.jp";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Connection settings for the ABS2 web API.
#[derive(Clone)]
pub struct Abs2Config {
    /// Hostname without scheme.
    pub host: String,
    /// API version segment (e.g. `v1`).
    pub api_version: String,
    /// Value sent in the `x-api-key` header.
    pub api_key: String,
    /// Verify the server's TLS certificate.
    pub ssl_verify: bool,
    /// Whole-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Connect timeout. `None` keeps the transport default.
    pub connect_timeout: Option<Duration>,
    /// Full base URL overriding `https://<host>/<version>/`.
    pub base_url: Option<String>,
}

impl std::fmt::Debug for Abs2Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abs2Config")
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field("api_key", &"[REDACTED]")
            .field("ssl_verify", &self.ssl_verify)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for Abs2Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: String::new(),
            ssl_verify: true,
            timeout: None,
            connect_timeout: None,
            base_url: None,
        }
    }
}

impl Abs2Config {
    /// Configuration for the public ABS2 service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `ABS2_HOST`, `ABS2_API_VERSION`, `ABS2_API_KEY`,
    /// `ABS2_SSL_VERIFY` and `ABS2_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup("ABS2_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(version) = lookup("ABS2_API_VERSION").filter(|v| !v.is_empty()) {
            config.api_version = version;
        }
        if let Some(key) = lookup("ABS2_API_KEY") {
            config.api_key = key;
        }
        if let Some(verify) = lookup("ABS2_SSL_VERIFY").and_then(|v| parse_bool(&v)) {
            config.ssl_verify = verify;
        }
        if let Some(secs) = lookup("ABS2_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }

    /// Set the hostname.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API version segment.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Set the whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Point the client at an explicit base URL (useful for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Base URL all endpoint paths are appended to; always ends with `/`.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => format!("{}/", url.trim_end_matches('/')),
            None => format!(
                "https://{}/{}/",
                self.host.trim_matches('/'),
                self.api_version.trim_matches('/')
            ),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
