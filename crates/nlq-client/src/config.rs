//! Client configuration.

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

/// Default path prefix under which OData services are published.
pub const DEFAULT_SERVICE_ROOT: &str = "/sap/opu/odata/sap";

/// Default request timeout for source calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default request timeout for generation calls.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// OData source client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the source system (e.g., "https://erp.example.com:44300").
    pub base_url: String,

    /// Path prefix placed before `/{source}/{collection}`.
    pub service_root: String,

    /// Value sent in the `Host` header instead of the one derived from `base_url`.
    pub host_header: Option<String>,

    /// Basic-auth user name.
    pub username: Option<String>,

    /// Basic-auth password.
    pub password: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Create a configuration for a source system.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_root: DEFAULT_SERVICE_ROOT.to_string(),
            host_header: None,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Set the service root path.
    pub fn with_service_root(mut self, service_root: impl Into<String>) -> Self {
        self.service_root = service_root.into();
        self
    }

    /// Override the `Host` header.
    pub fn with_host_header(mut self, host: impl Into<String>) -> Self {
        self.host_header = Some(host.into());
        self
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// URL of the service root, with `service_root` appended to `base_url`.
    pub fn service_url(&self) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim())
            .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidConfig(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(self.service_root.split('/').filter(|s| !s.is_empty()));

        Ok(url)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("service_root", &self.service_root)
            .field("host_header", &self.host_header)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Gemini text generator configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key.
    pub api_key: String,

    /// Model name.
    pub model: String,

    /// API endpoint, without the `/models` suffix.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl GeminiConfig {
    /// Create a configuration with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            temperature: None,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new("https://erp.example.com");
        assert_eq!(config.service_root, DEFAULT_SERVICE_ROOT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.host_header.is_none());
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://10.0.0.5:44300")
            .with_service_root("/odata")
            .with_host_header("erp.internal")
            .with_credentials("alice", "secret")
            .with_timeout(Duration::from_secs(5))
            .with_accept_invalid_certs(true);

        assert_eq!(config.service_root, "/odata");
        assert_eq!(config.host_header.as_deref(), Some("erp.internal"));
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_service_url() {
        let config = ClientConfig::new("https://erp.example.com/");
        assert_eq!(
            config.service_url().unwrap().as_str(),
            "https://erp.example.com/sap/opu/odata/sap"
        );

        let bare = ClientConfig::new("http://localhost:8000").with_service_root("");
        assert_eq!(bare.service_url().unwrap().as_str(), "http://localhost:8000/");

        let prefixed = ClientConfig::new("http://gw/proxy/").with_service_root("odata/");
        assert_eq!(prefixed.service_url().unwrap().as_str(), "http://gw/proxy/odata");
    }

    #[test]
    fn test_service_url_rejects_bad_base() {
        for base in ["not a url", "mailto:ops@example.com"] {
            assert!(matches!(
                ClientConfig::new(base).service_url(),
                Err(ClientError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = ClientConfig::new("https://erp").with_credentials("alice", "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));

        let gemini = GeminiConfig::new("key-123");
        assert!(!format!("{:?}", gemini).contains("key-123"));
        assert_eq!(gemini.model, DEFAULT_GEMINI_MODEL);
    }
}
