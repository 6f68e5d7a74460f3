//! Gateway configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use nlq_client::{ClientConfig, GeminiConfig, DEFAULT_GEMINI_MODEL, DEFAULT_SERVICE_ROOT};
use nlq_core::query::{DEFAULT_TENANT_PARAM, DEFAULT_TTL};
use nlq_core::{DispatcherConfig, RetryPolicy};

/// NLQ HTTP/JSON Gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "nlq-gateway")]
#[command(about = "HTTP/JSON gateway answering natural-language questions over OData sources")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, env = "NLQ_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Path to the JSON schema registry describing the sources.
    #[arg(short, long, env = "NLQ_REGISTRY")]
    pub registry: PathBuf,

    /// Base URL of the source system (scheme, host and port).
    #[arg(long, env = "NLQ_SOURCE_URL")]
    pub source_url: String,

    /// Path prefix under which services are published.
    #[arg(long, env = "NLQ_SERVICE_ROOT", default_value = DEFAULT_SERVICE_ROOT)]
    pub service_root: String,

    /// Host header to send instead of the one derived from the URL.
    #[arg(long, env = "NLQ_SOURCE_HOST")]
    pub source_host: Option<String>,

    /// Name of the tenant/client query parameter.
    #[arg(long, env = "NLQ_TENANT_PARAM", default_value = DEFAULT_TENANT_PARAM)]
    pub tenant_param: String,

    /// Tenant/client identifier sent with every request.
    #[arg(long, env = "NLQ_SOURCE_CLIENT")]
    pub tenant: Option<String>,

    /// Basic-auth user for the source system.
    #[arg(long, env = "NLQ_SOURCE_USERNAME")]
    pub source_username: Option<String>,

    /// Basic-auth password for the source system.
    #[arg(long, env = "NLQ_SOURCE_PASSWORD", hide_env_values = true)]
    pub source_password: Option<String>,

    /// Source request timeout (ms).
    #[arg(long, default_value_t = 30_000)]
    pub source_timeout_ms: u64,

    /// Skip TLS certificate verification for the source system.
    #[arg(long, env = "NLQ_INSECURE")]
    pub insecure: bool,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model used for planning.
    #[arg(long, env = "NLQ_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    /// Attempts per source call, the first one included.
    #[arg(long, default_value_t = 3)]
    pub retry_attempts: usize,

    /// Delay (ms) between attempts.
    #[arg(long, default_value_t = 2_000)]
    pub retry_delay_ms: u64,

    /// Lifetime (s) of cached results.
    #[arg(long, default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Reject plans naming sources or collections missing from the registry.
    #[arg(long, env = "NLQ_STRICT_PLAN")]
    pub strict_plan: bool,
}

/// Gateway configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Path to the schema registry.
    pub registry_path: PathBuf,
    /// Base URL of the source system.
    pub source_url: String,
    /// Service root path.
    pub service_root: String,
    /// Host header override.
    pub source_host: Option<String>,
    /// Tenant parameter name.
    pub tenant_param: String,
    /// Tenant parameter value.
    pub tenant: Option<String>,
    /// Basic-auth user.
    pub source_username: Option<String>,
    /// Basic-auth password.
    pub source_password: Option<String>,
    /// Source request timeout.
    pub source_timeout: Duration,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Gemini API key.
    pub gemini_api_key: String,
    /// Gemini model.
    pub model: String,
    /// Attempts per source call.
    pub retry_attempts: usize,
    /// Delay between attempts.
    pub retry_delay: Duration,
    /// Lifetime of cached results.
    pub cache_ttl: Duration,
    /// Validate plans against the registry.
    pub strict_plan: bool,
}

impl GatewayConfig {
    /// Source client configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.source_url)
            .with_service_root(&self.service_root)
            .with_timeout(self.source_timeout)
            .with_accept_invalid_certs(self.insecure);

        if let Some(host) = &self.source_host {
            config = config.with_host_header(host);
        }
        if let Some(username) = &self.source_username {
            config = config.with_credentials(
                username,
                self.source_password.clone().unwrap_or_default(),
            );
        }

        config
    }

    /// Text generator configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(&self.gemini_api_key).with_model(&self.model)
    }

    /// Dispatcher configuration.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        let retry = RetryPolicy::new()
            .with_max_attempts(self.retry_attempts)
            .with_delay(self.retry_delay);
        let config = DispatcherConfig::new().with_retry(retry);

        match &self.tenant {
            Some(tenant) => config.with_tenant(&self.tenant_param, tenant),
            None => config,
        }
    }
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            registry_path: args.registry.clone(),
            source_url: args.source_url.clone(),
            service_root: args.service_root.clone(),
            source_host: args.source_host.clone(),
            tenant_param: args.tenant_param.clone(),
            tenant: args.tenant.clone(),
            source_username: args.source_username.clone(),
            source_password: args.source_password.clone(),
            source_timeout: Duration::from_millis(args.source_timeout_ms),
            insecure: args.insecure,
            gemini_api_key: args.gemini_api_key.clone(),
            model: args.model.clone(),
            retry_attempts: args.retry_attempts,
            retry_delay: Duration::from_millis(args.retry_delay_ms),
            cache_ttl: Duration::from_secs(args.cache_ttl_secs),
            strict_plan: args.strict_plan,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            registry_path: PathBuf::from("registry.json"),
            source_url: "http://127.0.0.1:8000".to_string(),
            service_root: DEFAULT_SERVICE_ROOT.to_string(),
            source_host: None,
            tenant_param: DEFAULT_TENANT_PARAM.to_string(),
            tenant: None,
            source_username: None,
            source_password: None,
            source_timeout: Duration::from_secs(30),
            insecure: false,
            gemini_api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(2),
            cache_ttl: DEFAULT_TTL,
            strict_plan: false,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("registry_path", &self.registry_path)
            .field("source_url", &self.source_url)
            .field("service_root", &self.service_root)
            .field("source_host", &self.source_host)
            .field("tenant_param", &self.tenant_param)
            .field("tenant", &self.tenant)
            .field("source_username", &self.source_username)
            .field("source_timeout", &self.source_timeout)
            .field("insecure", &self.insecure)
            .field("model", &self.model)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("cache_ttl", &self.cache_ttl)
            .field("strict_plan", &self.strict_plan)
            .finish_non_exhaustive()
    }
}
