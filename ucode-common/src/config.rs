//! Configuration management for the uCode API gateway.
//!
//! The gateway reads one JSON document, by default `~/.ucode/gateway.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (UCODE_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `UCODE_CONFIG` → path of the configuration file
//! - `UCODE_HTTP_HOST` → http.host
//! - `UCODE_HTTP_PORT` → http.port
//! - `UCODE_MODE` → http.mode
//! - `UCODE_LOG_LEVEL` → observability.log_level
//! - `UCODE_AUTH_SERVICE` → auth_service
//! - `UCODE_COMPANY_SERVICE` → company_service
//! - `UCODE_REDIS_URL` → redis.url
//! - `UCODE_N8N_TOKEN` → n8n.api_token
//! - `UCODE_MINIO_ACCESS_KEY` → minio.access_key
//! - `UCODE_MINIO_SECRET_KEY` → minio.secret_key

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Placeholder written over secrets in [`Config::redacted`].
pub const REDACTED: &str = "***";

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".ucode"),
        |dirs| dirs.home_dir().join(".ucode"),
    )
}

/// Get the configuration file path, honouring `UCODE_CONFIG`.
pub fn config_path() -> PathBuf {
    std::env::var("UCODE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("gateway.json"))
}

// ============================================================================
// Run mode
// ============================================================================

/// Gateway run mode. Controls what `GET /config` exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Debug,
    Test,
    Release,
}

impl RunMode {
    /// Parse a run mode label; unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "test" => Some(Self::Test),
            "release" => Some(Self::Release),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Test => "test",
            Self::Release => "release",
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP listener and request defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Run mode label (`debug`, `test`, `release`).
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Default page size when `limit` is absent.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Default offset when `offset` is absent.
    #[serde(default)]
    pub default_offset: u32,

    /// How long the sleep test hook blocks its request.
    #[serde(default = "default_sleep_secs")]
    pub sleep_secs: u64,

    /// Maximum accepted request body size.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: default_mode(),
            default_limit: default_limit(),
            default_offset: 0,
            sleep_secs: default_sleep_secs(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8001
}

fn default_mode() -> String {
    "debug".into()
}

fn default_limit() -> u32 {
    10
}

fn default_sleep_secs() -> u64 {
    60
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

// ============================================================================
// gRPC
// ============================================================================

/// Timeouts applied to every downstream gRPC channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Endpoints of one backend bundle.
///
/// The bundle registered under [`Config::default_namespace`] is the shared
/// pool; every other entry is keyed by the enterprise project id it serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceNodeConfig {
    /// Namespace key (shared namespace label or enterprise project id).
    pub namespace: String,
    pub object_builder: String,
    pub go_object_builder: String,
    /// Dedicated object-builder for enterprise node types; falls back to
    /// `object_builder` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_object_builder: Option<String>,
    pub versioning: String,
    pub api_reference: String,
    pub query: String,
    pub scenario: String,
    pub chat: String,
    pub transcoder: String,
    pub sms: String,
}

impl ServiceNodeConfig {
    /// All required endpoints, paired with their field names.
    pub fn endpoints(&self) -> [(&'static str, &str); 9] {
        [
            ("object_builder", self.object_builder.as_str()),
            ("go_object_builder", self.go_object_builder.as_str()),
            ("versioning", self.versioning.as_str()),
            ("api_reference", self.api_reference.as_str()),
            ("query", self.query.as_str()),
            ("scenario", self.scenario.as_str()),
            ("chat", self.chat.as_str()),
            ("transcoder", self.transcoder.as_str()),
            ("sms", self.sms.as_str()),
        ]
    }
}

// ============================================================================
// Redis / MinIO / N8N
// ============================================================================

/// Redis cache bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (redis://[:password@]host:port/db). Empty keeps the cache in
    /// process memory.
    #[serde(default)]
    pub url: String,

    /// Realm segment of every key.
    #[serde(default = "default_realm")]
    pub realm: String,

    /// TTL applied to cache-endpoint writes when the client sends none.
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            realm: default_realm(),
            default_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_realm() -> String {
    "u-code".into()
}

fn default_cache_ttl() -> u64 {
    3600
}

/// MinIO (S3-compatible) object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    /// Host[:port] without scheme; also used to build transcoder stream URLs.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_true")]
    pub secure: bool,
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: default_region(),
            secure: true,
        }
    }
}

fn default_region() -> String {
    "us-east-1".into()
}

/// N8N workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct N8nConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_n8n_timeout")]
    pub timeout_secs: u64,
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: default_n8n_timeout(),
        }
    }
}

fn default_n8n_timeout() -> u64 {
    30
}

// ============================================================================
// Gateway internals
// ============================================================================

/// Version-history worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Bounded queue size; entries beyond it are dropped with a warning.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

/// Service-resource resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// TTL of cached service resources; 0 disables the cache.
    #[serde(default)]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 0,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    10_000
}

/// Trust policy for the delegated (`redirect` + `auth` header) path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Peer IP addresses allowed to present delegated auth. Empty = any peer.
    #[serde(default)]
    pub trusted_peers: Vec<String>,
}

impl Default for DelegationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trusted_peers: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `json` or `pretty`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "u-code".into()
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub grpc: GrpcConfig,

    /// Auth service endpoint (shared by every namespace).
    #[serde(default)]
    pub auth_service: String,

    /// Company service endpoint (shared by every namespace).
    #[serde(default)]
    pub company_service: String,

    /// Namespace of the shared backend pool.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    #[serde(default)]
    pub service_nodes: Vec<ServiceNodeConfig>,

    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub minio: MinioConfig,

    #[serde(default)]
    pub n8n: N8nConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Delegated-auth trust policy.
    #[serde(default)]
    pub auth: DelegationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            grpc: GrpcConfig::default(),
            auth_service: String::new(),
            company_service: String::new(),
            default_namespace: default_namespace(),
            service_nodes: Vec::new(),
            redis: RedisConfig::default(),
            minio: MinioConfig::default(),
            n8n: N8nConfig::default(),
            history: HistoryConfig::default(),
            resolver: ResolverConfig::default(),
            auth: DelegationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("reading config from {}", path.display()))?;

        serde_json::from_str(&content).context(format!("parsing config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides applied.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("UCODE_HTTP_HOST") {
            self.http.host = host;
        }
        if let Ok(port) = std::env::var("UCODE_HTTP_PORT") {
            if let Ok(p) = port.parse() {
                self.http.port = p;
            }
        }
        if let Ok(mode) = std::env::var("UCODE_MODE") {
            self.http.mode = mode;
        }
        if let Ok(level) = std::env::var("UCODE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(addr) = std::env::var("UCODE_AUTH_SERVICE") {
            self.auth_service = addr;
        }
        if let Ok(addr) = std::env::var("UCODE_COMPANY_SERVICE") {
            self.company_service = addr;
        }
        if let Ok(url) = std::env::var("UCODE_REDIS_URL") {
            self.redis.url = url;
        }
        if let Ok(token) = std::env::var("UCODE_N8N_TOKEN") {
            self.n8n.api_token = token;
        }
        if let Ok(key) = std::env::var("UCODE_MINIO_ACCESS_KEY") {
            self.minio.access_key = key;
        }
        if let Ok(secret) = std::env::var("UCODE_MINIO_SECRET_KEY") {
            self.minio.secret_key = secret;
        }
    }

    /// Parsed run mode, `None` when `http.mode` is not a known label.
    pub fn run_mode(&self) -> Option<RunMode> {
        RunMode::parse(&self.http.mode)
    }

    /// `host:port` the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    /// Endpoints registered for a namespace.
    pub fn service_node(&self, namespace: &str) -> Option<&ServiceNodeConfig> {
        self.service_nodes.iter().find(|n| n.namespace == namespace)
    }

    /// Copy of the configuration with every secret replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.minio.secret_key.is_empty() {
            copy.minio.secret_key = REDACTED.into();
        }
        if !copy.n8n.api_token.is_empty() {
            copy.n8n.api_token = REDACTED.into();
        }
        copy.redis.url = redact_url_password(&copy.redis.url);
        copy
    }
}

fn redact_url_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(REDACTED)).is_err() {
                return REDACTED.into();
            }
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}
