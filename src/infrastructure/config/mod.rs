use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Secrets shipped as local defaults; production refuses to start with them
pub const DEV_ACCESS_TOKEN_SECRET: &str = "dev-access-token-secret-change-me-0123456789";
pub const DEV_REFRESH_TOKEN_SECRET: &str = "dev-refresh-token-secret-change-me-0123456789";

/// Minimum accepted length of a JWT signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted access token lifetime: one day
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: u64 = 24 * 60;

/// Longest accepted refresh token lifetime: one year
pub const MAX_REFRESH_TOKEN_TTL_DAYS: u64 = 365;

/// Runtime mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Local,
    Production,
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("Invalid runtime mode: {s}. Valid values: local, production")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub mode: RuntimeMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins; `*` means any (local mode only)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Empty in local mode selects the in-memory repositories
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub issuer: String,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_minutes: u64,
    pub refresh_token_ttl_days: u64,
}

/// Object storage configuration for presigned uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom S3-compatible endpoint (`MinIO`, R2, ...)
    pub endpoint: Option<String>,
    /// Public base URL for reading uploaded objects (CDN)
    pub public_base_url: Option<String>,
    pub upload_url_ttl_seconds: u64,
    pub max_upload_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

/// Every problem found while validating a loaded configuration
#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration: {}", problems.join("; "))]
pub struct ConfigValidationError {
    pub problems: Vec<String>,
}

/// Failure to produce a usable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),
}

impl AppConfig {
    /// Load configuration based on runtime mode
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn load() -> Result<Self, ConfigLoadError> {
        // Detect runtime mode from environment (default: local)
        let mode = std::env::var("RUN_MODE")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<RuntimeMode>()
            .map_err(config::ConfigError::Message)?;

        Self::load_for_mode(mode)
    }

    /// Load and validate configuration for a specific runtime mode
    ///
    /// # Errors
    /// Returns an error if a source cannot be read, a value has the wrong type,
    /// or the resulting configuration fails validation
    pub fn load_for_mode(mode: RuntimeMode) -> Result<Self, ConfigLoadError> {
        // For local mode only, load .env.local file (if it exists) into the environment
        if mode == RuntimeMode::Local {
            dotenvy::from_filename(".env.local").ok();
        }

        // Environment variables override the defaults, e.g. TRAILS_AUTH__ACCESS_TOKEN_SECRET
        let settings = Self::defaults(mode)?
            .add_source(
                config::Environment::with_prefix("TRAILS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("storage.allowed_content_types")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Default values per runtime mode
    fn defaults(
        mode: RuntimeMode,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let (console_format, cors_origins, secrets) = match mode {
            RuntimeMode::Local => (
                "pretty",
                vec!["*"],
                Some((DEV_ACCESS_TOKEN_SECRET, DEV_REFRESH_TOKEN_SECRET)),
            ),
            RuntimeMode::Production => ("json", Vec::new(), None),
        };

        let mut builder = config::Config::builder()
            .set_default("mode", mode.to_string())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4000)?
            .set_default("server.max_body_bytes", 1_048_576)? // 1MB of JSON
            .set_default("server.request_timeout_seconds", 30)?
            .set_default("server.cors_origins", cors_origins)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 10)?
            .set_default("database.run_migrations", true)?
            .set_default("auth.issuer", "uae-trails")?
            .set_default("auth.access_token_ttl_minutes", 15)?
            .set_default("auth.refresh_token_ttl_days", 7)?
            .set_default("storage.bucket", "uae-trails-media")?
            .set_default("storage.region", "me-central-1")?
            .set_default("storage.endpoint", None::<String>)?
            .set_default("storage.public_base_url", None::<String>)?
            .set_default("storage.upload_url_ttl_seconds", 900)?
            .set_default("storage.max_upload_bytes", 10_485_760)? // 10MB
            .set_default(
                "storage.allowed_content_types",
                vec!["image/jpeg", "image/png", "image/webp", "application/pdf"],
            )?
            .set_default("logging.level", "info")?
            .set_default("logging.format", console_format)?;

        if let Some((access, refresh)) = secrets {
            builder = builder
                .set_default("auth.access_token_secret", access)?
                .set_default("auth.refresh_token_secret", refresh)?;
        }

        Ok(builder)
    }

    /// Check cross-field rules the type system cannot express
    ///
    /// # Errors
    /// Returns every violated rule at once so operators can fix them in one pass
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut problems = Vec::new();

        if self.server.port == 0 {
            problems.push("server.port must be non-zero".to_string());
        }
        if self.server.max_body_bytes == 0 {
            problems.push("server.max_body_bytes must be positive".to_string());
        }
        if self.server.request_timeout_seconds == 0 {
            problems.push("server.request_timeout_seconds must be positive".to_string());
        }
        if self.server.host.parse::<IpAddr>().is_err() {
            problems.push(format!("server.host '{}' is not an IP address", self.server.host));
        }

        if self.database.min_connections > self.database.max_connections {
            problems.push("database.min_connections exceeds database.max_connections".to_string());
        }
        if self.database.max_connections == 0 {
            problems.push("database.max_connections must be positive".to_string());
        }

        for (name, secret) in [
            ("auth.access_token_secret", &self.auth.access_token_secret),
            ("auth.refresh_token_secret", &self.auth.refresh_token_secret),
        ] {
            if secret.len() < MIN_SECRET_LEN {
                problems.push(format!("{name} must be at least {MIN_SECRET_LEN} bytes"));
            }
        }
        if self.auth.access_token_secret == self.auth.refresh_token_secret {
            problems.push("access and refresh token secrets must differ".to_string());
        }
        if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&self.auth.access_token_ttl_minutes) {
            problems.push(format!(
                "auth.access_token_ttl_minutes must be within 1..={MAX_ACCESS_TOKEN_TTL_MINUTES}"
            ));
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.auth.refresh_token_ttl_days) {
            problems.push(format!(
                "auth.refresh_token_ttl_days must be within 1..={MAX_REFRESH_TOKEN_TTL_DAYS}"
            ));
        }
        if self.auth.issuer.trim().is_empty() {
            problems.push("auth.issuer must not be empty".to_string());
        }

        if self.storage.bucket.trim().is_empty() {
            problems.push("storage.bucket must not be empty".to_string());
        }
        if self.storage.upload_url_ttl_seconds == 0 || self.storage.upload_url_ttl_seconds > 604_800
        {
            problems.push("storage.upload_url_ttl_seconds must be within 1..=604800".to_string());
        }
        if self.storage.max_upload_bytes == 0 {
            problems.push("storage.max_upload_bytes must be positive".to_string());
        }
        if self.storage.allowed_content_types.is_empty() {
            problems.push("storage.allowed_content_types must not be empty".to_string());
        }

        if self.mode == RuntimeMode::Production {
            if self.database.url.is_empty() {
                problems.push("database.url is required in production".to_string());
            }
            if self.auth.access_token_secret == DEV_ACCESS_TOKEN_SECRET
                || self.auth.refresh_token_secret == DEV_REFRESH_TOKEN_SECRET
            {
                problems.push("development token secrets are not allowed in production".to_string());
            }
            if self.server.cors_origins.iter().any(|origin| origin == "*") {
                problems.push("wildcard CORS origin is not allowed in production".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { problems })
        }
    }
}

impl ServerConfig {
    /// Get the socket address for binding
    ///
    /// # Errors
    /// Returns an error if `host` is not an IP address, which [`AppConfig::validate`] rules out
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        Ok(SocketAddr::new(self.host.parse::<IpAddr>()?, self.port))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl DatabaseConfig {
    /// Whether a real database is configured
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl StorageConfig {
    #[must_use]
    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_seconds)
    }

    /// Case-insensitive allow-list check, ignoring parameters such as `; charset=`
    #[must_use]
    pub fn is_allowed_content_type(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.allowed_content_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}
