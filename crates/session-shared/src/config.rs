//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, DEFAULT_REDIS_MAX_CONNECTIONS, DEFAULT_REDIS_URL,
    DEFAULT_SAME_SITE, MAX_COOKIE_MAX_AGE_SECS,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub redis: RedisSettings,
    pub session: CookieSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// "json" or "pretty"
    pub log_format: String,
}

/// Connection parameters used to build a pooled Redis client.
#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            max_connections: DEFAULT_REDIS_MAX_CONNECTIONS,
        }
    }
}

/// Session cookie settings as they appear in configuration files.
#[derive(Debug, Deserialize, Clone)]
pub struct CookieSettings {
    pub cookie_name: String,
    pub path: String,
    #[serde(default)]
    pub domain: Option<String>,
    /// Cookie lifetime in seconds.
    #[serde(default)]
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: String,
    /// Signing secrets; the first one signs, all of them verify.
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            path: DEFAULT_COOKIE_PATH.to_string(),
            domain: None,
            max_age: None,
            http_only: true,
            secure: false,
            same_site: DEFAULT_SAME_SITE.to_string(),
            secrets: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/{APP_ENV}` and the environment
    /// (`REDIS__URL`, `SESSION__SECRETS=a,b`, ...).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("session.secrets")
                    .try_parsing(true),
            )
            .build()?;
        Self::finish(config)
    }

    /// Load from an in-memory TOML document layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = Self::builder()?
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Self::finish(config)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, AppError> {
        let redis = RedisSettings::default();
        let cookie = CookieSettings::default();
        Ok(Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "session-demo")?
            .set_default("app.log_format", "json")?
            .set_default("redis.url", redis.url)?
            .set_default("redis.max_connections", i64::from(redis.max_connections))?
            .set_default("session.cookie_name", cookie.cookie_name)?
            .set_default("session.path", cookie.path)?
            .set_default("session.http_only", cookie.http_only)?
            .set_default("session.secure", cookie.secure)?
            .set_default("session.same_site", cookie.same_site)?)
    }

    fn finish(config: Config) -> Result<Self, AppError> {
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.redis.max_connections == 0 {
            return Err(AppError::InvalidSetting(
                "redis.max_connections must be greater than zero".into(),
            ));
        }
        if self.redis.url.trim().is_empty() {
            return Err(AppError::InvalidSetting("redis.url must not be empty".into()));
        }

        let same_site = self.session.same_site.to_ascii_lowercase();
        if !matches!(same_site.as_str(), "lax" | "strict" | "none") {
            return Err(AppError::InvalidSetting(format!(
                "session.same_site must be lax, strict or none (got {})",
                self.session.same_site
            )));
        }
        if same_site == "none" && !self.session.secure {
            return Err(AppError::InvalidSetting(
                "session.same_site = none requires session.secure = true".into(),
            ));
        }
        if let Some(age) = self.session.max_age {
            if !(0..=MAX_COOKIE_MAX_AGE_SECS).contains(&age) {
                return Err(AppError::InvalidSetting(format!(
                    "session.max_age must be between 0 and {} seconds (got {})",
                    MAX_COOKIE_MAX_AGE_SECS, age
                )));
            }
        }
        if self.session.secrets.iter().any(|s| s.is_empty()) {
            return Err(AppError::InvalidSetting(
                "session.secrets must not contain empty values".into(),
            ));
        }
        Ok(())
    }
}
