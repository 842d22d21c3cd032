//! Session cookie: carries the session id between requests.

pub mod signing;

use std::sync::Once;

use chrono::{DateTime, Duration, Utc};
use cookie::Cookie;
use time::OffsetDateTime;
use tracing::warn;

pub use cookie::SameSite;

use session_shared::config::CookieSettings;
use session_shared::constants::{DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH};

use crate::error::SessionError;

static UNSIGNED_COOKIE_WARNING: Once = Once::new();

#[derive(Debug, Clone, PartialEq)]
pub struct CookieOptions {
    pub name: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    /// Lifetime in seconds; takes precedence over `expires`.
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// The first secret signs new cookies; every secret is tried when verifying.
    pub secrets: Vec<String>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: Some(DEFAULT_COOKIE_PATH.to_string()),
            domain: None,
            max_age: None,
            expires: None,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            secrets: Vec::new(),
        }
    }
}

impl CookieOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secrets = secrets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }
}

impl From<&CookieSettings> for CookieOptions {
    fn from(settings: &CookieSettings) -> Self {
        let same_site = match settings.same_site.to_ascii_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        };
        Self {
            name: settings.cookie_name.clone(),
            path: Some(settings.path.clone()),
            domain: settings.domain.clone(),
            max_age: settings.max_age,
            expires: None,
            http_only: settings.http_only,
            secure: settings.secure,
            same_site,
            secrets: settings.secrets.clone(),
        }
    }
}

/// Per-call overrides for `commit_session` / `destroy_session`.
#[derive(Debug, Clone, Default)]
pub struct CookieOverrides {
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
}

impl CookieOverrides {
    pub fn max_age(seconds: i64) -> Self {
        Self {
            max_age: Some(seconds),
            expires: None,
        }
    }

    pub fn expires(at: DateTime<Utc>) -> Self {
        Self {
            max_age: None,
            expires: Some(at),
        }
    }
}

/// `now + seconds`, or a cookie error when the result is not representable.
pub fn expires_in(seconds: i64) -> Result<DateTime<Utc>, SessionError> {
    Duration::try_seconds(seconds)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| SessionError::CookieError(format!("max_age {} is out of range", seconds)))
}

#[derive(Debug, Clone)]
pub struct SessionCookie {
    options: CookieOptions,
}

impl SessionCookie {
    pub fn new(options: CookieOptions) -> Self {
        if options.secrets.is_empty() {
            UNSIGNED_COOKIE_WARNING.call_once(|| {
                warn!(
                    "The \"{}\" cookie is not signed, but session cookies should be signed to prevent tampering on the client before they are sent back to the server",
                    options.name
                );
            });
        }
        Self { options }
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    pub fn is_signed(&self) -> bool {
        !self.options.secrets.is_empty()
    }

    /// Absolute expiry implied by the cookie's own options.
    pub fn expires(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
        match self.options.max_age {
            Some(seconds) => expires_in(seconds).map(Some),
            None => Ok(self.options.expires),
        }
    }

    /// Build a `Set-Cookie` header value carrying `value`.
    pub fn serialize(&self, value: &str, overrides: &CookieOverrides) -> Result<String, SessionError> {
        let max_age = overrides.max_age.or(self.options.max_age);
        let expires = overrides
            .expires
            .or(self.options.expires)
            .map(|at| OffsetDateTime::from_unix_timestamp(at.timestamp()))
            .transpose()
            .map_err(|e| SessionError::CookieError(e.to_string()))?;
        self.build(value, max_age, expires)
    }

    /// A cookie that tells the browser to forget the session immediately.
    pub fn serialize_expired(&self) -> Result<String, SessionError> {
        self.build("", None, Some(OffsetDateTime::UNIX_EPOCH))
    }

    /// Extract the session id from a `Cookie` request header.
    ///
    /// `None` when the header or cookie is missing, or when the value fails
    /// signature verification or decoding. A present but empty cookie yields
    /// `Some("")`.
    pub fn parse(&self, cookie_header: Option<&str>) -> Option<String> {
        let header = cookie_header?;
        let raw = Cookie::split_parse(header)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.options.name)
            .map(|c| c.value().to_string())?;

        if raw.is_empty() {
            return Some(String::new());
        }

        if self.is_signed() {
            self.options
                .secrets
                .iter()
                .find_map(|secret| signing::unsign(&raw, secret))
                .and_then(|unsigned| signing::decode_value(&unsigned))
        } else {
            signing::decode_value(&raw)
        }
    }

    fn encode(&self, value: &str) -> Result<String, SessionError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let encoded = signing::encode_value(value)?;
        match self.options.secrets.first() {
            Some(secret) => signing::sign(&encoded, secret),
            None => Ok(encoded),
        }
    }

    fn build(
        &self,
        value: &str,
        max_age: Option<i64>,
        expires: Option<OffsetDateTime>,
    ) -> Result<String, SessionError> {
        let mut builder = Cookie::build((self.options.name.clone(), self.encode(value)?))
            .http_only(self.options.http_only)
            .secure(self.options.secure)
            .same_site(self.options.same_site);

        if let Some(path) = &self.options.path {
            builder = builder.path(path.clone());
        }
        if let Some(domain) = &self.options.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(seconds) = max_age {
            builder = builder.max_age(time::Duration::seconds(seconds));
        }
        if let Some(at) = expires {
            builder = builder.expires(at);
        }

        Ok(builder.build().to_string())
    }
}
