//! Application-wide constants

pub const DEFAULT_COOKIE_NAME: &str = "__session";
pub const DEFAULT_COOKIE_PATH: &str = "/";
pub const DEFAULT_SAME_SITE: &str = "lax";
pub const SESSION_ID_BYTES: usize = 8;
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_REDIS_MAX_CONNECTIONS: u32 = 16;
/// Browsers cap cookie lifetimes at 400 days.
pub const MAX_COOKIE_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;
