//! # Session Redis
//! 
//! Redis implementation of the session id storage strategy.
//!
//! ```rust,ignore
//! use session_core::CookieOptions;
//! use session_redis::{create_redis_session_storage, RedisSessionConfig, RedisStoreOptions};
//! use session_shared::RedisSettings;
//!
//! let storage = create_redis_session_storage::<UserData, String>(RedisSessionConfig {
//!     cookie: CookieOptions::default().with_secrets(["s3cret"]),
//!     options: RedisStoreOptions::with_config(RedisSettings::default()),
//! })?;
//! let session = storage.get_session(cookie_header).await?;
//! ```

pub mod cache;
pub mod session_id;
pub mod storage;
pub mod ttl;

pub use cache::{connect_pool, KeyValueStore, MemoryStore};
pub use session_id::generate_session_id;
pub use storage::{create_redis_session_storage, RedisSessionConfig, RedisSessionStorage, RedisStoreOptions};
pub use ttl::expires_to_seconds;
