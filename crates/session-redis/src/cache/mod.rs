//! Key-value store port and its implementations.

mod connection_manager;
mod memory;
mod pool;

use async_trait::async_trait;
use session_core::SessionError;

pub use memory::MemoryStore;
pub use pool::connect_pool;

/// The three store primitives session persistence needs.
///
/// A `ttl_secs` of `Some(0)` means the value is already expired.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<(), SessionError>;
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn del(&self, key: &str) -> Result<(), SessionError>;
}
