//! Multiplexed, auto-reconnecting Redis client

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use session_core::SessionError;

use super::KeyValueStore;

#[async_trait]
impl KeyValueStore for ConnectionManager {
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<(), SessionError> {
        if ttl_secs == Some(0) {
            return self.del(key).await;
        }
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl_secs {
            cmd.arg("EX").arg(ttl);
        }
        let mut conn = self.clone();
        let _: () = cmd.query_async(&mut conn).await.map_err(SessionError::store)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(SessionError::store)
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(SessionError::store)?;
        Ok(())
    }
}
