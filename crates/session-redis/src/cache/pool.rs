//! Pooled Redis client (deadpool-redis)

use async_trait::async_trait;
use deadpool_redis::{redis, Config, Pool, PoolConfig, Runtime};
use tracing::debug;

use session_core::SessionError;
use session_shared::config::RedisSettings;

use super::KeyValueStore;

/// Build a pool from connection parameters. No connection is opened until
/// the first command runs.
pub fn connect_pool(settings: &RedisSettings) -> Result<Pool, SessionError> {
    let mut config = Config::from_url(settings.url.clone());
    config.pool = Some(PoolConfig::new(settings.max_connections as usize));
    config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| SessionError::ConfigError(format!("Invalid Redis settings: {}", e)))
}

#[async_trait]
impl KeyValueStore for Pool {
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<(), SessionError> {
        let mut conn = Pool::get(self).await.map_err(SessionError::store)?;
        match ttl_secs {
            // Redis rejects `EX 0`; an already expired record is simply removed.
            Some(0) => {
                let _: i64 = redis::cmd("DEL")
                    .arg(key)
                    .query_async(&mut conn)
                    .await
                    .map_err(SessionError::store)?;
            }
            Some(ttl) => {
                let _: () = redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(ttl)
                    .query_async(&mut conn)
                    .await
                    .map_err(SessionError::store)?;
            }
            None => {
                let _: () = redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .query_async(&mut conn)
                    .await
                    .map_err(SessionError::store)?;
            }
        }
        debug!(key, ?ttl_secs, "SET via pool");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = Pool::get(self).await.map_err(SessionError::store)?;
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(SessionError::store)
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = Pool::get(self).await.map_err(SessionError::store)?;
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(SessionError::store)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_pool_is_lazy() {
        let settings = RedisSettings {
            url: "redis://127.0.0.1:1/".into(),
            max_connections: 3,
        };
        let pool = connect_pool(&settings).unwrap();
        assert_eq!(pool.status().max_size, 3);
        assert_eq!(pool.status().size, 0);
    }

    #[test]
    fn test_connect_pool_rejects_bad_url() {
        let settings = RedisSettings {
            url: "definitely not a url".into(),
            max_connections: 1,
        };
        assert!(matches!(
            connect_pool(&settings),
            Err(SessionError::ConfigError(_))
        ));
    }
}
