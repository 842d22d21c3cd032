//! Redis-backed session id storage strategy.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use session_core::{
    CookieOptions, FlashSessionData, SessionError, SessionIdStorageStrategy, SessionStorage,
    SessionValue,
};
use session_shared::RedisSettings;

use crate::cache::{connect_pool, KeyValueStore};
use crate::session_id::generate_session_id;
use crate::ttl::expires_to_seconds;

/// Where the Redis client comes from. A supplied client always wins over
/// connection parameters.
#[derive(Clone, Default)]
pub struct RedisStoreOptions {
    pub redis_config: Option<RedisSettings>,
    pub redis_client: Option<Arc<dyn KeyValueStore>>,
}

impl RedisStoreOptions {
    pub fn with_client<C: KeyValueStore + 'static>(client: C) -> Self {
        Self::with_shared_client(Arc::new(client))
    }

    pub fn with_shared_client(client: Arc<dyn KeyValueStore>) -> Self {
        Self {
            redis_config: None,
            redis_client: Some(client),
        }
    }

    pub fn with_config(settings: RedisSettings) -> Self {
        Self {
            redis_config: Some(settings),
            redis_client: None,
        }
    }
}

impl fmt::Debug for RedisStoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStoreOptions")
            .field("redis_config", &self.redis_config.is_some())
            .field("redis_client", &self.redis_client.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedisSessionConfig {
    pub cookie: CookieOptions,
    pub options: RedisStoreOptions,
}

/// Stores each session as a JSON string under its id, with the Redis TTL
/// tracking the cookie expiry.
#[derive(Clone)]
pub struct RedisSessionStorage {
    store: Arc<dyn KeyValueStore>,
}

impl RedisSessionStorage {
    pub fn new(options: RedisStoreOptions) -> Result<Self, SessionError> {
        let store: Arc<dyn KeyValueStore> = match (options.redis_client, options.redis_config) {
            (Some(client), _) => {
                info!("Session storage using supplied Redis client");
                client
            }
            (None, Some(settings)) => {
                let pool = connect_pool(&settings)?;
                info!(
                    "Session storage using Redis pool (max {} connections)",
                    settings.max_connections
                );
                Arc::new(pool)
            }
            (None, None) => {
                return Err(SessionError::ConfigError(
                    "Need to provide either options.redis_config or options.redis_client".into(),
                ))
            }
        };
        Ok(Self { store })
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

impl fmt::Debug for RedisSessionStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSessionStorage").finish_non_exhaustive()
    }
}

#[async_trait]
impl<D, F> SessionIdStorageStrategy<D, F> for RedisSessionStorage
where
    D: SessionValue,
    F: SessionValue,
{
    async fn create_data(
        &self,
        data: &FlashSessionData<D, F>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<String, SessionError> {
        let id = generate_session_id();
        self.update_data(&id, data, expires).await?;
        Ok(id)
    }

    async fn read_data(&self, id: &str) -> Result<Option<FlashSessionData<D, F>>, SessionError> {
        match self.store.get(id).await? {
            Some(json) if !json.is_empty() => Ok(Some(serde_json::from_str(&json)?)),
            _ => {
                debug!("Session {} missing or expired", id);
                Ok(None)
            }
        }
    }

    async fn update_data(
        &self,
        id: &str,
        data: &FlashSessionData<D, F>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError> {
        let json = serde_json::to_string(data)?;
        let ttl = expires.map(|at| expires_to_seconds(at, Utc::now()));
        debug!("Writing session {} (ttl: {:?})", id, ttl);
        self.store.set(id, json, ttl).await
    }

    async fn delete_data(&self, id: &str) -> Result<(), SessionError> {
        debug!("Deleting session {}", id);
        self.store.del(id).await
    }
}

/// Build a cookie session storage whose records live in Redis.
pub fn create_redis_session_storage<D, F>(
    config: RedisSessionConfig,
) -> Result<SessionStorage<D, F, RedisSessionStorage>, SessionError>
where
    D: SessionValue,
    F: SessionValue,
{
    let strategy = RedisSessionStorage::new(config.options)?;
    Ok(SessionStorage::new(config.cookie, strategy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, MockKeyValueStore};
    use chrono::Duration;
    use serde::{Deserialize, Serialize};
    use session_core::CookieOverrides;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
    }

    type Payload = FlashSessionData<User, String>;

    fn strategy(mock: MockKeyValueStore) -> RedisSessionStorage {
        RedisSessionStorage::new(RedisStoreOptions::with_client(mock)).unwrap()
    }

    fn alice() -> Payload {
        FlashSessionData::new(User {
            name: "alice".into(),
        })
    }

    #[tokio::test]
    async fn test_create_sets_key_with_ttl() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .withf(|key, value, ttl| {
                key.len() == 16
                    && value == r#"{"data":{"name":"alice"}}"#
                    && matches!(ttl, Some(t) if (3599..=3600).contains(t))
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let storage = strategy(mock);
        let id = SessionIdStorageStrategy::<User, String>::create_data(
            &storage,
            &alice(),
            Some(Utc::now() + Duration::hours(1)),
        )
        .await
        .unwrap();
        assert_eq!(id.len(), 16);
    }

    #[tokio::test]
    async fn test_no_expiry_sets_without_ttl() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .withf(|key, _, ttl| key == "abc" && ttl.is_none())
            .times(1)
            .returning(|_, _, _| Ok(()));

        strategy(mock)
            .update_data("abc", &alice(), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_past_expiry_clamps_to_zero() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .withf(|_, _, ttl| *ttl == Some(0))
            .times(1)
            .returning(|_, _, _| Ok(()));

        strategy(mock)
            .update_data("abc", &alice(), Some(Utc::now() - Duration::minutes(5)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_and_malformed() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .withf(|key| key == "gone")
            .returning(|_| Ok(None));
        mock.expect_get()
            .withf(|key| key == "blank")
            .returning(|_| Ok(Some(String::new())));
        mock.expect_get()
            .withf(|key| key == "junk")
            .returning(|_| Ok(Some("not json".into())));
        mock.expect_get()
            .withf(|key| key == "ok")
            .returning(|_| Ok(Some(r#"{"data":{"name":"bob"},"flash":"hi"}"#.into())));

        let storage = strategy(mock);
        let missing: Option<Payload> = storage.read_data("gone").await.unwrap();
        assert!(missing.is_none());

        let blank: Option<Payload> = storage.read_data("blank").await.unwrap();
        assert!(blank.is_none());

        let malformed: Result<Option<Payload>, _> = storage.read_data("junk").await;
        assert!(matches!(malformed, Err(SessionError::SerializationError(_))));

        let found: Option<Payload> = storage.read_data("ok").await.unwrap();
        let found = found.unwrap();
        assert_eq!(found.data.name, "bob");
        assert_eq!(found.flash.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_del()
            .returning(|_| Err(SessionError::store("connection refused")));

        let result = SessionIdStorageStrategy::<User, String>::delete_data(&strategy(mock), "abc").await;
        assert!(matches!(result, Err(SessionError::StoreError(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        let memory = MemoryStore::new();
        let storage = RedisSessionStorage::new(RedisStoreOptions::with_client(memory.clone())).unwrap();

        SessionIdStorageStrategy::<User, String>::delete_data(&storage, "0123456789abcdef")
            .await
            .unwrap();
        let loaded: Option<Payload> = storage.read_data("0123456789abcdef").await.unwrap();
        assert!(loaded.is_none());
        assert!(memory.is_empty());
    }

    #[test]
    fn test_requires_client_or_config() {
        let err = RedisSessionStorage::new(RedisStoreOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::ConfigError(ref msg) if msg.contains("redis_config")));
    }

    #[test]
    fn test_client_wins_over_config() {
        let memory = MemoryStore::new();
        let options = RedisStoreOptions {
            redis_config: Some(RedisSettings {
                url: "not a url".into(),
                max_connections: 1,
            }),
            redis_client: Some(Arc::new(memory)),
        };
        assert!(RedisSessionStorage::new(options).is_ok());
    }

    #[tokio::test]
    async fn test_config_builds_lazy_pool() {
        let storage = RedisSessionStorage::new(RedisStoreOptions::with_config(RedisSettings::default()));
        assert!(storage.is_ok());
    }

    #[tokio::test]
    async fn test_round_trip_through_memory_store() {
        let memory = MemoryStore::new();
        let storage = RedisSessionStorage::new(RedisStoreOptions::with_client(memory.clone())).unwrap();

        let id = storage.create_data(&alice(), None).await.unwrap();
        let loaded: Option<Payload> = storage.read_data(&id).await.unwrap();
        assert_eq!(loaded, Some(alice()));

        let renamed = FlashSessionData::new(User { name: "carol".into() }).with_flash("moved".to_string());
        storage.update_data(&id, &renamed, None).await.unwrap();
        let loaded: Option<Payload> = storage.read_data(&id).await.unwrap();
        assert_eq!(loaded, Some(renamed));
        assert_eq!(memory.len(), 1);

        SessionIdStorageStrategy::<User, String>::delete_data(&storage, &id).await.unwrap();
        let loaded: Option<Payload> = storage.read_data(&id).await.unwrap();
        assert!(loaded.is_none());
        SessionIdStorageStrategy::<User, String>::delete_data(&storage, &id).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_expires_with_cookie() {
        let memory = MemoryStore::new();
        let sessions = create_redis_session_storage::<User, String>(RedisSessionConfig {
            cookie: CookieOptions::default().with_secrets(["s3cret"]).with_max_age(60),
            options: RedisStoreOptions::with_client(memory.clone()),
        })
        .unwrap();

        let mut session = sessions.new_session();
        session.data_mut().name = "dave".into();
        let set_cookie = sessions
            .commit_session(&session, &CookieOverrides::default())
            .await
            .unwrap();
        let header = set_cookie.split(';').next().unwrap().to_string();

        let loaded = sessions.get_session(Some(&header)).await.unwrap();
        assert_eq!(loaded.data().name, "dave");
        let ttl = memory.ttl(loaded.id()).unwrap().as_secs();
        assert!((59..=60).contains(&ttl));

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        let expired = sessions.get_session(Some(&header)).await.unwrap();
        assert_eq!(expired.id(), loaded.id());
        assert_eq!(expired.data(), &User::default());
    }
}
