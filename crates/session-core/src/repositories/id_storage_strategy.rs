//! Session id storage strategy (port)
//!
//! A strategy keeps session payloads server-side and hands out opaque ids;
//! only the id travels in the cookie.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::FlashSessionData;
use crate::error::SessionError;

/// Bounds every session data or flash type must satisfy.
pub trait SessionValue: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> SessionValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

#[async_trait]
pub trait SessionIdStorageStrategy<D, F = D>: Send + Sync
where
    D: SessionValue,
    F: SessionValue,
{
    /// Persist a new record and return its freshly generated id.
    async fn create_data(
        &self,
        data: &FlashSessionData<D, F>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<String, SessionError>;

    /// `Ok(None)` when the id is unknown or has expired.
    async fn read_data(&self, id: &str) -> Result<Option<FlashSessionData<D, F>>, SessionError>;

    /// Overwrite the record at `id`, creating it if it does not exist.
    async fn update_data(
        &self,
        id: &str,
        data: &FlashSessionData<D, F>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError>;

    /// Remove the record; unknown ids are not an error.
    async fn delete_data(&self, id: &str) -> Result<(), SessionError>;
}
