//! Session storage service: cookie handling on top of an id storage strategy.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::cookie::{expires_in, CookieOptions, CookieOverrides, SessionCookie};
use crate::domain::{FlashSessionData, Session};
use crate::error::SessionError;
use crate::repositories::{SessionIdStorageStrategy, SessionValue};

/// Reads sessions from request cookies and writes them back through `S`.
pub struct SessionStorage<D, F, S> {
    cookie: SessionCookie,
    strategy: Arc<S>,
    _payload: PhantomData<fn() -> (D, F)>,
}

impl<D, F, S> Clone for SessionStorage<D, F, S> {
    fn clone(&self) -> Self {
        Self {
            cookie: self.cookie.clone(),
            strategy: Arc::clone(&self.strategy),
            _payload: PhantomData,
        }
    }
}

impl<D, F, S> SessionStorage<D, F, S>
where
    D: SessionValue,
    F: SessionValue,
    S: SessionIdStorageStrategy<D, F>,
{
    pub fn new(cookie: CookieOptions, strategy: S) -> Self {
        Self::with_shared_strategy(cookie, Arc::new(strategy))
    }

    pub fn with_shared_strategy(cookie: CookieOptions, strategy: Arc<S>) -> Self {
        Self {
            cookie: SessionCookie::new(cookie),
            strategy,
            _payload: PhantomData,
        }
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    /// Direct access to the create/read/update/delete operations.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Load the session named by the `Cookie` header.
    ///
    /// A missing, unverifiable or unknown id yields a session with default
    /// data. An id whose record has expired keeps the id, so the next commit
    /// rewrites the same key.
    pub async fn get_session(&self, cookie_header: Option<&str>) -> Result<Session<D, F>, SessionError>
    where
        D: Default,
    {
        let id = self.cookie.parse(cookie_header).unwrap_or_default();
        if id.is_empty() {
            return Ok(Session::default());
        }

        let payload = self.strategy.read_data(&id).await?;
        if payload.is_none() {
            debug!("Session {} not found in store", id);
        }
        Ok(Session::new(id, payload.unwrap_or_default()))
    }

    /// Persist the session and return the `Set-Cookie` header value.
    pub async fn commit_session(
        &self,
        session: &Session<D, F>,
        overrides: &CookieOverrides,
    ) -> Result<String, SessionError> {
        let expires = match (overrides.max_age, overrides.expires) {
            (Some(seconds), _) => Some(expires_in(seconds)?),
            (None, Some(at)) => Some(at),
            (None, None) => self.cookie.expires()?,
        };

        let id = if session.is_new() {
            self.strategy.create_data(session.payload(), expires).await?
        } else {
            self.strategy
                .update_data(session.id(), session.payload(), expires)
                .await?;
            session.id().to_string()
        };

        self.cookie.serialize(&id, overrides)
    }

    /// Delete the stored record and return a `Set-Cookie` value that expires
    /// the browser cookie.
    pub async fn destroy_session(&self, session: &Session<D, F>) -> Result<String, SessionError> {
        if !session.is_new() {
            self.strategy.delete_data(session.id()).await?;
        }
        self.cookie.serialize_expired()
    }
}

impl<D, F, S> SessionStorage<D, F, S>
where
    D: SessionValue + Default,
    F: SessionValue,
    S: SessionIdStorageStrategy<D, F>,
{
    /// A fresh, unsaved session.
    pub fn new_session(&self) -> Session<D, F> {
        Session::new(String::new(), FlashSessionData::default())
    }
}
