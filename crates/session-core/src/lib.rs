//! # Session Core
//! 
//! Session entities, the session id storage port, the session cookie, and the
//! `SessionStorage` service that ties them together for request handlers.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod cookie;
pub mod error;

pub use domain::*;
pub use cookie::{CookieOptions, CookieOverrides, SameSite, SessionCookie};
pub use error::SessionError;
pub use repositories::{SessionIdStorageStrategy, SessionValue};
pub use services::SessionStorage;
