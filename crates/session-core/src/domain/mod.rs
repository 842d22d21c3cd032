//! # Session Core - Domain Module
//! 
//! Session entities handed to request handlers and persisted by strategies.

pub mod session;

pub use session::{FlashSessionData, Session};
