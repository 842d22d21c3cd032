//! Session services

pub mod session_storage;

pub use session_storage::SessionStorage;
