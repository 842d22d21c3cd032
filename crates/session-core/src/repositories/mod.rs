//! Session persistence traits (ports)

pub mod id_storage_strategy;

pub use id_storage_strategy::{SessionIdStorageStrategy, SessionValue};
