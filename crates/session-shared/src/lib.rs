//! # Session Shared
//! 
//! Shared configuration, constants, and telemetry for the session storage crates.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::{AppConfig, CookieSettings, RedisSettings};
pub use error::AppError;
