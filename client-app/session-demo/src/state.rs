use serde::{Deserialize, Serialize};

use session_core::SessionStorage;
use session_redis::RedisSessionStorage;
use session_shared::config::AppConfig;

/// What the demo keeps per visitor.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VisitData {
    pub visits: u64,
}

/// Flash values are plain messages.
pub type Sessions = SessionStorage<VisitData, String, RedisSessionStorage>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Sessions,
    pub config: AppConfig,
}
