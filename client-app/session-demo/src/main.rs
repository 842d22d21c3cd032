use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use session_core::CookieOptions;
use session_redis::{create_redis_session_storage, RedisSessionConfig, RedisStoreOptions};
use session_shared::config::AppConfig;

mod handlers;
mod response;
mod state;

use handlers::{health, session};
use state::AppState;

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(session::visit))
        .route("/flash", post(session::set_flash))
        .route("/logout", post(session::logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    session_shared::telemetry::init_telemetry(&config.app.log_format);
    info!("{} starting ({})...", config.app.name, config.app.env);

    let sessions = create_redis_session_storage(RedisSessionConfig {
        cookie: CookieOptions::from(&config.session),
        options: RedisStoreOptions::with_config(config.redis.clone()),
    })
    .map_err(|e| {
        error!("Failed to set up session storage: {}", e);
        e
    })?;

    let state = AppState {
        sessions,
        config: config.clone(),
    };

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
