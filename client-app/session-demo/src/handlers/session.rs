//! Session-backed handlers: visit counter, flash message, logout.

use axum::{
    extract::State,
    http::{header::COOKIE, HeaderMap},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use session_core::CookieOverrides;

use crate::response::{ApiFailure, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitResponse {
    pub visits: u64,
    pub flash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlashRequest {
    pub message: String,
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(COOKIE).and_then(|v| v.to_str().ok())
}

/// GET / - count the visit and hand out any pending flash message.
pub async fn visit(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiFailure> {
    let mut session = state.sessions.get_session(cookie_header(&headers)).await?;
    session.data_mut().visits += 1;
    let flash = session.take_flash();

    let set_cookie = state
        .sessions
        .commit_session(&session, &CookieOverrides::default())
        .await?;

    Ok(ApiResponse::success(VisitResponse {
        visits: session.data().visits,
        flash,
    })
    .with_cookie(set_cookie))
}

/// POST /flash - leave a message for the next visit.
pub async fn set_flash(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<FlashRequest>,
) -> Result<Response, ApiFailure> {
    let mut session = state.sessions.get_session(cookie_header(&headers)).await?;
    session.flash(payload.message);

    let set_cookie = state
        .sessions
        .commit_session(&session, &CookieOverrides::default())
        .await?;
    Ok(ApiResponse::success(()).with_cookie(set_cookie))
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiFailure> {
    let session = state.sessions.get_session(cookie_header(&headers)).await?;
    let set_cookie = state.sessions.destroy_session(&session).await?;
    if !session.is_new() {
        info!("Session {} destroyed", session.id());
    }
    Ok(ApiResponse::success(()).with_cookie(set_cookie))
}
