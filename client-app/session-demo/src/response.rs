//! API Response wrapper

use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use session_core::SessionError;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// JSON body plus the `Set-Cookie` header produced by the session storage.
    pub fn with_cookie(self, set_cookie: String) -> Response {
        ([(SET_COOKIE, set_cookie)], Json(self)).into_response()
    }
}

/// Session failures surface as 500s; details stay in the logs.
#[derive(Debug)]
pub struct ApiFailure(pub SessionError);

impl From<SessionError> for ApiFailure {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        error!("Session storage failure: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("SESSION_ERROR", "Session storage unavailable")),
        )
            .into_response()
    }
}
