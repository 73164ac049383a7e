use crate::{
    api::response::{ApiError, ErrorBody, required, success},
    auth::{
        auth::{InstructorSession, bearer_token},
        jwt::{generate_session_token, verify_token},
        session::SessionStore,
    },
    config::Config,
    models::CardSwipeReq,
};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResponse {
    /// Bearer token for the unlocked session
    pub token: String,
    #[schema(example = "Bobby Reed")]
    pub instructor: String,
    #[schema(example = "2025-10-23T22:00:00Z", format = "date-time", value_type = String)]
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    #[schema(example = "Bobby Reed")]
    pub instructor: String,
    #[schema(example = "2025-10-23T14:00:00Z", format = "date-time", value_type = String)]
    pub authenticated_at: DateTime<Utc>,
    #[schema(example = "2025-10-23T22:00:00Z", format = "date-time", value_type = String)]
    pub expires_at: DateTime<Utc>,
}

/// Unlock the classroom pages with an instructor card swipe
#[utoipa::path(
    post,
    path = "/auth/card-swipe",
    request_body = CardSwipeReq,
    responses(
        (status = 200, description = "Card accepted", body = SwipeResponse),
        (status = 400, description = "Card data is required", body = ErrorBody),
        (status = 401, description = "Invalid instructor card", body = ErrorBody)
    ),
    tag = "Instructor"
)]
#[instrument(name = "card_swipe", skip_all)]
pub async fn card_swipe(
    payload: web::Json<CardSwipeReq>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let card_data =
        required(&payload.card_data).ok_or_else(|| ApiError::bad_request("Card data is required"))?;

    let Some((session_id, record)) = sessions.authenticate(card_data, Utc::now()).await else {
        // never log the raw track data
        warn!("Rejected card swipe");
        return Err(ApiError::Unauthorized("Invalid instructor card".to_string()));
    };

    let timeout = sessions.timeout();
    let token = generate_session_token(&session_id, &record, timeout, &config.jwt_secret)
        .map_err(|e| {
            error!(error = %e, "Failed to sign session token");
            ApiError::internal()
        })?;

    info!(session_id = %session_id, "Instructor authenticated");

    Ok(success(SwipeResponse {
        token,
        expires_at: record.expires_at(timeout),
        instructor: record.instructor,
    }))
}

/// Check whether the bearer token still unlocks the classroom
#[utoipa::path(
    get,
    path = "/auth/status",
    responses(
        (status = 200, description = "Session is live", body = SessionStatus),
        (status = 401, description = "Missing, invalid or expired session", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Instructor"
)]
pub async fn status(
    session: InstructorSession,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let record = session.record;
    Ok(success(SessionStatus {
        authenticated: record.authenticated,
        expires_at: record.expires_at(sessions.timeout()),
        authenticated_at: record.timestamp,
        instructor: record.instructor,
    }))
}

/// Lock the classroom again
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cleared (idempotent)", body = Object, example = json!({
            "success": true,
            "message": "Logged out"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Instructor"
)]
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    // succeeds even without a usable token
    if let Some(claims) = bearer_token(&req).and_then(|t| verify_token(t, &config.jwt_secret).ok())
    {
        sessions.logout(&claims.sid).await;
        info!(session_id = %claims.sid, "Instructor logged out");
    } else {
        debug!("Logout without a valid session token");
    }

    Ok(success(json!({ "message": "Logged out" })))
}
