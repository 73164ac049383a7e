use crate::{
    api::response::ApiError,
    auth::{jwt::verify_token, session::{AuthRecord, SessionStore}},
    config::Config,
};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::Utc;
use futures::future::LocalBoxFuture;

/// An unlocked instructor session, resolved from `Authorization: Bearer`.
pub struct InstructorSession {
    pub session_id: String,
    pub record: AuthRecord,
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequest for InstructorSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req).map(str::to_owned);
        let config = req.app_data::<Data<Config>>().cloned();
        let sessions = req.app_data::<Data<SessionStore>>().cloned();

        Box::pin(async move {
            let (Some(config), Some(sessions)) = (config, sessions) else {
                tracing::error!("Config or session store missing from app data");
                return Err(ApiError::internal().into());
            };

            let token = token.ok_or_else(|| {
                ApiError::Unauthorized("Missing Authorization header".to_string())
            })?;

            let claims = verify_token(&token, &config.jwt_secret).map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })?;

            let record = sessions
                .check(&claims.sid, Utc::now())
                .await
                .ok_or_else(|| ApiError::Unauthorized("Session expired".to_string()))?;

            Ok(InstructorSession {
                session_id: claims.sid,
                record,
            })
        })
    }
}
