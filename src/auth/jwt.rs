use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};

use crate::{
    auth::{card::INSTRUCTOR_CARD_PATTERN, session::AuthRecord},
    models::SessionClaims,
};

pub fn generate_session_token(
    session_id: &str,
    record: &AuthRecord,
    timeout: Duration,
    secret: &str,
) -> Result<String, Error> {
    let issued = record.timestamp.timestamp().max(0) as usize;
    let claims = SessionClaims {
        sub: INSTRUCTOR_CARD_PATTERN.to_string(),
        instructor: record.instructor.clone(),
        sid: session_id.to_string(),
        iat: issued,
        exp: issued + timeout.num_seconds().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, String> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
