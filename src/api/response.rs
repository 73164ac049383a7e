use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    error::{JsonPayloadError, QueryPayloadError},
    http::StatusCode,
};
use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

/// Every failure a handler can report. Rendered as
/// `{"success": false, "error": "<message>"}` with the matching status.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "Method not allowed")]
    MethodNotAllowed,
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    /// Details stay in the log, the client only sees a generic message.
    pub fn internal() -> Self {
        ApiError::Internal("Internal Server Error".to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.to_string(),
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Missing required fields")]
    pub error: String,
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

/// `200 {"success": true, ...payload}`
pub fn success<T: Serialize>(payload: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        payload,
    })
}

/// `201 {"success": true, ...payload}`
pub fn created<T: Serialize>(payload: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope {
        success: true,
        payload,
    })
}

/// CORS preflight short-circuit.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    ApiError::bad_request(format!("Invalid request body: {err}")).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected query string");
    ApiError::bad_request(format!("Invalid query string: {err}")).into()
}

/// Treats `None`, `""` and whitespace-only strings alike.
pub fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{Value, json};

    async fn body_json(resp: HttpResponse) -> Value {
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn success_flattens_payload_next_to_flag() {
        let resp = success(json!({ "total": 3, "registeredToday": 1 }));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({ "success": true, "total": 3, "registeredToday": 1 })
        );
    }

    #[actix_web::test]
    async fn errors_render_the_failure_envelope() {
        let resp = ApiError::conflict("Student already registered").error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(resp).await,
            json!({ "success": false, "error": "Student already registered" })
        );
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::internal().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::MethodNotAllowed.to_string(), "Method not allowed");
    }

    #[test]
    fn required_rejects_blank_values() {
        assert_eq!(required(&None), None);
        assert_eq!(required(&Some("   ".into())), None);
        assert_eq!(required(&Some(" Ada ".into())), Some("Ada"));
    }
}
