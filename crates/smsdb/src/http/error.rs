use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use smsdbapp::error::SmsdbError;
use smsdbapp::validation::Violation;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub violations: Vec<Violation>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: "internal",
                message: message.into(),
                violations: Vec::new(),
            },
        }
    }
}

pub fn status_for(err: &SmsdbError) -> StatusCode {
    match err {
        SmsdbError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SmsdbError::NotFound { .. } | SmsdbError::UnknownEntity(_) => StatusCode::NOT_FOUND,
        SmsdbError::Conflict { .. } => StatusCode::CONFLICT,
        SmsdbError::UnsupportedOperation { .. } => StatusCode::METHOD_NOT_ALLOWED,
        SmsdbError::Storage(_)
        | SmsdbError::Io(_)
        | SmsdbError::Serialization(_)
        | SmsdbError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SmsdbError> for ApiError {
    fn from(err: SmsdbError) -> Self {
        let violations = err
            .violations()
            .map(|v| v.violations().to_vec())
            .unwrap_or_default();
        Self {
            status: status_for(&err),
            body: ErrorBody {
                error: err.kind(),
                message: err.to_string(),
                violations,
            },
        }
    }
}

/// A body axum could not parse as JSON is a validation failure of the body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody {
                error: "validation",
                message: format!("Validation failed: body: {}", message),
                violations: vec![Violation::new("body", message)],
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
