use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::user::errors::UserError;

pub mod get_current_user;
pub mod login;
pub mod register;

pub const USER_CREATED: &str = "User created";
pub const EMAIL_ALREADY_EXISTS: &str = "User with this email already exists";
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";
pub const USER_NOT_FOUND: &str = "User not found";
pub const INTERNAL_ERROR: &str = "Something went wrong, please try again";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Body carrying a single human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors of a request, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
    pub message: String,
}

impl ValidationErrors {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            message: message.into(),
        }
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Carries the internal detail for logging; clients only see a generic message.
    InternalServerError(String),
    Validation(ValidationErrors),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        Self::BadRequest(INVALID_REQUEST_BODY.to_string())
    }
}

/// Unwrap a JSON request body.
///
/// Bodies sent without a JSON content type, or whose top level is not an
/// object, carry no fields and are left to field validation. Only bytes that
/// fail to parse as JSON are rejected outright.
fn request_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection @ JsonRejection::MissingJsonContentType(_))
        | Err(rejection @ JsonRejection::JsonDataError(_)) => {
            tracing::debug!(reason = %rejection.body_text(), "Request body has no usable fields");
            Ok(T::default())
        }
        Err(rejection) => Err(rejection.into()),
    }
}

/// Text of a request field. Absent, null and non-string values yield `None`.
fn text_field(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(MessageData::new(message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists(_) => {
                ApiError::BadRequest(EMAIL_ALREADY_EXISTS.to_string())
            }
            UserError::InvalidCredentials => ApiError::BadRequest(INVALID_CREDENTIALS.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(USER_NOT_FOUND.to_string()),
            // only raised for stored rows that no longer validate
            UserError::InvalidEmail(_)
            | UserError::Credential(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}
