use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::request_body;
use super::text_field;
use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use super::ValidationErrors;
use super::USER_CREATED;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;

pub const INVALID_REGISTRATION: &str = "Invalid registration data";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const PASSWORD_TOO_SHORT: &str = "Minimum password length is 8 characters";

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let body = request_body(body)?;

    state.user_service.register(body.try_into_command()?).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        MessageData::new(USER_CREATED),
    ))
}

/// HTTP request body for registration (raw JSON)
///
/// Fields are kept untyped so that a value of the wrong JSON type is
/// reported as that field's validation error.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterRequest {
    email: Option<Value>,
    password: Option<Value>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ValidationErrors> {
        let email = text_field(self.email)
            .ok_or(EmailError::Missing)
            .and_then(|raw| EmailAddress::normalized(&raw));
        let password = text_field(self.password)
            .ok_or(PasswordPolicyError::Missing)
            .and_then(Password::new);

        match (email, password) {
            (Ok(email), Ok(password)) => Ok(RegisterCommand::new(email, password)),
            (email, password) => {
                let mut errors = ValidationErrors::new(INVALID_REGISTRATION);
                if let Err(e) = email {
                    tracing::debug!(reason = %e, "Registration email rejected");
                    errors.push("email", INVALID_EMAIL);
                }
                if let Err(e) = password {
                    tracing::debug!(reason = %e, "Registration password rejected");
                    errors.push("password", PASSWORD_TOO_SHORT);
                }
                Err(errors)
            }
        }
    }
}
