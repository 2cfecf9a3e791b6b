use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use serde::Serialize;

use super::request_body;
use super::text_field;
use super::ApiError;
use super::ApiSuccess;
use super::ValidationErrors;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Session;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;

pub const INVALID_LOGIN: &str = "Invalid login data";
pub const ENTER_VALID_EMAIL: &str = "Enter a valid email";
pub const PASSWORD_REQUIRED: &str = "Password is required";

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let body = request_body(body)?;

    state
        .user_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

/// HTTP request body for login (raw JSON)
///
/// Fields are kept untyped so that a value of the wrong JSON type is
/// reported as that field's validation error.
#[derive(Clone, Default, Deserialize)]
pub struct LoginRequest {
    email: Option<Value>,
    password: Option<Value>,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ValidationErrors> {
        let email = text_field(self.email)
            .ok_or(EmailError::Missing)
            .and_then(|raw| EmailAddress::normalized(&raw));
        // presence only: strength rules apply at registration
        let password = text_field(self.password).map(Password::presented);

        match (email, password) {
            (Ok(email), Some(password)) => Ok(LoginCommand::new(email, password)),
            (email, password) => {
                let mut errors = ValidationErrors::new(INVALID_LOGIN);
                if let Err(e) = email {
                    tracing::debug!(reason = %e, "Login email rejected");
                    errors.push("email", ENTER_VALID_EMAIL);
                }
                if password.is_none() {
                    errors.push("password", PASSWORD_REQUIRED);
                }
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub token: String,
    pub user_id: String,
}

impl From<&Session> for LoginResponseData {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user_id: session.user_id.to_string(),
        }
    }
}
