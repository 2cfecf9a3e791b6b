use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub const MISSING_TOKEN: &str = "Missing bearer token";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Extension type to store the authenticated user in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Middleware that validates session tokens and adds the user to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_TOKEN.to_string()))?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let user_id = claims
        .user_id()
        .ok_or("missing user id claim".to_string())
        .and_then(|id| UserId::from_string(id).map_err(|e| e.to_string()))
        .map_err(|reason| {
            tracing::warn!(%reason, "Token carries no usable user id");
            ApiError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
