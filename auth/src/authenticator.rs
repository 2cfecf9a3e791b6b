use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token
/// issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_lifetime: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
    /// When `access_token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with default hashing cost.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_lifetime` - Validity window of issued tokens
    pub fn new(jwt_secret: &[u8], token_lifetime: Duration) -> Self {
        Self::with_hasher(jwt_secret, token_lifetime, PasswordHasher::new())
    }

    /// Create an authenticator with a preconfigured password hasher.
    pub fn with_hasher(
        jwt_secret: &[u8],
        token_lifetime: Duration,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            token_lifetime,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password and issue a session token for `user_id`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: impl ToString,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(user_id)?)
    }

    /// Issue a session token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, user_id: impl ToString) -> Result<AuthenticationResult, JwtError> {
        let claims = Claims::for_user(user_id, self.token_lifetime);
        let access_token = self.jwt_handler.encode(&claims)?;
        let expires_at = claims
            .exp
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .ok_or_else(|| JwtError::EncodingFailed("Expiration out of range".to_string()))?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Token is malformed, forged or expired
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
