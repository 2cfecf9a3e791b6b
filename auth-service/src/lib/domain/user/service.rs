use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for registration and login.
///
/// Hashing and verification are CPU-bound and run on the blocking pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher and token signer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            tracing::info!(email = %command.email, "Registration rejected: email already exists");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(password.as_str()))
                .await??;

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        // the store's unique constraint catches registrations racing past the check above
        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::info!("Login rejected: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash = user.password_hash.clone();
        let user_id = user.id;
        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.as_str(), &password_hash, user_id)
        })
        .await?;

        match outcome {
            Ok(result) => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(Session {
                    user_id: user.id,
                    token: result.access_token,
                    expires_at: result.expires_at,
                })
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                Err(UserError::InvalidCredentials)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
