use std::sync::Arc;

use thiserror::Error;

use crate::models::User;
use crate::storage::{CredentialStore, NewUser, StorageError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("username required")]
    UsernameRequired,

    #[error("password required")]
    PasswordRequired,

    #[error("username already exist")]
    UsernameTaken,

    #[error("user not found")]
    UserNotFound,

    #[error("authentication password not match")]
    PasswordMismatch,

    #[error("credential store failure: {0}")]
    Internal(String),
}

/// Authentication service over a credential store
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Register a new user, hashing the password before it is stored
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        is_officer: bool,
    ) -> Result<User, AuthError> {
        if username.is_empty() {
            return Err(AuthError::UsernameRequired);
        }
        if password.is_empty() {
            return Err(AuthError::PasswordRequired);
        }

        match self.store.user_by_username(username).await {
            Ok(_) => return Err(AuthError::UsernameTaken),
            Err(StorageError::NotFound) => {}
            Err(other) => return Err(AuthError::Internal(other.to_string())),
        }

        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                password: hashed,
                is_officer,
            })
            .await
            .map_err(|err| match err {
                // Someone registered the same username between the check and
                // the insert.
                StorageError::Conflict => AuthError::UsernameTaken,
                other => AuthError::Internal(other.to_string()),
            })?;

        Ok(user)
    }

    /// Verify credentials, returning the user on success
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() {
            return Err(AuthError::UsernameRequired);
        }
        if password.is_empty() {
            return Err(AuthError::PasswordRequired);
        }

        let user = self
            .store
            .user_by_username(username)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => AuthError::UserNotFound,
                other => AuthError::Internal(other.to_string()),
            })?;

        let matches =
            bcrypt::verify(password, &user.password).map_err(|e| AuthError::Internal(e.to_string()))?;
        if !matches {
            return Err(AuthError::PasswordMismatch);
        }

        Ok(user)
    }
}
