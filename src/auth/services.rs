use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    dto::CredentialsRequest,
    error::AuthError,
    password::PasswordHasher,
    repo_types::UserRecord,
    validation::{self, ValidCredentials},
};
use crate::storage::UserStore;

/// Registers and authenticates username/password pairs against a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Creates a user. Fails with `DuplicateUser` if the name is taken.
    pub async fn register(&self, candidate: &CredentialsRequest) -> Result<(), AuthError> {
        let creds = validate(candidate).map_err(|errors| {
            warn!(violations = errors.len(), "registration input rejected");
            AuthError::Validation(errors)
        })?;
        let username = creds.username();

        if self.store.exists(username).await? {
            warn!(username = %username, "username already registered");
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = self.hash(creds.password()).await?;
        let record = UserRecord::new(username, password_hash);

        // the exists check above is only a fast path; this write decides
        if !self.store.put_if_absent(username, &record).await? {
            warn!(username = %username, "lost registration race");
            return Err(AuthError::DuplicateUser);
        }

        info!(username = %username, "user registered");
        Ok(())
    }

    /// Returns whether the pair matches a stored user.
    ///
    /// Malformed input, unknown users and wrong passwords all yield `false`.
    pub async fn authenticate(&self, candidate: &CredentialsRequest) -> Result<bool, AuthError> {
        let Ok(creds) = validate(candidate) else {
            debug!("login input failed validation");
            return Ok(false);
        };

        let Some(record) = self.store.get(creds.username()).await? else {
            debug!(username = %creds.username(), "login for unknown user");
            return Ok(false);
        };

        let ok = self.verify(record.password_hash, creds.password()).await?;
        if !ok {
            debug!(username = %creds.username(), "login with wrong password");
        }
        Ok(ok)
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    async fn verify(&self, hash: String, password: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

fn validate(
    candidate: &CredentialsRequest,
) -> Result<ValidCredentials, Vec<validation::FieldError>> {
    validation::validate(candidate.username.as_ref(), candidate.password.as_ref())
}
