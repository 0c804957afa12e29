//! Identity collaborator and credential validation.
//!
//! The hosted identity provider owns user records outright; this client
//! holds only the [`IdentityProvider`] contract (who is signed in, sign
//! up/in/out) and the pre-flight validation that keeps obviously bad
//! credentials from ever reaching the network.

mod error;
mod memory;
mod rest;

pub use error::AuthError;
pub use memory::MemoryIdentity;
pub use rest::RestIdentityProvider;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use cloudberry_core::{Email, UserId};

use crate::models::User;

/// Minimum password length accepted at sign-up.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Contract required of the identity provider.
///
/// All cart and order documents are keyed by the identifier this
/// collaborator reports; when it reports none, every scoped operation
/// fails before touching the store.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<User>;

    /// The currently signed-in user's identifier, if any.
    fn current_user_id(&self) -> Option<UserId> {
        self.current_user().map(|user| user.id)
    }

    /// Register a new account and sign it in.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<User, AuthError>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError>;

    /// Sign in with a federated identity token.
    async fn sign_in_with_token(&self, id_token: &str) -> Result<User, AuthError>;

    /// Drop the current identity.
    fn sign_out(&self);
}

/// Authentication service.
///
/// Wraps the identity provider with the credential validation performed
/// before any network call is made.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// The currently signed-in user's identifier, if any.
    #[must_use]
    pub fn current_user_id(&self) -> Option<UserId> {
        self.provider.current_user_id()
    }

    /// The currently signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.provider.current_user()
    }

    /// True if an identity is available.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.provider.current_user_id().is_some()
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank,
    /// `AuthError::PasswordMismatch` if the confirmation differs,
    /// `AuthError::WeakPassword` if the password is too short, and
    /// `AuthError::InvalidEmail` if the address does not parse - all
    /// without calling the provider.
    #[instrument(skip(self, password, confirm_password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        validate_password(password)?;

        let email = Email::parse(email)?;

        let user = self.provider.sign_up(&email, password).await?;
        info!(user_id = %user.id, "sign up succeeded");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank and
    /// `AuthError::InvalidCredentials` if the provider rejects the pair.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(email)?;

        let user = self.provider.sign_in(&email, password).await?;
        info!(user_id = %user.id, "sign in succeeded");
        Ok(user)
    }

    /// Sign in with a federated identity token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the token is rejected.
    #[instrument(skip(self, id_token))]
    pub async fn sign_in_with_token(&self, id_token: &str) -> Result<User, AuthError> {
        if id_token.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.provider.sign_in_with_token(id_token).await?;
        info!(user_id = %user.id, "token sign in succeeded");
        Ok(user)
    }

    /// Drop the current identity.
    pub fn sign_out(&self) {
        self.provider.sign_out();
        info!("signed out");
    }
}

/// Validate that a password meets minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
