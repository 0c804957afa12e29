//! In-memory identity provider fake.
//!
//! Used by tests: accounts live in a process-local map, tokens are
//! registered explicitly, and the signed-in identity can be preset.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use cloudberry_core::{Email, UserId};

use crate::models::User;

use super::{AuthError, IdentityProvider};

#[derive(Default)]
struct Accounts {
    /// email -> (password, user)
    by_email: HashMap<String, (String, User)>,
    /// federated token -> user
    by_token: HashMap<String, User>,
}

/// Process-local identity provider with the same contract as the hosted
/// one.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<Accounts>,
    current: RwLock<Option<User>>,
}

impl MemoryIdentity {
    /// Create a provider with no accounts and nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider already signed in as `user_id` (test setup
    /// helper).
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let provider = Self::default();
        *provider.write_current() = Some(User {
            id: UserId::new(user_id.clone()),
            email: format!("{user_id}@example.com"),
            name: user_id,
            created_at: Utc::now(),
        });
        provider
    }

    /// Register a federated token resolving to a fresh user.
    pub fn register_token(&self, token: impl Into<String>, user: User) {
        self.write_accounts().by_token.insert(token.into(), user);
    }

    fn write_accounts(&self) -> std::sync::RwLockWriteGuard<'_, Accounts> {
        match self.accounts.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_current(&self) -> std::sync::RwLockWriteGuard<'_, Option<User>> {
        match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_current(&self) -> std::sync::RwLockReadGuard<'_, Option<User>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<User> {
        self.read_current().clone()
    }

    async fn sign_up(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let mut accounts = self.write_accounts();
        if accounts.by_email.contains_key(email.as_str()) {
            return Err(AuthError::Provider("account already exists".to_string()));
        }

        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            email: email.as_str().to_owned(),
            name: email.local_part().to_owned(),
            created_at: Utc::now(),
        };
        accounts
            .by_email
            .insert(email.as_str().to_owned(), (password.to_owned(), user.clone()));
        drop(accounts);

        *self.write_current() = Some(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let user = {
            let accounts = match self.accounts.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match accounts.by_email.get(email.as_str()) {
                Some((stored, user)) if stored == password => user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        *self.write_current() = Some(user.clone());
        Ok(user)
    }

    async fn sign_in_with_token(&self, id_token: &str) -> Result<User, AuthError> {
        let user = {
            let accounts = match self.accounts.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            accounts
                .by_token
                .get(id_token)
                .cloned()
                .ok_or(AuthError::InvalidCredentials)?
        };

        *self.write_current() = Some(user.clone());
        Ok(user)
    }

    fn sign_out(&self) {
        *self.write_current() = None;
    }
}
