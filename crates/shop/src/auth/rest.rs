//! REST client for the hosted identity provider.
//!
//! The backend's auth API issues an opaque user identifier (plus the
//! user's profile) on successful sign-up or sign-in:
//!
//! - `POST {base}/v1/auth/signup` - `{"email", "password"}`
//! - `POST {base}/v1/auth/signin` - `{"email", "password"}`
//! - `POST {base}/v1/auth/token`  - `{"idToken"}` (federated sign-in)
//!
//! Success responses carry `{"userId", "email", "name", "createdAt"}`.
//! The signed-in identity is remembered in-process; signing out drops it
//! locally (the backend session is stateless).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use cloudberry_core::{Email, UserId};

use crate::config::ShopConfig;
use crate::models::User;

use super::{AuthError, IdentityProvider};

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the hosted backend's auth REST API.
#[derive(Clone)]
pub struct RestIdentityProvider {
    inner: Arc<RestIdentityProviderInner>,
}

struct RestIdentityProviderInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    current: RwLock<Option<User>>,
}

/// Identity payload returned by every successful auth call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    user_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<IdentityResponse> for User {
    fn from(payload: IdentityResponse) -> Self {
        Self {
            id: UserId::new(payload.user_id),
            email: payload.email,
            name: payload.name,
            created_at: payload.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl RestIdentityProvider {
    /// Create a new identity client from configuration.
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        Self {
            inner: Arc::new(RestIdentityProviderInner {
                client: reqwest::Client::new(),
                base_url: config
                    .auth_base_url
                    .as_str()
                    .trim_end_matches('/')
                    .to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
                current: RwLock::new(None),
            }),
        }
    }

    async fn post_auth(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<User, AuthError> {
        let response = self
            .inner
            .client
            .post(format!("{}/v1/auth/{path}", self.inner.base_url))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // The provider signals a rejected credential pair or token with a
        // 4xx; anything else non-success is a provider fault.
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::InvalidCredentials);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Provider(format!(
                "{status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let payload: IdentityResponse = serde_json::from_str(&text)
            .map_err(|e| AuthError::Provider(format!("unreadable auth response: {e}")))?;

        let user = User::from(payload);
        debug!(user_id = %user.id, "identity established");
        *self.write_current() = Some(user.clone());
        Ok(user)
    }

    fn write_current(&self) -> std::sync::RwLockWriteGuard<'_, Option<User>> {
        match self.inner.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    fn current_user(&self) -> Option<User> {
        match self.inner.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        self.post_auth(
            "signup",
            json!({"email": email.as_str(), "password": password}),
        )
        .await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        self.post_auth(
            "signin",
            json!({"email": email.as_str(), "password": password}),
        )
        .await
    }

    #[instrument(skip(self, id_token))]
    async fn sign_in_with_token(&self, id_token: &str) -> Result<User, AuthError> {
        self.post_auth("token", json!({"idToken": id_token})).await
    }

    fn sign_out(&self) {
        *self.write_current() = None;
    }
}
