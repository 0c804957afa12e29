//! REST client for the hosted document store.
//!
//! The backend's data API is a plain JSON document surface:
//!
//! - `GET    {base}/v1/{collection}/{key}` - one document, 404 if absent
//! - `PUT    {base}/v1/{collection}/{key}` - whole-document overwrite
//! - `GET    {base}/v1/{collection}?field=value` - filtered listing
//! - `POST   {base}/v1/{collection}` - create under a generated key
//!
//! Listing responses are arrays of `{"id": ..., "data": {...}}` entries;
//! single-document responses are the bare document. Every request carries
//! the project API key.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ShopConfig;

use super::{Document, DocumentStore, StoreError};

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the hosted backend's document REST API.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct RestDocumentStore {
    inner: Arc<RestDocumentStoreInner>,
}

struct RestDocumentStoreInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// One entry of a listing response.
#[derive(Debug, Deserialize)]
struct ListEntry {
    id: String,
    data: Document,
}

/// Response to a create call.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

impl RestDocumentStore {
    /// Create a new document store client from configuration.
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        Self {
            inner: Arc::new(RestDocumentStoreInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn document_url(&self, collection: &str, key: &str) -> String {
        format!("{}/v1/{collection}/{key}", self.inner.base_url)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/v1/{collection}", self.inner.base_url)
    }

    /// Read the body as text first so failures can be reported with
    /// context, then parse it as `T`.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse store response"
            );
            StoreError::Parse(e)
        })
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    #[instrument(skip(self), fields(collection = %collection, key = %key))]
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(collection, key))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;

        // Absence is a valid outcome, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("document absent");
            return Ok(None);
        }

        Ok(Some(Self::read_json(response).await?))
    }

    #[instrument(skip(self, document), fields(collection = %collection, key = %key))]
    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .put(self.document_url(collection, key))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(&document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection, field = %field))]
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.collection_url(collection))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .query(&[(field, value)])
            .send()
            .await?;

        let entries: Vec<ListEntry> = Self::read_json(response).await?;
        debug!(count = entries.len(), "query returned");
        Ok(entries.into_iter().map(|e| (e.id, e.data)).collect())
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.collection_url(collection))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;

        let entries: Vec<ListEntry> = Self::read_json(response).await?;
        debug!(count = entries.len(), "list returned");
        Ok(entries.into_iter().map(|e| (e.id, e.data)).collect())
    }

    #[instrument(skip(self, document), fields(collection = %collection))]
    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let response = self
            .inner
            .client
            .post(self.collection_url(collection))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(&document)
            .send()
            .await?;

        let created: CreatedResponse = Self::read_json(response).await?;
        if created.id.is_empty() {
            return Err(StoreError::Malformed(
                "create response carried an empty id".to_string(),
            ));
        }

        Ok(created.id)
    }
}
