//! Schema registry client with a per-subject id cache

use std::collections::HashMap;
use std::time::Duration;

use contracts::ContractError;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::avro::EnvelopeSchema;

const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

#[derive(Serialize)]
struct RegisterRequest<'a> {
    schema: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: u32,
}

/// Registers schemas under `{subject}` and remembers the returned ids
pub struct SchemaRegistryClient {
    base_url: String,
    http: reqwest::Client,
    ids: RwLock<HashMap<String, u32>>,
}

impl SchemaRegistryClient {
    /// Create a client for the registry at `url`.
    ///
    /// `timeout` bounds both the connect and the whole request, so a stalled
    /// registry surfaces as a schema error instead of blocking the caller.
    ///
    /// # Errors
    /// Returns a schema error when the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::schema(format!("failed to build registry client: {e}")))?;

        Ok(Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            http,
            ids: RwLock::new(HashMap::new()),
        })
    }

    /// Registry base URL
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Schema id for `subject`, registering `schema` on first use
    ///
    /// # Errors
    /// Returns a schema error when the registry is unreachable or refuses the schema
    pub async fn register(
        &self,
        subject: &str,
        schema: &EnvelopeSchema,
    ) -> Result<u32, ContractError> {
        // Fast path: read lock
        {
            let ids = self.ids.read().await;
            if let Some(id) = ids.get(subject) {
                return Ok(*id);
            }
        }

        // Slow path: write lock, re-check
        let mut ids = self.ids.write().await;
        if let Some(id) = ids.get(subject) {
            return Ok(*id);
        }

        let id = self.post_schema(subject, schema).await?;
        tracing::info!(subject, id, registry = %self.base_url, "Schema registered");
        ids.insert(subject.to_string(), id);
        Ok(id)
    }

    async fn post_schema(
        &self,
        subject: &str,
        schema: &EnvelopeSchema,
    ) -> Result<u32, ContractError> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let body = RegisterRequest {
            schema: schema.canonical_form(),
        };

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, REGISTRY_CONTENT_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ContractError::schema(format!("schema registry unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ContractError::schema(format!(
                "schema registry rejected subject '{subject}' ({status}): {detail}"
            )));
        }

        let parsed: RegisterResponse = response
            .json()
            .await
            .map_err(|e| ContractError::schema(format!("invalid registry response: {e}")))?;
        Ok(parsed.id)
    }
}
