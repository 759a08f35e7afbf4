use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ClientError, CollectionApi};
use crate::catalog::{CardId, SetId};
use crate::listing::{CardListing, SetListing};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Server root, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`CollectionApi`] over the server's `/api/v1` routes.
pub struct HttpCollectionClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCollectionClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/api/v1", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Cross-set name search.
    pub async fn search_cards(&self, query: &str) -> Result<Vec<CardListing>, ClientError> {
        self.get_json(&format!("/cards/search?q={}", urlencoding::encode(query)))
            .await
    }
}

#[async_trait]
impl CollectionApi for HttpCollectionClient {
    async fn set_cards(&self, set_id: SetId) -> Result<Vec<CardListing>, ClientError> {
        self.get_json(&format!("/sets/{set_id}/cards")).await
    }

    async fn set(&self, set_id: SetId) -> Result<SetListing, ClientError> {
        self.get_json(&format!("/sets/{set_id}")).await
    }

    async fn mark_owned(&self, card_id: CardId) -> Result<(), ClientError> {
        let url = format!("{}/collection/{card_id}/owned", self.base_url);
        debug!("PUT {}", url);
        let response = self.authorize(self.client.put(&url)).send().await?;
        Self::check(response).await.map(|_| ())
    }

    async fn mark_unowned(&self, card_id: CardId) -> Result<(), ClientError> {
        let url = format!("{}/collection/{card_id}", self.base_url);
        debug!("DELETE {}", url);
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check(response).await.map(|_| ())
    }
}
