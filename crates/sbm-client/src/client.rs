use reqwest::{Client, Method, RequestBuilder, Response};
use sbm_common::models::ErrorBody;
use sbm_common::{ApiError, BootConfig, ListResponse, Machine, Resource, ResourceKind, StatusResponse, Variable};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;

const API_PREFIX: &str = "api/v1";

/// Async client for the SBM REST API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: Url,
}

impl ResourceClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    pub fn with_http_client(config: ClientConfig, http: Client) -> Self {
        Self {
            http,
            base_url: config.base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v1/{kind}/`
    pub fn collection_url(&self, kind: ResourceKind) -> Result<Url, ApiError> {
        self.join(&format!("{}/{}/", API_PREFIX, kind.as_str()))
    }

    /// `{base}/api/v1/{kind}/{key}/` with `key` percent-encoded as a single
    /// path segment.
    pub fn item_url(&self, kind: ResourceKind, key: &str) -> Result<Url, ApiError> {
        let segment = encode_segment(key)?;
        self.join(&format!("{}/{}/{}/", API_PREFIX, kind.as_str(), segment))
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))
    }

    /// Lists the keys of a collection, sorted ascending.
    pub async fn list(&self, kind: ResourceKind) -> Result<Vec<String>, ApiError> {
        let url = self.collection_url(kind)?;
        let response = self.send(self.http.get(url.clone()), Method::GET, &url).await?;
        let listing: ListResponse = decode(response, &url).await?;
        let items = listing.into_sorted();
        debug!("Fetched {} {} entries", items.len(), kind);
        Ok(items)
    }

    /// Fetches one record by key.
    pub async fn get<R: Resource>(&self, key: &str) -> Result<R, ApiError> {
        let url = self.item_url(R::KIND, key)?;
        let response = self.send(self.http.get(url.clone()), Method::GET, &url).await?;
        decode(response, &url).await
    }

    pub async fn boot_config(&self, title: &str) -> Result<BootConfig, ApiError> {
        self.get(title).await
    }

    pub async fn machine(&self, hostname: &str) -> Result<Machine, ApiError> {
        self.get(hostname).await
    }

    pub async fn variable(&self, key: &str) -> Result<Variable, ApiError> {
        self.get(key).await
    }

    /// Adds a record with `PUT` on the collection. The server answers with
    /// the updated key list, returned here sorted.
    pub async fn create<R: Resource>(&self, record: &R) -> Result<Vec<String>, ApiError> {
        let url = self.collection_url(R::KIND)?;
        info!("Creating {} '{}'", R::KIND, record.key());
        let response = self
            .send(self.http.put(url.clone()).json(record), Method::PUT, &url)
            .await?;
        let listing: ListResponse = decode(response, &url).await?;
        Ok(listing.into_sorted())
    }

    /// Replaces a record with `POST` on its item URL and returns the record
    /// as the server now reports it.
    pub async fn update<R: Resource>(&self, record: &R) -> Result<R, ApiError> {
        let url = self.item_url(R::KIND, record.key())?;
        info!("Updating {} '{}'", R::KIND, record.key());
        let response = self
            .send(self.http.post(url.clone()).json(record), Method::POST, &url)
            .await?;
        decode(response, &url).await
    }

    pub async fn delete(&self, kind: ResourceKind, key: &str) -> Result<(), ApiError> {
        let url = self.item_url(kind, key)?;
        info!("Deleting {} '{}'", kind, key);
        let response = self.send(self.http.delete(url.clone()), Method::DELETE, &url).await?;
        let status: StatusResponse = decode(response, &url).await?;
        if !status.is_ok() {
            return Err(ApiError::Decode {
                url: url.to_string(),
                reason: format!("expected status 'ok', got '{}'", status.status),
            });
        }
        Ok(())
    }

    /// Renders the boot script `hostname` would receive next, without the
    /// server recording a boot.
    pub async fn boot_test(&self, hostname: &str) -> Result<String, ApiError> {
        let segment = encode_segment(hostname)?;
        let url = self.join(&format!("{}/boot/test/{}/", API_PREFIX, segment))?;
        let response = self.send(self.http.get(url.clone()), Method::GET, &url).await?;
        response.text().await.map_err(|e| ApiError::transport(e.to_string()))
    }

    /// Fetches every variable as a name to value map.
    pub async fn variable_map(&self) -> Result<HashMap<String, String>, ApiError> {
        let mut vars = HashMap::new();
        for key in self.list(ResourceKind::Variable).await? {
            let variable = self.variable(&key).await?;
            vars.insert(variable.key, variable.value);
        }
        Ok(vars)
    }

    async fn send(&self, request: RequestBuilder, method: Method, url: &Url) -> Result<Response, ApiError> {
        debug!("{} {}", method, url);
        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed before a response arrived: {}", method, url, e);
            ApiError::transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.unwrap_or_default();
        if serde_json::from_str::<ErrorBody>(&body).is_err() {
            warn!("{} {} returned {} without an 'err' field", method, url, status);
        }
        Err(ApiError::from_response(status.as_u16(), &status_text, &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ApiError> {
    let body = response.text().await.map_err(|e| ApiError::transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

// `.` and `..` would be collapsed by URL normalization and address a
// different resource.
fn encode_segment(key: &str) -> Result<String, ApiError> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(ApiError::InvalidKey(key.to_string()));
    }
    Ok(urlencoding::encode(key).into_owned())
}
