//! Pre-configured HTTP client for the REST backend.
//!
//! Every request goes through [`ApiClient::authorize`], which reads the
//! access token from the session store and attaches it as a bearer header.
//! There is no retry and no automatic token refresh; a 401 surfaces to the
//! caller as [`ClientError::Unauthorized`].

use std::sync::{Arc, RwLock};

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    /// Token installed by the auth controller, used when the store has none.
    default_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("munificent-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
            default_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Install the default `Authorization` token.
    pub fn set_default_token(&self, token: &str) {
        if let Ok(mut slot) = self.default_token.write() {
            *slot = Some(token.to_string());
        }
    }

    /// Remove the default `Authorization` token.
    pub fn clear_default_token(&self) {
        if let Ok(mut slot) = self.default_token.write() {
            *slot = None;
        }
    }

    pub fn default_token(&self) -> Option<String> {
        self.default_token.read().ok().and_then(|slot| slot.clone())
    }

    /// Join a path onto the base URL. Paths are given with a leading slash.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// The token the next request would carry, if any.
    pub fn bearer_token(&self) -> Option<String> {
        self.store
            .get()
            .filter(|t| !t.is_empty())
            .or_else(|| self.default_token())
    }

    /// Pre-request hook: attach the bearer token when one is available.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(method = %method, url = %url, "API request");
        self.authorize(self.client.request(method, url))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.request(Method::GET, path).query(query).send().await?;
        decode(response).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        decode(response).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        ensure_success(response).await.map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_default_token", &self.default_token().is_some())
            .finish()
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, url = %url, "API request failed");
    Err(ClientError::from_status(status, &body))
}

/// Decode a JSON body. Empty bodies (204, or a bare 200) decode as `null`,
/// which lets callers ask for `()` or `Option<T>`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(serde_json::Value::Null).map_err(ClientError::from);
    }
    serde_json::from_slice(&bytes).map_err(ClientError::from)
}
