//! HTTP client shared by the session store and every resource view.
//!
//! `HttpClient` holds the backend base URL and a mutable map of default
//! headers applied to each outgoing request. All responses pass through
//! [`HttpClient::normalize`], so callers only ever see [`ApiError`].

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Whether a request carries the `Authorization` default header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Default,
    Omit,
}

/// REST client for the CRM backend.
///
/// The default-header map sits behind a lock so a shared `Arc<HttpClient>`
/// can be reconfigured by the session store while views keep using it.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    default_headers: RwLock<HeaderMap>,
}

impl HttpClient {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers: RwLock::new(headers),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a request path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Default headers
    // =========================================================================

    pub fn set_default_header(&self, name: HeaderName, value: HeaderValue) {
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub fn remove_default_header(&self, name: &HeaderName) {
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    pub fn default_header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Copy of the headers the next request would carry
    pub fn default_headers(&self) -> HeaderMap {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path, Auth::Default)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path, Auth::Default).json(body))
            .await
    }

    /// POST without the `Authorization` default header (login, sign-up)
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path, Auth::Omit).json(body))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path, Auth::Default).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, path, Auth::Default))
            .await
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> RequestBuilder {
        let mut headers = self.default_headers();
        if auth == Auth::Omit {
            headers.remove(header::AUTHORIZATION);
        }
        debug!(
            method = method.as_str(),
            path,
            authorized = headers.contains_key(header::AUTHORIZATION),
            "Sending request"
        );
        self.client.request(method, self.url(path)).headers(headers)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::normalize(builder.send().await).await?;
        let url = response.url().to_string();

        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        // Empty 2xx bodies (204, bare DELETE) decode as JSON null
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

        serde_json::from_slice(body).map_err(|e| {
            error!(url = %url, error = %e, "Failed to parse JSON response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    /// Response normalization applied to every request.
    ///
    /// 2xx responses pass through unchanged; error statuses become
    /// `ApiError::Rejected` with the server's payload; transport failures
    /// become the fixed no-response or request-failed errors.
    pub async fn normalize(result: reqwest::Result<Response>) -> Result<Response, ApiError> {
        match result {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let url = response.url().to_string();
                let body = response.text().await.unwrap_or_default();
                error!(
                    %status,
                    url = %url,
                    body = %ApiError::truncate_body(&body),
                    "Response error"
                );
                Err(ApiError::from_status(status, &body))
            }
            Err(e) => {
                let err = ApiError::from_transport(e);
                match &err {
                    ApiError::RequestSetup(detail) => error!(error = %detail, "Request setup error"),
                    ApiError::NoResponse(source) => error!(error = %source, "No response received"),
                    _ => {}
                }
                Err(err)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
