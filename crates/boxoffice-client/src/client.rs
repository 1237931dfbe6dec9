//! Single-backend HTTP client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result, backend_message};

/// Every backend mounts its routes under this prefix.
const API_PREFIX: &str = "api/";

/// Outgoing `Authorization` value shared by every client of one set.
pub(crate) type AuthorizationSlot = Arc<RwLock<Option<HeaderValue>>>;

/// The backend a client is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Accounts, login, registration, profile.
    Identity,
    /// Read-only event listing.
    Catalog,
    /// Ticket purchase and ownership.
    Ticketing,
}

impl ServiceKind {
    /// All services in a fixed order.
    pub const ALL: [ServiceKind; 3] = [
        ServiceKind::Identity,
        ServiceKind::Catalog,
        ServiceKind::Ticketing,
    ];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Identity => "identity",
            ServiceKind::Catalog => "catalog",
            ServiceKind::Ticketing => "ticketing",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP client bound to one backend base address.
///
/// Clients are created by [`ServiceClientSet`](crate::ServiceClientSet) and
/// share its authorization slot, so they cannot be armed individually.
#[derive(Clone)]
pub struct ServiceClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    kind: ServiceKind,
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    authorization: AuthorizationSlot,
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("kind", &self.inner.kind)
            .field("base_url", &self.inner.base_url.as_str())
            .field("armed", &self.inner.authorization.read().is_some())
            .finish()
    }
}

impl ServiceClient {
    pub(crate) fn new(
        kind: ServiceKind,
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        authorization: AuthorizationSlot,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                kind,
                http,
                base_url,
                timeout,
                authorization,
            }),
        }
    }

    /// Which backend this client talks to.
    pub fn kind(&self) -> ServiceKind {
        self.inner.kind
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The `Authorization` header value attached to outgoing requests, if armed.
    pub fn authorization(&self) -> Option<String> {
        self.inner
            .authorization
            .read()
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Path of one resource in a collection, `{collection}/{id}`.
    ///
    /// The id is escaped as a single segment, so it can never reach another
    /// endpoint. Ids made only of dots are rejected since URL resolution
    /// treats them as `.`/`..` even when escaped.
    pub fn resource_path(collection: &str, id: &str) -> Result<String> {
        if id.is_empty() || id.chars().all(|c| c == '.') {
            return Err(Error::InvalidId(id.to_string()));
        }
        Ok(format!("{}/{}", collection, urlencoding::encode(id)))
    }

    /// Build a URL for an API path.
    pub fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("{}{}", API_PREFIX, path))
            .map_err(Error::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a request and decode the JSON response body.
    ///
    /// An empty success body decodes as JSON `null`, so `T = ()` and
    /// `T = Option<_>` work for endpoints that return nothing.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, &[] as &[(&str, &str)], body).await?;
        decode_body(response).await
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send::<_, ()>(Method::GET, path, query, None).await?;
        decode_body(response).await
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Make a DELETE request, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<_, ()>(Method::DELETE, path, &[] as &[(&str, &str)], None)
            .await?;
        Ok(())
    }

    /// Send a request and return the response if its status is a success.
    async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(service = %self.inner.kind, %method, %url, "sending request");

        let mut request = self
            .inner
            .http
            .request(method, url)
            .query(query)
            .timeout(self.inner.timeout);

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)?;
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }

        // Read at send time so a request always carries the current value.
        let authorization = self.inner.authorization.read().clone();
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(service = %self.inner.kind, error = %e, "request did not complete");
            Error::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(extract_error(status, response).await)
        }
    }
}

/// Decode a success response body.
async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(Error::Network)?;
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// Extract an error from a failed response.
async fn extract_error(status: StatusCode, response: reqwest::Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let message = backend_message(status.as_u16(), &body);
    tracing::debug!(status = status.as_u16(), %message, "service returned an error");
    Error::Service {
        status: status.as_u16(),
        message,
    }
}
