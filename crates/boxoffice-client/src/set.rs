//! The three backend clients and their shared authorization state.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use crate::api::{AuthApi, EventsApi, TicketsApi, UsersApi};
use crate::client::{AuthorizationSlot, ServiceClient, ServiceKind};
use crate::error::{Error, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base addresses of the three backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Identity service (login, registration, profile).
    pub identity: String,
    /// Catalog service (events).
    pub catalog: String,
    /// Ticketing service (tickets).
    pub ticketing: String,
}

impl Endpoints {
    /// Create an endpoint set.
    pub fn new(
        identity: impl Into<String>,
        catalog: impl Into<String>,
        ticketing: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            catalog: catalog.into(),
            ticketing: ticketing.into(),
        }
    }

    /// Point all three services at one address (useful behind a gateway).
    pub fn uniform(base: impl Into<String>) -> Self {
        let base = base.into();
        Self::new(base.clone(), base.clone(), base)
    }

    /// Address of one service.
    pub fn get(&self, kind: ServiceKind) -> &str {
        match kind {
            ServiceKind::Identity => &self.identity,
            ServiceKind::Catalog => &self.catalog,
            ServiceKind::Ticketing => &self.ticketing,
        }
    }
}

/// Read-only view of the three clients.
///
/// This is what the presentation layer gets: it can issue requests on any
/// backend but has no way to touch the authorization header.
#[derive(Debug, Clone)]
pub struct Services {
    identity: ServiceClient,
    catalog: ServiceClient,
    ticketing: ServiceClient,
}

impl Services {
    /// Identity service client.
    pub fn identity(&self) -> &ServiceClient {
        &self.identity
    }

    /// Catalog service client.
    pub fn catalog(&self) -> &ServiceClient {
        &self.catalog
    }

    /// Ticketing service client.
    pub fn ticketing(&self) -> &ServiceClient {
        &self.ticketing
    }

    /// Client for a given backend.
    pub fn client(&self, kind: ServiceKind) -> &ServiceClient {
        match kind {
            ServiceKind::Identity => &self.identity,
            ServiceKind::Catalog => &self.catalog,
            ServiceKind::Ticketing => &self.ticketing,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Login and registration on the identity service.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.identity.clone())
    }

    /// Profile endpoints on the identity service.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.identity.clone())
    }

    /// Event listing on the catalog service.
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.catalog.clone())
    }

    /// Ticket endpoints on the ticketing service.
    pub fn tickets(&self) -> TicketsApi {
        TicketsApi::new(self.ticketing.clone())
    }
}

/// The identity, catalog and ticketing clients, armed and disarmed together.
///
/// All three clients read one shared authorization slot, so they always carry
/// the same `Authorization` value. [`arm_authorization`](Self::arm_authorization)
/// and [`disarm_authorization`](Self::disarm_authorization) are the only writers.
#[derive(Debug)]
pub struct ServiceClientSet {
    services: Services,
    authorization: AuthorizationSlot,
}

impl ServiceClientSet {
    /// Create a new builder.
    pub fn builder() -> ServiceClientSetBuilder {
        ServiceClientSetBuilder::new()
    }

    /// Read-only access to the clients.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Attach `Bearer <credential>` to every outgoing request on all three clients.
    pub fn arm_authorization(&self, credential: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", credential))
            .map_err(|_| Error::Config("credential is not a valid header value".to_string()))?;
        value.set_sensitive(true);

        *self.authorization.write() = Some(value);
        tracing::debug!("service clients armed");
        Ok(())
    }

    /// Remove the `Authorization` header from all three clients.
    pub fn disarm_authorization(&self) {
        *self.authorization.write() = None;
        tracing::debug!("service clients disarmed");
    }

    /// Whether requests currently carry a credential.
    pub fn is_armed(&self) -> bool {
        self.authorization.read().is_some()
    }
}

/// Builder for a [`ServiceClientSet`].
#[derive(Debug)]
pub struct ServiceClientSetBuilder {
    endpoints: Option<Endpoints>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ServiceClientSetBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            endpoints: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the backend base addresses.
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the set. Starts disarmed.
    pub fn build(self) -> Result<ServiceClientSet> {
        let endpoints = self
            .endpoints
            .ok_or_else(|| Error::Config("endpoints are required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("boxoffice-client/{}", env!("CARGO_PKG_VERSION")));

        // One connection pool; the per-service difference is only the base URL.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let authorization = AuthorizationSlot::default();
        let make = |kind: ServiceKind| -> Result<ServiceClient> {
            let base_url = normalize_base_url(endpoints.get(kind))?;
            Ok(ServiceClient::new(
                kind,
                http.clone(),
                base_url,
                self.timeout,
                authorization.clone(),
            ))
        };

        let services = Services {
            identity: make(ServiceKind::Identity)?,
            catalog: make(ServiceKind::Catalog)?,
            ticketing: make(ServiceKind::Ticketing)?,
        };

        Ok(ServiceClientSet {
            services,
            authorization,
        })
    }
}

impl Default for ServiceClientSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a base address and make sure it ends with `/` so joins append.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}
