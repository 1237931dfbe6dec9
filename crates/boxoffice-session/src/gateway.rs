//! The only writer of session state.
//!
//! Every operation touches exactly three things, always in this order:
//! persisted storage, the service clients' authorization, the session store.

use std::sync::Arc;

use boxoffice_client::{AuthResponse, LoginRequest, RegisterRequest, ServiceClientSet, Services};
use tokio::sync::{Mutex, watch};

use crate::credential::{Credential, Identity};
use crate::error::{AuthError, LoginError, RegisterError};
use crate::storage::{CREDENTIAL_KEY, Storage};
use crate::store::{SessionSnapshot, SessionState, SessionStore};

const LOGIN_FALLBACK: &str = "Login failed";
const REGISTER_FALLBACK: &str = "Registration failed";

/// Coordinates login, registration and logout.
///
/// Owns the session store and the service client set; callers get read-only
/// views of both. Operations are serialized, so one login's
/// persist → arm → transition sequence never interleaves with another's.
#[derive(Debug)]
pub struct AuthGateway {
    store: SessionStore,
    clients: ServiceClientSet,
    storage: Arc<dyn Storage>,
    op_lock: Mutex<()>,
}

impl AuthGateway {
    /// Create a gateway in `Initializing`. Call [`initialize`](Self::initialize) next.
    pub fn new(clients: ServiceClientSet, storage: Arc<dyn Storage>) -> Self {
        Self {
            store: SessionStore::new(),
            clients,
            storage,
            op_lock: Mutex::new(()),
        }
    }

    /// Restore the session from persisted storage. Runs once; later calls
    /// return the current state.
    pub async fn initialize(&self) -> SessionState {
        let _guard = self.op_lock.lock().await;
        self.store
            .initialize(self.storage.as_ref(), &self.clients)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    /// Identity-or-absent plus loading flag.
    pub fn session(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    /// Signed-in identity, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.store.state().identity().cloned()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    /// Wait for initialization to settle.
    pub async fn ready(&self) -> SessionState {
        self.store.ready().await
    }

    /// Backend clients for the presentation layer's own calls.
    pub fn services(&self) -> &Services {
        self.clients.services()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign in with email and password.
    ///
    /// On failure the session is unchanged and the error carries the
    /// backend's message, or "Login failed".
    pub async fn login(&self, email: &str, password: &str) -> Result<(), LoginError> {
        let _guard = self.op_lock.lock().await;
        tracing::debug!(email, "login requested");

        let response = self
            .clients
            .services()
            .auth()
            .login(&LoginRequest::new(email, password))
            .await
            .map_err(|e| AuthError::from_client(e, LOGIN_FALLBACK))
            .inspect_err(|e| tracing::info!(email, error = %e, "login rejected"))?;

        self.establish(response).await
    }

    /// Create an account and sign in as it.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), RegisterError> {
        let _guard = self.op_lock.lock().await;
        tracing::debug!(email = %request.email, "registration requested");

        let response = self
            .clients
            .services()
            .auth()
            .register(request)
            .await
            .map_err(|e| AuthError::from_client(e, REGISTER_FALLBACK))
            .inspect_err(|e| tracing::info!(email = %request.email, error = %e, "registration rejected"))?;

        self.establish(response).await
    }

    /// Sign out locally. Never fails and never calls a backend.
    ///
    /// A storage failure is logged; the in-memory session and the clients are
    /// cleared regardless.
    pub async fn logout(&self) {
        let _guard = self.op_lock.lock().await;

        if let Err(e) = self.storage.remove(CREDENTIAL_KEY).await {
            tracing::warn!(error = %e, "could not remove persisted credential");
        }
        self.clients.disarm_authorization();
        self.store.set_anonymous();
        tracing::info!("logged out");
    }

    /// Persist, arm, transition. Caller holds the operation lock.
    async fn establish(&self, response: AuthResponse) -> Result<(), AuthError> {
        let credential = Credential::new(response.token);
        let identity = resolve_identity(&credential, response.user)?;

        self.storage
            .set(CREDENTIAL_KEY, credential.as_str())
            .await?;

        if let Err(e) = self.clients.arm_authorization(credential.as_str()) {
            // Roll the storage write back so nothing observable changed.
            if let Err(e) = self.storage.remove(CREDENTIAL_KEY).await {
                tracing::warn!(error = %e, "could not roll back persisted credential");
            }
            return Err(AuthError::Arm(e.to_string()));
        }

        tracing::info!(user = %identity.display_name(), "signed in");
        self.store.set_authenticated(identity);
        Ok(())
    }
}

/// Identity for a fresh credential: the identity service's `user` object when
/// it sent one, otherwise the credential's own claims.
fn resolve_identity(
    credential: &Credential,
    user: Option<serde_json::Value>,
) -> Result<Identity, AuthError> {
    match user {
        Some(serde_json::Value::Object(claims)) => {
            let mut identity = Identity::from_claims(claims);
            // Expiry only lives in the credential.
            if let Some(exp) = credential.identity().ok().and_then(|c| c.exp) {
                identity.fill_expiry(exp);
            }
            Ok(identity)
        }
        _ => Ok(credential.identity()?),
    }
}
