//! Session state machine.
//!
//! ```text
//! Initializing ──(credential decodes)──▶ Authenticated(Identity)
//!      │                                     ▲        │
//!      └──(absent / malformed)──▶ Anonymous ─┘        │ logout
//!                                     ▲  login/register│
//!                                     └────────────────┘
//! ```
//!
//! Nothing ever returns to `Initializing`. Mutators are crate-private: only
//! the [`AuthGateway`](crate::AuthGateway) drives transitions.

use std::sync::atomic::{AtomicBool, Ordering};

use boxoffice_client::ServiceClientSet;
use chrono::Utc;
use tokio::sync::watch;

use crate::credential::{self, Identity};
use crate::storage::{CREDENTIAL_KEY, Storage};

/// Current session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Persisted storage has not been examined yet.
    Initializing,
    /// No user is signed in.
    Anonymous,
    /// A user is signed in.
    Authenticated(Identity),
}

impl SessionState {
    /// True only before initialization has finished.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// What the presentation layer reads: identity-or-absent plus a loading flag.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            identity: state.identity().cloned(),
            loading: state.is_loading(),
        }
    }
}

/// Holder of the one session of a client instance.
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl SessionStore {
    /// A fresh store in `Initializing`.
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current state as identity + loading flag.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state.borrow())
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until initialization has finished and return the settled state.
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.state(),
        }
    }

    /// Examine persisted storage once and settle into `Anonymous` or
    /// `Authenticated`. Later calls return the current state untouched.
    ///
    /// A credential that fails to decode is removed from storage and the
    /// clients are disarmed. Storage failures degrade to `Anonymous`.
    pub(crate) async fn initialize(
        &self,
        storage: &dyn Storage,
        services: &ServiceClientSet,
    ) -> SessionState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already initialized");
            return self.state();
        }

        let raw = match storage.get(CREDENTIAL_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted credential, starting anonymous");
                None
            }
        };

        let Some(raw) = raw else {
            tracing::debug!("no persisted credential");
            services.disarm_authorization();
            self.transition(SessionState::Anonymous);
            return self.state();
        };

        let recovered = credential::decode(&raw).and_then(|identity| {
            services
                .arm_authorization(&raw)
                .map(|_| identity)
                .map_err(|_| crate::error::MalformedCredential::Shape)
        });

        match recovered {
            Ok(identity) => {
                if identity.looks_expired(Utc::now()) {
                    // Accepted anyway; the backends enforce expiry.
                    tracing::warn!(
                        expires_at = ?identity.expires_at(),
                        "persisted credential looks expired"
                    );
                }
                tracing::info!(user = %identity.display_name(), "session restored");
                self.transition(SessionState::Authenticated(identity));
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed persisted credential");
                if let Err(e) = storage.remove(CREDENTIAL_KEY).await {
                    tracing::warn!(error = %e, "could not remove malformed credential");
                }
                services.disarm_authorization();
                self.transition(SessionState::Anonymous);
            }
        }

        self.state()
    }

    pub(crate) fn set_authenticated(&self, identity: Identity) {
        self.transition(SessionState::Authenticated(identity));
    }

    pub(crate) fn set_anonymous(&self) {
        self.transition(SessionState::Anonymous);
    }

    fn transition(&self, next: SessionState) {
        // Any explicit transition means storage no longer needs examining.
        self.initialized.store(true, Ordering::SeqCst);
        let previous = self.state.send_replace(next);
        tracing::debug!(
            from = state_name(&previous),
            to = state_name(&self.state.borrow()),
            "session transition"
        );
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn state_name(state: &SessionState) -> &'static str {
    match state {
        SessionState::Initializing => "initializing",
        SessionState::Anonymous => "anonymous",
        SessionState::Authenticated(_) => "authenticated",
    }
}
