//! Client-side session handling for the boxoffice platform.
//!
//! # Components
//!
//! - [`credential`]: bearer credential decoding into [`Identity`] claims
//! - [`storage`]: persisted key-value storage (credential, theme)
//! - [`store`]: the session state machine
//! - [`gateway`]: login, registration and logout; sole writer of session state
//! - [`guard`]: navigation gating on session state
//! - [`theme`]: display theme preference
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use boxoffice_client::{Endpoints, ServiceClientSet};
//! use boxoffice_session::{AuthGateway, GuardDecision, MemoryStorage, Route, guard_route};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clients = ServiceClientSet::builder()
//!     .endpoints(Endpoints::uniform("http://localhost:5000"))
//!     .build()?;
//! let gateway = AuthGateway::new(clients, Arc::new(MemoryStorage::new()));
//!
//! gateway.initialize().await;
//! if let Err(e) = gateway.login("a@b.com", "secret").await {
//!     eprintln!("{}", e.message());
//! }
//!
//! if guard_route(&gateway.state(), &Route::MyTickets) == GuardDecision::Allow {
//!     let tickets = gateway.services().tickets().mine().await?;
//!     println!("{} tickets", tickets.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod credential;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod storage;
pub mod store;
pub mod theme;

pub use credential::{Credential, Identity, SubjectId, decode};
pub use error::{AuthError, LoginError, MalformedCredential, RegisterError, StorageError};
pub use gateway::AuthGateway;
pub use guard::{Access, GuardDecision, Route, decide, guard_route};
pub use storage::{CREDENTIAL_KEY, FileStorage, MemoryStorage, Storage, THEME_KEY};
pub use store::{SessionSnapshot, SessionState, SessionStore};
pub use theme::ThemeMode;
