//! HTTP clients for the boxoffice backends.
//!
//! The platform is split over three services, each with its own base address:
//!
//! - **Identity**: login, registration, profile, password changes
//! - **Catalog**: read-only event listing and search
//! - **Ticketing**: ticket purchase, listing and deletion
//!
//! A [`ServiceClientSet`] owns one [`ServiceClient`] per service. The clients
//! share a single authorization slot, so arming or disarming the set changes
//! the `Authorization` header of all three at once.
//!
//! # Example
//!
//! ```no_run
//! use boxoffice_client::{Endpoints, ServiceClientSet, Result};
//!
//! # async fn example() -> Result<()> {
//! let set = ServiceClientSet::builder()
//!     .endpoints(Endpoints::new(
//!         "http://localhost:5001",
//!         "http://localhost:5002",
//!         "http://localhost:5003",
//!     ))
//!     .build()?;
//!
//! let events = set.services().events().list().await?;
//! println!("{} events", events.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod set;
pub mod types;

pub use client::{ServiceClient, ServiceKind};
pub use error::{Error, Result};
pub use set::{Endpoints, ServiceClientSet, ServiceClientSetBuilder, Services};
pub use types::*;

pub use reqwest::Method;
