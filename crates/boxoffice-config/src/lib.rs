//! Configuration for boxoffice clients.
//!
//! Provides TOML-based configuration with:
//! - Base addresses of the identity, catalog and ticketing services
//! - HTTP client settings (timeout, user agent)
//! - Data directory for persisted storage and logs
//! - Config file layering (user config + project-local overrides)
//! - Environment overrides for the service addresses

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
