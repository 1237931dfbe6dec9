//! CLI command handlers.

pub mod auth;
pub mod events;
pub mod profile;
pub mod theme;
pub mod tickets;

use std::sync::Arc;

use anyhow::{Result, bail};
use boxoffice_session::{AuthGateway, FileStorage, GuardDecision, Route, guard_route};
use console::Style;

/// Shared context for all commands.
pub struct Context {
    /// Session gateway, already initialized from storage.
    pub gateway: AuthGateway,
    /// Persisted storage (theme lives here too).
    pub storage: Arc<FileStorage>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Fail unless the current session may open `route`.
    pub fn require(&self, route: Route) -> Result<()> {
        match guard_route(&self.gateway.state(), &route) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::RedirectToLogin => {
                bail!("{} requires login. Run 'boxoffice login <email>' first.", route)
            }
            GuardDecision::Defer => bail!("session is still loading"),
        }
    }

    /// Print JSON when requested, otherwise run `human`.
    pub fn output<T: serde::Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json_output {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

/// Print an inline error the way every command does.
pub fn print_error(message: impl std::fmt::Display) {
    let red = Style::new().red();
    eprintln!("{} {}", red.apply_to("Error:"), message);
}

/// Follow-up advice for a failed command, when the failure is a backend
/// condition the user can act on.
pub fn hint(error: &anyhow::Error) -> Option<&'static str> {
    let error = error.downcast_ref::<boxoffice_client::Error>()?;
    if error.is_auth_error() {
        Some("The service rejected your session. Run 'boxoffice login <email>' to sign in again.")
    } else if error.is_not_found() {
        Some("Nothing exists with that id. Try 'boxoffice events list' or 'boxoffice tickets list'.")
    } else if error.is_server_error() {
        Some("The service failed to handle the request. Try again later.")
    } else if error.is_network() {
        Some("Check that the service is running and its URL is right (--identity-url, --catalog-url, --ticketing-url).")
    } else {
        None
    }
}

/// Print a dimmed follow-up line under an error.
pub fn print_hint(message: impl std::fmt::Display) {
    let dim = Style::new().dim();
    eprintln!("{}", dim.apply_to(message));
}

/// Print a success line.
pub fn print_ok(message: impl std::fmt::Display) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}
