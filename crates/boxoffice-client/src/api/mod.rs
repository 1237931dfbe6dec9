//! Typed endpoint groups, one per backend resource.

mod auth;
mod events;
mod tickets;
mod users;

pub use auth::AuthApi;
pub use events::EventsApi;
pub use tickets::TicketsApi;
pub use users::UsersApi;
