//! Events API.

use crate::client::ServiceClient;
use crate::error::Result;
use crate::types::{Event, EventSearchQuery};

/// Events API client.
pub struct EventsApi {
    client: ServiceClient,
}

impl EventsApi {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// List all events.
    pub async fn list(&self) -> Result<Vec<Event>> {
        self.client.get("events").await
    }

    /// Get an event by ID.
    pub async fn get(&self, id: &str) -> Result<Event> {
        self.client
            .get(&ServiceClient::resource_path("events", id)?)
            .await
    }

    /// Full-text search over events.
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<Event>> {
        let query = EventSearchQuery { q: query.into() };
        self.client.get_with_query("events/search", &query).await
    }
}
