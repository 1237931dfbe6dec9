//! Tickets API.

use crate::client::ServiceClient;
use crate::error::Result;
use crate::types::{PurchaseTicketRequest, ResourceId, Ticket};

/// Tickets API client.
///
/// Every endpoint here requires an armed client set.
pub struct TicketsApi {
    client: ServiceClient,
}

impl TicketsApi {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Buy one ticket for an event at the listed price.
    pub async fn purchase(&self, event_id: ResourceId, price: f64) -> Result<Ticket> {
        let request = PurchaseTicketRequest { event_id, price };
        self.client.post("tickets/purchase", &request).await
    }

    /// Tickets owned by the authenticated user.
    pub async fn mine(&self) -> Result<Vec<Ticket>> {
        self.client.get("tickets/my-tickets").await
    }

    /// Get a ticket by ID.
    pub async fn get(&self, id: &str) -> Result<Ticket> {
        self.client
            .get(&ServiceClient::resource_path("tickets", id)?)
            .await
    }

    /// Delete a ticket.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&ServiceClient::resource_path("tickets", id)?)
            .await
    }
}
