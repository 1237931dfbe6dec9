//! Request and response types for the backend services.
//!
//! The backends speak camelCase JSON.

use serde::{Deserialize, Serialize};

/// Id of a backend resource. The services use numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Number(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Text(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Text(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Credentials for `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl LoginRequest {
    /// Create a login request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Profile fields for `POST /auth/register`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer credential issued by the identity service.
    pub token: String,
    /// The account the credential belongs to, as a free-form JSON object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

/// Account profile returned by `GET /users/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: ResourceId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body for `PUT /users/change-password`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChangePasswordRequest { .. }")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// An event as listed by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event ID.
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    /// Start time (ISO 8601).
    #[serde(default)]
    pub start_date: Option<String>,
    /// End time (ISO 8601).
    #[serde(default)]
    pub end_date: Option<String>,
    /// Ticket price.
    #[serde(default)]
    pub price: f64,
    /// Capacity.
    #[serde(default)]
    pub max_tickets: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Query for `GET /events/search`.
#[derive(Debug, Clone, Serialize)]
pub struct EventSearchQuery {
    /// Free-text search term.
    pub q: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ticketing
// ─────────────────────────────────────────────────────────────────────────────

/// Body for `POST /tickets/purchase`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicketRequest {
    pub event_id: ResourceId,
    pub price: f64,
}

/// Lifecycle of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A ticket owned by the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Ticket ID.
    pub id: ResourceId,
    #[serde(default)]
    pub event_id: Option<ResourceId>,
    #[serde(default)]
    pub user_id: Option<ResourceId>,
    #[serde(default)]
    pub price: f64,
    /// Purchase time (ISO 8601).
    #[serde(default)]
    pub purchase_date: Option<String>,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_wire_names() {
        let req = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            phone_number: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert!(json.get("phoneNumber").is_none());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let login = LoginRequest::new("a@b.com", "secret");
        assert!(!format!("{:?}", login).contains("secret"));

        let change = ChangePasswordRequest {
            current_password: "old-secret".into(),
            new_password: "new-secret".into(),
        };
        assert!(!format!("{:?}", change).contains("secret"));
    }

    #[test]
    fn test_ticket_unknown_status() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"id":"a1b2c3d4e5","price":250.0,"status":"Refunded","purchaseDate":"2025-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(ticket.id, ResourceId::from("a1b2c3d4e5"));
        assert_eq!(ticket.status, TicketStatus::Unknown);
        assert_eq!(ticket.purchase_date.as_deref(), Some("2025-05-01T10:00:00Z"));
    }

    #[test]
    fn test_event_tolerates_missing_optional_fields() {
        let event: Event = serde_json::from_str(r#"{"id":7,"title":"Jazz night"}"#).unwrap();
        assert_eq!(event.id, ResourceId::Number(7));
        assert_eq!(event.title, "Jazz night");
        assert_eq!(event.price, 0.0);
        assert!(event.max_tickets.is_none());
    }

    #[test]
    fn test_numeric_ticket_ids() {
        let tickets: Vec<Ticket> = serde_json::from_str(
            r#"[{"id":41,"eventId":7,"userId":"u-1","price":150.0,"status":"Active"}]"#,
        )
        .unwrap();
        assert_eq!(tickets[0].id, ResourceId::Number(41));
        assert_eq!(tickets[0].id.to_string(), "41");
        assert_eq!(tickets[0].event_id, Some(ResourceId::Number(7)));
        assert_eq!(tickets[0].user_id, Some(ResourceId::from("u-1")));
    }
}
