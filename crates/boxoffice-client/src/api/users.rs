//! Profile endpoints on the identity service.

use crate::client::ServiceClient;
use crate::error::Result;
use crate::types::{ChangePasswordRequest, UserProfile};

/// Users API client.
pub struct UsersApi {
    client: ServiceClient,
}

impl UsersApi {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Fetch the profile of the authenticated user.
    pub async fn profile(&self) -> Result<UserProfile> {
        self.client.get("users/profile").await
    }

    /// Rotate the password of the authenticated user.
    ///
    /// Returns whatever the backend sends back (often a confirmation string).
    pub async fn change_password(
        &self,
        current_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Result<serde_json::Value> {
        let request = ChangePasswordRequest {
            current_password: current_password.into(),
            new_password: new_password.into(),
        };
        self.client.put("users/change-password", &request).await
    }
}
