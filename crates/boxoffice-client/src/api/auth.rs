//! Login and registration on the identity service.

use crate::client::ServiceClient;
use crate::error::Result;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

/// Auth API client.
pub struct AuthApi {
    client: ServiceClient,
}

impl AuthApi {
    pub(crate) fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Exchange email and password for a credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.client.post("auth/login", request).await
    }

    /// Create an account; the response carries a credential for it.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.client.post("auth/register", request).await
    }
}
