//! Bearer credentials and the identity claims embedded in them.
//!
//! Credentials are compact JWTs (`header.payload.signature`). The client never
//! verifies the signature or the expiry; the backends do. Decoding only needs
//! the claims for display and route gating.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MalformedCredential;

/// An opaque bearer token issued by the identity service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this credential.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decode the claims carried by this credential.
    pub fn identity(&self) -> Result<Identity, MalformedCredential> {
        decode(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Subject identifier. Backends use either numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Number(n) => write!(f, "{}", n),
            SubjectId::Text(s) => f.write_str(s),
        }
    }
}

/// Claims describing the current user.
///
/// Built either from a decoded credential or from the `user` object the
/// identity service returns on login. `claims` holds the object exactly as
/// received; the typed fields are read from it only when the claim has the
/// expected JSON type, so no claim value can make an identity unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "serde_json::Map<String, serde_json::Value>",
    into = "serde_json::Map<String, serde_json::Value>"
)]
pub struct Identity {
    /// Subject, from `id`, `sub`, `nameid` or `userId`.
    pub id: Option<SubjectId>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: Option<i64>,
    /// Every claim as received.
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// Claim names that carry the subject id, in order of preference.
const ID_CLAIMS: [&str; 4] = ["id", "sub", "nameid", "userId"];

impl Identity {
    /// Build an identity from an arbitrary JSON object of claims.
    pub fn from_claims(claims: serde_json::Map<String, serde_json::Value>) -> Self {
        let text = |key: &str| claims.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let id = ID_CLAIMS
            .iter()
            .find_map(|key| claims.get(*key).and_then(subject_id));
        let exp = claims.get("exp").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
        });

        let email = text("email");
        let first_name = text("firstName");
        let last_name = text("lastName");
        let name = text("name");
        let role = text("role");

        Self {
            id,
            email,
            first_name,
            last_name,
            name,
            role,
            exp,
            claims,
        }
    }

    /// Record an expiry learned elsewhere, when the claims carry none.
    pub fn fill_expiry(&mut self, exp: i64) {
        if self.exp.is_none() {
            self.exp = Some(exp);
            self.claims
                .entry("exp")
                .or_insert_with(|| serde_json::Value::from(exp));
        }
    }

    /// Name to show in the UI.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .name
                .clone()
                .or_else(|| self.email.clone())
                .unwrap_or_else(|| "unknown user".to_string()),
        }
    }

    /// Expiry as a timestamp, if the credential carried one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether the embedded expiry lies before `now`.
    ///
    /// Informational only; nothing in the session layer rejects on it.
    pub fn looks_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Decode the identity claims of a raw credential.
///
/// Fails only on structure: wrong segment count, payload that is not base64url,
/// or a payload that is not a JSON object. Expired credentials decode fine.
pub fn decode(raw: &str) -> Result<Identity, MalformedCredential> {
    let raw = raw.trim();
    let mut segments = raw.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(MalformedCredential::Shape);
    };

    if header.is_empty() || payload.is_empty() {
        return Err(MalformedCredential::Shape);
    }

    let bytes = decode_segment(payload)?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| MalformedCredential::Json(e.to_string()))?;

    match value {
        serde_json::Value::Object(claims) => Ok(Identity::from_claims(claims)),
        _ => Err(MalformedCredential::Json(
            "payload is not a JSON object".to_string(),
        )),
    }
}

fn subject_id(value: &serde_json::Value) -> Option<SubjectId> {
    match value {
        serde_json::Value::String(s) => Some(SubjectId::Text(s.clone())),
        serde_json::Value::Number(n) => n.as_i64().map(SubjectId::Number),
        _ => None,
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Identity {
    fn from(claims: serde_json::Map<String, serde_json::Value>) -> Self {
        Identity::from_claims(claims)
    }
}

impl From<Identity> for serde_json::Map<String, serde_json::Value> {
    fn from(identity: Identity) -> Self {
        identity.claims
    }
}

/// base64url, with or without padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>, MalformedCredential> {
    let engine = if segment.ends_with('=') {
        &URL_SAFE
    } else {
        &URL_SAFE_NO_PAD
    };
    engine
        .decode(segment)
        .map_err(|e| MalformedCredential::Encoding(e.to_string()))
}

/// Produce an unsigned credential carrying `claims`, the way the identity
/// service would minus the signature. Used to simulate the backend.
pub fn encode_unsigned(claims: &serde_json::Value) -> Credential {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = URL_SAFE_NO_PAD.encode(b"unsigned");
    Credential::new(format!("{}.{}.{}", header, payload, signature))
}
