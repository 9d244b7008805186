//! Bearer token decoding and validation.
//!
//! The DockDineStay API issues JWT-shaped bearer tokens whose payload carries
//! the username (`sub`), a stable user id, a role, and an absolute expiry.
//! The client only reads the payload claims; it does NOT verify the token
//! signature. The server independently enforces authorization on every
//! request, so the decoded role is a navigation convenience, not a security
//! boundary.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token expired")]
    Expired,
}

/// User roles as issued by the backend. The wire strings are fixed by the
/// server's role enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "front-desk")]
    FrontDesk,
    #[serde(rename = "back-desk")]
    BackDesk,
    #[serde(rename = "customer")]
    Customer,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::FrontDesk => "Front Desk",
            Role::BackDesk => "Back Desk",
            Role::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Decoded token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: Role,
    /// Expiry as epoch seconds.
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// The principal derived from a valid token. Always recomputed from the
/// token; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Identity {
    fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            username: claims.sub.clone(),
            role: claims.role,
        }
    }
}

/// Decode the payload segment of a bearer token without verifying the
/// signature.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| TokenError::Malformed(format!("claims do not parse: {}", e)))
}

/// Decode a token and check its time bound against `now`.
///
/// Malformed and expired tokens are both invalid to the caller; they only
/// differ in the returned variant so call sites can log them apart. No
/// clock-skew window is applied: `exp <= now` is expired.
pub fn validate(token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
    let claims = decode_claims(token)?;
    match claims.expires_at() {
        Some(expiry) if expiry > now => Ok(Identity::from_claims(&claims)),
        _ => Err(TokenError::Expired),
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use base64::{engine::general_purpose, Engine as _};

    /// Build a structurally valid unsigned token for tests. The signature
    /// segment is garbage, which is fine: the decoder never reads it.
    pub fn make_token(sub: &str, user_id: &str, role: &str, exp: i64) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!(
            r#"{{"sub":"{}","user_id":"{}","role":"{}","exp":{}}}"#,
            sub, user_id, role, exp
        ));
        format!("{}.{}.sig", header, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::test_tokens::make_token;
    use super::*;

    #[test]
    fn valid_token_yields_matching_identity() {
        let exp = Utc::now().timestamp() + 3600;
        let token = make_token("frontdesk1", "64f0a1b2c3d4e5f6a7b8c9d0", "front-desk", exp);

        let identity = validate(&token, Utc::now()).unwrap();
        assert_eq!(identity.username, "frontdesk1");
        assert_eq!(identity.user_id, "64f0a1b2c3d4e5f6a7b8c9d0");
        assert_eq!(identity.role, Role::FrontDesk);
    }

    #[test]
    fn expired_token_is_invalid() {
        let exp = Utc::now().timestamp() - 60;
        let token = make_token("admin1", "1", "admin", exp);

        assert_eq!(validate(&token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let token = make_token("admin1", "1", "admin", now.timestamp());

        // exp == now counts as expired; no skew window
        assert_eq!(validate(&token, now), Err(TokenError::Expired));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        assert!(matches!(
            validate("not-a-token", Utc::now()),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            validate("a.%%%.c", Utc::now()),
            Err(TokenError::Malformed(_))
        ));

        // Valid base64 but not a claims object
        let junk = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(matches!(
            validate(&format!("h.{}.s", junk), Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_role_is_invalid() {
        let exp = Utc::now().timestamp() + 3600;
        let token = make_token("x", "1", "superuser", exp);
        assert!(matches!(
            validate(&token, Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn role_wire_format_round_trips() {
        for (role, wire) in [
            (Role::Admin, "\"admin\""),
            (Role::FrontDesk, "\"front-desk\""),
            (Role::BackDesk, "\"back-desk\""),
            (Role::Customer, "\"customer\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), wire);
            assert_eq!(serde_json::from_str::<Role>(wire).unwrap(), role);
        }
    }
}
