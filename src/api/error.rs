use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The token endpoint rejected the submitted username/password. This is
    /// a login-form error, never a reason to tear down an existing session.
    #[error("Invalid username or password")]
    InvalidCredentials(String),

    /// The token endpoint answered 2xx but the body carried no access_token.
    #[error("Malformed issuance response: no access_token in reply")]
    MalformedIssuance,

    /// 401 on a resource request: the server no longer accepts the token.
    #[error("Unauthorized - token rejected by server")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data around.
    /// Bodies are arbitrary server text, so the cut must land on a char
    /// boundary.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Map a non-success status on a resource request to an error.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Map a non-success status on the token endpoint itself. A rejection
    /// here means bad login-form input, which must not look like a
    /// mid-session token rejection.
    pub fn from_issuance_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 401 => ApiError::InvalidCredentials(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True only for the mid-session rejection that forces logout.
    pub fn forces_logout(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn resource_401_forces_logout() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(err.forces_logout());
    }

    #[test]
    fn issuance_401_is_exempt_from_forced_logout() {
        let err = ApiError::from_issuance_status(StatusCode::UNAUTHORIZED, "bad password");
        assert!(matches!(err, ApiError::InvalidCredentials(_)));
        assert!(!err.forces_logout());

        let err = ApiError::from_issuance_status(
            StatusCode::BAD_REQUEST,
            "Incorrect username or password",
        );
        assert!(!err.forces_logout());
    }

    #[test]
    fn other_statuses_pass_through_without_logout() {
        for (status, check) in [
            (StatusCode::FORBIDDEN, true),
            (StatusCode::NOT_FOUND, true),
            (StatusCode::INTERNAL_SERVER_ERROR, true),
        ] {
            let err = ApiError::from_status(status, "detail");
            assert!(check);
            assert!(!err.forces_logout());
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::NOT_FOUND, &body);
        let msg = err.to_string();
        assert!(msg.len() < 700);
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn multibyte_bodies_truncate_without_panicking() {
        // One leading ASCII byte shifts every following 2-byte char off the
        // even boundaries, so a naive byte slice at the limit would panic
        let body = format!("a{}", "é".repeat(300));
        let err = ApiError::from_status(StatusCode::NOT_FOUND, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(msg.len() < 700);
    }
}
