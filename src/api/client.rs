//! HTTP client for the DockDineStay REST API.
//!
//! Every resource request flows through this client: it attaches the bearer
//! token to outgoing requests and maps response statuses to `ApiError`. A
//! 401 on any resource request surfaces as `ApiError::Unauthorized`, which
//! the application router treats as credential invalidation. The token
//! issuance request is the one exception: its rejections map to
//! `InvalidCredentials` and never force a logout.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{HotelBooking, HotelRoom, UserAccount, UserUpdate};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Extract the issued token from a nominally successful issuance body. A
/// 2xx reply without an access_token is a malformed issuance, reported
/// distinctly rather than treated as unauthenticated.
fn parse_token_response(body: &str) -> Result<String, ApiError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("token response: {}", e)))?;
    parsed.access_token.ok_or(ApiError::MalformedIssuance)
}

/// API client for the hospitality backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token; subsequent requests go out unauthenticated
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Exchange username/password for a bearer token.
    ///
    /// This is the issuance request: its 400/401 rejections mean bad form
    /// input and are mapped to `InvalidCredentials`, exempt from the global
    /// forced-logout handling.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::from_issuance_status(status, &body));
        }

        parse_token_response(&body)
    }

    // ===== Rooms =====

    pub async fn fetch_rooms(&self) -> Result<Vec<HotelRoom>, ApiError> {
        self.get("/rooms/").await
    }

    /// Replace a room record; used to flip room status. Admin only,
    /// enforced server-side.
    pub async fn update_room(&self, room: &HotelRoom) -> Result<HotelRoom, ApiError> {
        let id = room
            .id
            .as_deref()
            .ok_or_else(|| ApiError::InvalidResponse("room has no id".to_string()))?;
        self.put(&format!("/rooms/{}", id), room).await
    }

    // ===== Bookings =====

    pub async fn fetch_bookings(&self) -> Result<Vec<HotelBooking>, ApiError> {
        self.get("/hotel-bookings/").await
    }

    // ===== Users =====

    pub async fn fetch_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.get("/users/").await
    }

    pub async fn fetch_me(&self) -> Result<UserAccount, ApiError> {
        self.get("/users/me").await
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<UserAccount, ApiError> {
        self.patch(&format!("/users/{}", user_id), update).await
    }

    // ===== Request plumbing =====

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("bad token header: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check a resource response, mapping any non-success status to an
    /// error. This is the single place a resource 401 is classified.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "PUT");

        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "PATCH");

        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuance_body_with_token_parses() {
        let body = r#"{"access_token":"eyJ.abc.def","token_type":"bearer"}"#;
        assert_eq!(parse_token_response(body).unwrap(), "eyJ.abc.def");
    }

    #[test]
    fn issuance_body_without_token_is_malformed() {
        let body = r#"{"token_type":"bearer"}"#;
        assert!(matches!(
            parse_token_response(body),
            Err(ApiError::MalformedIssuance)
        ));
    }

    #[test]
    fn issuance_body_that_is_not_json_is_invalid() {
        assert!(matches!(
            parse_token_response("<html>"),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/".to_string()).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
