// ABOUTME: HTTP client for the identity provider's administrative API
// ABOUTME: Covers OAuth2 client registration and password inspection endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

//! Admin API client
//!
//! The provider exposes its administrative surface on a separate port from
//! the public OIDC endpoints. This client covers the three operations the
//! CLI needs: registering an OAuth2 client, listing password entries, and
//! verifying an email/password pair.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The request never produced a response.
    #[error("admin API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("admin API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("failed to decode admin API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Admin API configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the admin API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5557".to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// An OAuth2 client record as the provider stores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexClient {
    /// Client identifier.
    pub id: String,
    /// Client secret; empty for public clients.
    pub secret: String,
    /// Human-readable name.
    pub name: String,
    /// Redirect URIs accepted for this client.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Logo shown on consent screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Client IDs allowed to mint tokens audienced to this client.
    #[serde(default)]
    pub trusted_peers: Vec<String>,
    /// Whether this is a public client (no secret).
    #[serde(default)]
    pub public: bool,
}

/// Response to a client registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientResponse {
    /// The stored record, echoed back. Absent when the id was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<DexClient>,
    /// Set when a client with the requested id already exists.
    #[serde(default)]
    pub already_exists: bool,
}

/// One password entry from the provider's local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Password {
    /// Login email.
    pub email: String,
    /// Display username.
    #[serde(default)]
    pub username: String,
    /// Stable user identifier.
    #[serde(default)]
    pub user_id: String,
    /// Password hash, if the API exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListPasswordsResponse {
    #[serde(default)]
    passwords: Vec<Password>,
}

/// Response to a password verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    /// Whether the supplied password matched.
    #[serde(default)]
    pub verified: bool,
    /// Whether the email has no password entry at all.
    #[serde(default)]
    pub not_found: bool,
}

/// Client for the provider's admin API.
pub struct AdminClient {
    config: AdminConfig,
    client: Client,
}

impl AdminClient {
    /// Create a new admin API client.
    #[must_use]
    pub fn new(mut config: AdminConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        Self { config, client }
    }

    /// Register an OAuth2 client.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the response is not valid JSON.
    pub async fn create_client(
        &self,
        client: &DexClient,
    ) -> Result<CreateClientResponse, AdminError> {
        let url = format!("{}/api/v2/clients", self.config.base_url);
        let response = self.client.post(&url).json(client).send().await?;
        Self::decode(response).await
    }

    /// List all password entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the response is not valid JSON.
    pub async fn list_passwords(&self) -> Result<Vec<Password>, AdminError> {
        let url = format!("{}/api/v2/passwords", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        let decoded: ListPasswordsResponse = Self::decode(response).await?;
        Ok(decoded.passwords)
    }

    /// Check an email/password pair against the provider's store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the response is not valid JSON.
    pub async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<VerifyPasswordResponse, AdminError> {
        let url = format!("{}/api/v2/passwords/verify", self.config.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response = self.client.post(&url).json(&body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AdminError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AdminError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
