// ABOUTME: OAuth2 client for the provider's token endpoint: code exchange and refresh
// ABOUTME: Token responses keep the raw id_token so the credential can be printed whole
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Errors from the token and userinfo endpoints.
#[derive(Debug, thiserror::Error)]
pub enum OAuth2Error {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("userinfo endpoint returned {status}: {body}")]
    UserInfo { status: u16, body: String },

    #[error("token is expired and carries no refresh_token")]
    NoRefreshToken,
}

/// Static OAuth2 settings for one sign-in run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// A token set as returned by the token endpoint.
///
/// Serializes to the exact JSON printed on stdout after a successful
/// sign-in: `access_token`, `token_type`, and whichever of `expires_in`,
/// `refresh_token`, `scope`, and `id_token` the provider supplied.
/// `expires_at` is derived local bookkeeping and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuth2Token {
    /// Build a token that exists only to force a refresh exchange: the
    /// expiry sits one hour in the past, so `fresh_token` must redeem the
    /// refresh token before the token can be used.
    #[must_use]
    pub fn forcing_refresh(refresh_token: String) -> Self {
        Self {
            access_token: String::new(),
            token_type: String::new(),
            expires_in: None,
            refresh_token: Some(refresh_token),
            scope: None,
            id_token: None,
            expires_at: Some(Utc::now() - Duration::hours(1)),
        }
    }

    /// A token with no expiry never expires.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

/// Client for the provider's token and userinfo endpoints.
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Build the authorization URL the browser is redirected to, carrying
    /// the anti-CSRF state token.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL is malformed.
    pub fn authorization_url(&self, state: &str) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.config.auth_url)?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);

        Ok(url.into())
    }

    /// Exchange an authorization code for a token set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint answers
    /// non-2xx.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Token, OAuth2Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        self.request_token(&params).await
    }

    /// Redeem a refresh token for a new token set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint answers
    /// non-2xx.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, OAuth2Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        self.request_token(&params).await
    }

    /// Return the token unchanged while it is still valid; once expired,
    /// redeem its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is expired without a refresh token, or
    /// if the refresh exchange fails.
    pub async fn fresh_token(&self, token: OAuth2Token) -> Result<OAuth2Token, OAuth2Error> {
        if !token.is_expired() {
            return Ok(token);
        }
        let refresh = token.refresh_token.ok_or(OAuth2Error::NoRefreshToken)?;
        self.refresh_token(&refresh).await
    }

    /// Fetch the userinfo document with the token's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint answers
    /// non-2xx.
    pub async fn fetch_userinfo(
        &self,
        userinfo_endpoint: &str,
        access_token: &str,
    ) -> Result<serde_json::Value, OAuth2Error> {
        let response = self
            .client
            .get(userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuth2Error::UserInfo {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<OAuth2Token, OAuth2Error> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuth2Error::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let mut token: OAuth2Token = response.json().await?;
        token.expires_at = token
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(i64::try_from(seconds).unwrap_or(3600)));

        Ok(token)
    }
}
