// ABOUTME: Environment-variable fallbacks for CLI flags with built-in defaults
// ABOUTME: Resolution order everywhere is flag > DEXCTL_* environment variable > default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use std::env;

/// Get the OIDC issuer URL from environment or default
#[must_use]
pub fn issuer() -> String {
    env::var("DEXCTL_ISSUER").unwrap_or_else(|_| "http://127.0.0.1:5556/dex".into())
}

/// Get the OAuth2 client id from environment or default
#[must_use]
pub fn client_id() -> String {
    env::var("DEXCTL_CLIENT_ID").unwrap_or_else(|_| "dexctl".into())
}

/// Get the OAuth2 client secret from environment; empty means a public client
#[must_use]
pub fn client_secret() -> String {
    env::var("DEXCTL_CLIENT_SECRET").unwrap_or_default()
}

/// Get the redirect URI from environment or default
///
/// The local callback server binds to this URI's host and port.
#[must_use]
pub fn redirect_uri() -> String {
    env::var("DEXCTL_REDIRECT_URI").unwrap_or_else(|_| "http://127.0.0.1:5555/callback".into())
}

/// Get the administration API base URL from environment or default
#[must_use]
pub fn api_url() -> String {
    env::var("DEXCTL_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5557".into())
}

/// Default scopes requested during sign-in
#[must_use]
pub fn default_scopes() -> Vec<String> {
    parse_scopes("openid,profile,email")
}

/// Parse a comma-separated scope list, trimming whitespace and dropping
/// empty entries
#[must_use]
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Into::into)
        .collect()
}
