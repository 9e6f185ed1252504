// ABOUTME: The signin command: discovery, verifier setup, and the local callback server
// ABOUTME: Binds to the redirect URI's host:port and serves one browser exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;
use uuid::Uuid;

use dexctl::config;
use dexctl::flow::{FlowConfig, IdentityMode};
use dexctl::lifecycle::ExitScheduler;
use dexctl::oauth2_client::{OAuth2Client, OAuth2Config};
use dexctl::oidc::{self, JwksVerifier};
use dexctl::routes::{SigninContext, SigninRoutes};

/// Run the interactive sign-in flow.
///
/// Only returns on setup failure. Once the callback server is listening,
/// the browser exchange decides the process exit through the lifecycle
/// scheduler and this function never completes normally.
pub async fn run(
    issuer: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    scopes: Option<String>,
    userinfo: bool,
    no_browser: bool,
) -> Result<()> {
    let issuer = issuer.unwrap_or_else(config::issuer);
    let client_id = client_id.unwrap_or_else(config::client_id);
    let client_secret = client_secret.unwrap_or_else(config::client_secret);
    let redirect_uri = redirect_uri.unwrap_or_else(config::redirect_uri);
    let scopes = scopes.map_or_else(config::default_scopes, |s| config::parse_scopes(&s));

    let http = reqwest::Client::new();

    let provider = oidc::discover(&http, &issuer)
        .await
        .with_context(|| format!("failed to discover provider at {issuer}"))?;
    info!("discovered provider endpoints for {issuer}");

    // In userinfo mode no ID token is ever verified, so the JWKS fetch is
    // skipped entirely.
    let mode = if userinfo {
        IdentityMode::UserInfo
    } else {
        let verifier = JwksVerifier::from_metadata(&http, &provider, &client_id)
            .await
            .context("failed to fetch the provider's signing keys")?;
        IdentityMode::IdToken(Arc::new(verifier))
    };

    let oauth2 = OAuth2Client::new(OAuth2Config {
        client_id,
        client_secret,
        auth_url: provider.authorization_endpoint.clone(),
        token_url: provider.token_endpoint.clone(),
        redirect_uri: redirect_uri.clone(),
        scopes,
    });

    let state = Uuid::new_v4().to_string();
    let flow = FlowConfig::new(state, oauth2, provider, mode);

    let callback = Url::parse(&redirect_uri)
        .with_context(|| format!("invalid redirect URI: {redirect_uri}"))?;
    let host = callback.host_str().context("redirect URI has no host")?;
    let port = callback
        .port_or_known_default()
        .context("redirect URI has no port")?;
    let bind_addr = format!("{host}:{port}");
    let login_url = format!("http://{bind_addr}/login");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind callback listener on {bind_addr}"))?;
    info!("callback server listening on {bind_addr}");

    let app = SigninRoutes::routes(SigninContext {
        flow,
        exits: ExitScheduler::with_os_exit(),
    });

    // Prompts go to stderr; stdout is reserved for the credential document.
    eprintln!("Open this URL in your browser to sign in:");
    eprintln!("  {login_url}");
    if !no_browser && open::that(&login_url).is_ok() {
        eprintln!("(browser opened automatically)");
    }

    axum::serve(listener, app)
        .await
        .context("callback server error")?;

    Ok(())
}
