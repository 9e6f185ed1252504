// ABOUTME: Client management commands for dexctl
// ABOUTME: Registers OAuth2 clients through the provider's admin API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use anyhow::{bail, Result};

use dexctl::admin::{AdminClient, AdminConfig, DexClient};
use dexctl::config;
use dexctl::utils;

/// Register an OAuth2 client, generating the id and secret where the
/// caller left the sentinel defaults in place.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    api_url: Option<String>,
    id: &str,
    name: String,
    secret: &str,
    redirect_uris: Vec<String>,
    logo_url: Option<String>,
    trusted_peers: Vec<String>,
    public: bool,
) -> Result<()> {
    let id = utils::parse_random_uuid(id);
    let secret = utils::parse_random_string(secret, utils::CLIENT_SECRET_LEN);

    let admin = admin_client(api_url);

    let client = DexClient {
        id,
        secret,
        name,
        redirect_uris,
        logo_url,
        trusted_peers,
        public,
    };

    let response = admin.create_client(&client).await?;

    if response.already_exists {
        bail!("client already exists");
    }

    // The response echoes the generated id and secret so the operator can
    // record them.
    println!("{}", utils::pretty_json(&response)?);

    Ok(())
}

pub(super) fn admin_client(api_url: Option<String>) -> AdminClient {
    AdminClient::new(AdminConfig {
        base_url: api_url.unwrap_or_else(config::api_url),
        ..AdminConfig::default()
    })
}
