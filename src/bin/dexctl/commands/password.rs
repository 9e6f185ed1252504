// ABOUTME: Password store commands for dexctl
// ABOUTME: Lists entries and verifies email/password pairs through the admin API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use anyhow::{bail, Result};

use dexctl::utils;

use super::client::admin_client;

/// List all password entries and pretty-print them.
pub async fn list(api_url: Option<String>) -> Result<()> {
    let admin = admin_client(api_url);

    let passwords = admin.list_passwords().await?;

    println!("{}", utils::pretty_json(&passwords)?);

    Ok(())
}

/// Verify an email/password pair against the provider's store.
///
/// The email is validated locally before any network call; a provider
/// answer of "not verified" is a command failure.
pub async fn verify(api_url: Option<String>, password: &str, email: &str) -> Result<()> {
    let email = utils::parse_email(email)?;

    let admin = admin_client(api_url);

    let response = admin.verify_password(email, password).await?;

    if !response.verified {
        bail!("failed to verify password");
    }

    println!("{}", utils::pretty_json(&response)?);

    Ok(())
}
