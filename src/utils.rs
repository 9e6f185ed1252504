// ABOUTME: Small shared helpers: JSON pretty-printing, random flag defaults, email parsing
// ABOUTME: Backs the flag-defaulting behavior of the client and password commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use anyhow::{anyhow, Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Sentinel default for id flags; replaced by a fresh UUID v4 at run time.
pub const RANDOM_UUID_SENTINEL: &str = "random UUID";

/// Sentinel default for secret flags; replaced by a random string at run time.
pub const RANDOM_STRING_SENTINEL: &str = "random string";

/// Length of generated client secrets.
pub const CLIENT_SECRET_LEN: usize = 40;

/// Serialize a value as indented JSON for terminal output.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize value as JSON")
}

/// Resolve an id flag: the sentinel becomes a fresh UUID v4, anything else
/// passes through unchanged.
#[must_use]
pub fn parse_random_uuid(value: &str) -> String {
    if value == RANDOM_UUID_SENTINEL {
        Uuid::new_v4().to_string()
    } else {
        value.to_owned()
    }
}

/// Resolve a secret flag: the sentinel becomes a random alphanumeric string
/// of `len` characters, anything else passes through unchanged.
#[must_use]
pub fn parse_random_string(value: &str, len: usize) -> String {
    if value == RANDOM_STRING_SENTINEL {
        random_string(len)
    } else {
        value.to_owned()
    }
}

/// Generate a random alphanumeric string of `len` characters.
#[must_use]
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Validate an email address of the plain `local@domain` form.
///
/// This mirrors what the password store expects as a key; display names and
/// quoted local parts are rejected.
///
/// # Errors
///
/// Returns an error describing why the address is not acceptable.
pub fn parse_email(address: &str) -> Result<&str> {
    let (local, domain) = address
        .split_once('@')
        .ok_or_else(|| anyhow!("invalid email address: '{address}'"))?;
    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || address.chars().any(char::is_whitespace)
        || address.matches('@').count() != 1
    {
        return Err(anyhow!("invalid email address: '{address}'"));
    }
    Ok(address)
}
