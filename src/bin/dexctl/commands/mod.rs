// ABOUTME: Re-exports command modules for dexctl
// ABOUTME: Provides the signin, client, and password command implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

pub mod client;
pub mod password;
pub mod signin;

use anyhow::{bail, Result};

/// Shared failure for subcommands that exist in the tree but have no
/// implemented operation.
pub fn not_available() -> Result<()> {
    bail!("command not available")
}
