// ABOUTME: Logging initialization with env-filter based level control
// ABOUTME: Logs go to stderr; stdout is reserved for the credential JSON payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use anyhow::Result;
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber from the environment.
///
/// `RUST_LOG` selects the base level (default `info`). Transport noise from
/// hyper and reqwest is capped at `warn` regardless, so a debug run shows the
/// flow decisions rather than socket chatter.
///
/// # Errors
///
/// Returns an error if the subscriber fails to install (for example when a
/// subscriber was already set by the caller).
pub fn init_from_env() -> Result<()> {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    let filter = EnvFilter::new(&level)
        .add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            format!("dexctl={level}")
                .parse()
                .unwrap_or_else(|_| tracing::Level::INFO.into()),
        );

    // stdout carries the token/user-info JSON on success, so every log line
    // must stay off it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
