// ABOUTME: Library entry point for the dexctl identity-provider companion CLI
// ABOUTME: Exposes the sign-in flow state machine, OIDC plumbing, and admin API client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

#![deny(unsafe_code)]

//! # dexctl
//!
//! A command-line companion for a Dex OpenID Connect identity provider.
//!
//! The interesting part is the interactive sign-in: `dexctl signin` binds a
//! short-lived HTTP server to the configured redirect URI, sends the browser
//! through the provider's Authorization Code flow, exchanges the returned
//! code (or a posted refresh token) for a token set, verifies the ID token
//! (or resolves user-info instead), prints the credential as JSON to stdout,
//! and exits with `0` on success or `1` on any failure. The exit happens on
//! a short delay so the result page reaches the browser first.
//!
//! Everything else is plumbing around the provider's administration API:
//! registering OAuth2 clients and listing/verifying password entries.
//!
//! ## Architecture
//!
//! - **`flow`**: the exchange state machine, independent of HTTP transport
//! - **`routes`**: the axum adapter serving `/login` and `/callback`
//! - **`lifecycle`**: delayed process exit with an injectable exit primitive
//! - **`oauth2_client`** / **`oidc`**: token endpoint and discovery/verifier
//!   collaborators
//! - **`admin`**: JSON client for the provider's administration API

/// JSON client for the identity provider's administration API
pub mod admin;

/// Environment-variable fallbacks for CLI flags
pub mod config;

/// Exchange state machine for the browser sign-in flow
pub mod flow;

/// Delayed process exit with an injectable exit primitive
pub mod lifecycle;

/// Logging initialization built on `tracing`
pub mod logging;

/// OAuth2 token endpoint client and token response model
pub mod oauth2_client;

/// OIDC discovery and ID-token verification
pub mod oidc;

/// HTTP routes for the local callback server
pub mod routes;

/// JSON pretty-printing, random defaults, and small parsers
pub mod utils;
