// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides recording exits, stub verifiers, and mock provider/admin servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unused_async
)]
//! Shared test utilities for `dexctl`
//!
//! Fixtures here replace the two process-level effects the flow has — exiting
//! and talking to the provider — with observable in-process doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Notify;

use dexctl::flow::{FlowConfig, IdentityMode};
use dexctl::lifecycle::{ExitScheduler, ProcessExit};
use dexctl::oauth2_client::{OAuth2Client, OAuth2Config};
use dexctl::oidc::{Audience, IdTokenClaims, IdTokenVerifier, ProviderMetadata, VerifyError};

pub const TEST_STATE: &str = "test-state-token";
pub const TEST_CLIENT_ID: &str = "dexctl-tests";

// ============================================================================
// Process exit recording
// ============================================================================

/// Records exit codes instead of ending the test process.
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
    fired: Notify,
}

impl RecordingExit {
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(Vec::new()),
            fired: Notify::new(),
        }
    }

    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }

    /// Wait until at least one exit has been recorded.
    pub async fn wait_fired(&self) {
        if !self.codes().is_empty() {
            return;
        }
        tokio::time::timeout(Duration::from_secs(2), self.fired.notified())
            .await
            .expect("no exit was scheduled");
    }
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
        // notify_one keeps a permit if nobody is waiting yet
        self.fired.notify_one();
    }
}

/// A scheduler with no delay whose exits are recorded, not executed.
pub fn recording_scheduler() -> (ExitScheduler, Arc<RecordingExit>) {
    let exit = Arc::new(RecordingExit::new());
    let scheduler = ExitScheduler::new(Duration::ZERO, exit.clone());
    (scheduler, exit)
}

// ============================================================================
// Verifier stubs
// ============================================================================

/// Accepts every token with a fixed set of claims.
pub struct AcceptAllVerifier;

impl IdTokenVerifier for AcceptAllVerifier {
    fn verify(&self, _raw_token: &str) -> Result<IdTokenClaims, VerifyError> {
        Ok(IdTokenClaims {
            iss: "http://127.0.0.1:5556/dex".to_owned(),
            sub: "test-subject".to_owned(),
            aud: Audience::Single(TEST_CLIENT_ID.to_owned()),
            exp: 4_102_444_800,
            iat: None,
            at_hash: None,
            email: Some("admin@example.com".to_owned()),
            email_verified: Some(true),
            name: None,
        })
    }
}

/// Rejects every token as if its signature did not check out.
pub struct RejectAllVerifier;

impl IdTokenVerifier for RejectAllVerifier {
    fn verify(&self, _raw_token: &str) -> Result<IdTokenClaims, VerifyError> {
        Err(VerifyError::Rejected(
            jsonwebtoken::errors::ErrorKind::InvalidSignature.into(),
        ))
    }
}

// ============================================================================
// Mock identity provider
// ============================================================================

/// Handle to a provider double serving token and userinfo endpoints on an
/// ephemeral local port.
pub struct MockProvider {
    pub base_url: String,
    pub token_hits: Arc<AtomicUsize>,
    pub userinfo_hits: Arc<AtomicUsize>,
    /// Raw urlencoded bodies received by the token endpoint, in order.
    pub token_requests: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn token_hit_count(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn userinfo_hit_count(&self) -> usize {
        self.userinfo_hits.load(Ordering::SeqCst)
    }

    pub fn token_request_bodies(&self) -> Vec<String> {
        self.token_requests.lock().unwrap().clone()
    }

    /// Provider metadata pointing at this double's endpoints.
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            issuer: self.base_url.clone(),
            authorization_endpoint: format!("{}/auth", self.base_url),
            token_endpoint: format!("{}/token", self.base_url),
            userinfo_endpoint: Some(format!("{}/userinfo", self.base_url)),
            jwks_uri: format!("{}/keys", self.base_url),
        }
    }
}

#[derive(Clone)]
struct ProviderState {
    token_status: StatusCode,
    token_response: Arc<serde_json::Value>,
    token_hits: Arc<AtomicUsize>,
    token_requests: Arc<Mutex<Vec<String>>>,
    userinfo_status: StatusCode,
    userinfo_response: Arc<serde_json::Value>,
    userinfo_hits: Arc<AtomicUsize>,
}

async fn mock_token_endpoint(
    State(state): State<ProviderState>,
    body: String,
) -> impl IntoResponse {
    state.token_hits.fetch_add(1, Ordering::SeqCst);
    state.token_requests.lock().unwrap().push(body);
    (state.token_status, Json((*state.token_response).clone()))
}

async fn mock_userinfo_endpoint(State(state): State<ProviderState>) -> impl IntoResponse {
    state.userinfo_hits.fetch_add(1, Ordering::SeqCst);
    (state.userinfo_status, Json((*state.userinfo_response).clone()))
}

/// Spawn a provider double with the given canned responses.
pub async fn spawn_provider(
    token_status: u16,
    token_response: serde_json::Value,
    userinfo_status: u16,
    userinfo_response: serde_json::Value,
) -> MockProvider {
    let token_hits = Arc::new(AtomicUsize::new(0));
    let userinfo_hits = Arc::new(AtomicUsize::new(0));
    let token_requests = Arc::new(Mutex::new(Vec::new()));

    let state = ProviderState {
        token_status: StatusCode::from_u16(token_status).unwrap(),
        token_response: Arc::new(token_response),
        token_hits: token_hits.clone(),
        token_requests: token_requests.clone(),
        userinfo_status: StatusCode::from_u16(userinfo_status).unwrap(),
        userinfo_response: Arc::new(userinfo_response),
        userinfo_hits: userinfo_hits.clone(),
    };

    let app = Router::new()
        .route("/token", post(mock_token_endpoint))
        .route("/userinfo", get(mock_userinfo_endpoint))
        .with_state(state);

    let base_url = spawn_server(app).await;

    MockProvider {
        base_url,
        token_hits,
        userinfo_hits,
        token_requests,
    }
}

/// A token response with every field a success path needs.
pub fn full_token_response() -> serde_json::Value {
    serde_json::json!({
        "access_token": "test-access-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "test-refresh-token",
        "scope": "openid profile email",
        "id_token": "header.payload.signature"
    })
}

/// Flow configuration wired to the provider double.
pub fn flow_for(provider: &MockProvider, mode: IdentityMode) -> FlowConfig {
    let config = OAuth2Config {
        client_id: TEST_CLIENT_ID.to_owned(),
        client_secret: String::new(),
        auth_url: format!("{}/auth", provider.base_url),
        token_url: format!("{}/token", provider.base_url),
        redirect_uri: "http://127.0.0.1:5555/callback".to_owned(),
        scopes: vec!["openid".to_owned(), "profile".to_owned()],
    };
    FlowConfig::new(
        TEST_STATE.to_owned(),
        OAuth2Client::new(config),
        provider.metadata(),
        mode,
    )
}

// ============================================================================
// Server spawning
// ============================================================================

/// Bind an ephemeral local port, serve the router on it, and return the base
/// URL. The server task lives until the test process ends.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
