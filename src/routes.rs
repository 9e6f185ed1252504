// ABOUTME: HTTP route handlers for the local sign-in callback server
// ABOUTME: Multiplexes login redirect, OAuth2 callback, favicon, and fatal unknown paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

//! Routes for the locally bound sign-in server
//!
//! The server exists for exactly one browser interaction: it redirects
//! `/login` to the provider, resolves the single `/callback` request through
//! [`crate::flow::FlowConfig::resolve`], writes the matching HTML page, and
//! schedules process exit. Handlers are thin; all protocol decisions live in
//! [`crate::flow`].

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{any, get},
    Router,
};
use tracing::{error, info, warn};

use crate::flow::{CallbackRequest, ExchangeOutcome, FlowConfig};
use crate::lifecycle::ExitScheduler;

/// Shared context for the sign-in endpoints.
///
/// Read-only after construction; the handlers never mutate it, so no locking
/// is needed even though the router clones the `Arc` per request.
pub struct SigninContext {
    /// Parameters and collaborators for this run's exchange.
    pub flow: FlowConfig,
    /// Deferred process termination.
    pub exits: ExitScheduler,
}

/// Sign-in routes implementation.
pub struct SigninRoutes;

impl SigninRoutes {
    /// Create all sign-in routes.
    #[must_use]
    pub fn routes(context: SigninContext) -> Router {
        let context = Arc::new(context);
        Router::new()
            .route("/login", get(handle_login))
            .route("/callback", any(handle_callback))
            .route("/favicon.ico", get(handle_favicon))
            .fallback(handle_unknown_path)
            .with_state(context)
    }
}

/// Redirect the browser to the provider's authorization endpoint with this
/// run's state token embedded.
#[allow(clippy::unused_async)]
async fn handle_login(State(context): State<Arc<SigninContext>>) -> Response {
    match context.flow.authorization_redirect() {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            error!("cannot build authorization redirect: {e}");
            context.exits.schedule(1);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("invalid authorization endpoint: {e}"),
            )
                .into_response()
        }
    }
}

/// Resolve the one callback request that decides this process's fate.
///
/// GET carries the provider redirect (authorization code leg), POST carries a
/// form redeeming a refresh token. Anything else is answered with a plain 400
/// and still terminates the process.
async fn handle_callback(
    State(context): State<Arc<SigninContext>>,
    method: Method,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let request = match method {
        Method::GET => CallbackRequest::authorization_code(query.as_deref().unwrap_or_default()),
        Method::POST => CallbackRequest::refresh(&body),
        other => {
            warn!("callback hit with unsupported method: {other}");
            context.exits.schedule(1);
            return (
                StatusCode::BAD_REQUEST,
                format!("method not implemented: {other}"),
            )
                .into_response();
        }
    };

    let outcome = context.flow.resolve(request).await;
    respond(&context, &outcome)
}

/// Browsers request this aggressively; answering 200 keeps it from polluting
/// the fallback path.
#[allow(clippy::unused_async)]
async fn handle_favicon() {}

/// Any path other than the three above means the redirect URI and the server
/// disagree. That is a configuration error, not a user error, so the process
/// terminates after answering 404.
#[allow(clippy::unused_async)]
async fn handle_unknown_path(State(context): State<Arc<SigninContext>>, uri: Uri) -> StatusCode {
    warn!("called unknown URL: {uri}");
    context.exits.schedule(1);
    StatusCode::NOT_FOUND
}

/// Write the page matching the outcome, print credentials on success, and
/// schedule the exit. The exit delay leaves the response time to flush before
/// the process goes away.
fn respond(context: &SigninContext, outcome: &ExchangeOutcome) -> Response {
    if let Some(payload) = outcome.stdout_payload() {
        // stdout is the machine-readable channel; everything else logs to stderr.
        println!("{payload}");
        info!("sign-in complete");
        context.exits.schedule(0);
        return Html(SUCCESS_PAGE).into_response();
    }

    let message = outcome.error_message().unwrap_or_default();
    warn!("sign-in failed: {message}");
    context.exits.schedule(outcome.exit_code());
    Html(error_page(&message)).into_response()
}

const SUCCESS_PAGE: &str = "<!DOCTYPE html>\n\
         <html>\n\
         \x20 <head><title>dexctl - signed in</title></head>\n\
         \x20 <body style='font-family: sans-serif; text-align: center; padding-top: 4em;'>\n\
         \x20   <h1 style='color: #2e7d32;'>Sign-in complete</h1>\n\
         \x20   <p>Your credentials were written to the terminal. You can close this window.</p>\n\
         \x20 </body>\n\
         </html>\n";

fn error_page(message: &str) -> String {
    let message = html_escape::encode_text(message);
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         \x20 <head><title>dexctl - sign-in failed</title></head>\n\
         \x20 <body style='font-family: sans-serif; text-align: center; padding-top: 4em;'>\n\
         \x20   <h1 style='color: #c62828;'>Sign-in failed</h1>\n\
         \x20   <p><code>{message}</code></p>\n\
         \x20 </body>\n\
         </html>\n"
    )
}
