// ABOUTME: The sign-in exchange state machine, independent of the HTTP transport
// ABOUTME: Resolves one callback request into exactly one terminal ExchangeOutcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use crate::oauth2_client::{OAuth2Client, OAuth2Token};
use crate::oidc::{IdTokenVerifier, ProviderMetadata};
use std::sync::Arc;
use tracing::info;

/// What the success path resolves: ID-token verification or a user-info
/// lookup. The two are mutually exclusive for a run, so the verifier only
/// exists in the mode that uses it.
pub enum IdentityMode {
    /// Verify the token response's ID token with the given verifier.
    IdToken(Arc<dyn IdTokenVerifier>),
    /// Fetch the userinfo document instead; the ID token is ignored.
    UserInfo,
}

/// Immutable parameters for one sign-in attempt.
///
/// Constructed once at process start and shared read-only with the request
/// handlers; the anti-CSRF `state` is generated before the login redirect
/// is ever issued and never changes afterwards.
pub struct FlowConfig {
    state: String,
    oauth2: OAuth2Client,
    provider: ProviderMetadata,
    mode: IdentityMode,
}

/// One parsed callback request, decoupled from the HTTP layer.
#[derive(Debug, Clone)]
pub enum CallbackRequest {
    /// GET leg: the provider redirected the browser back.
    AuthorizationCode {
        code: Option<String>,
        state: Option<String>,
        error: Option<String>,
        error_description: Option<String>,
        raw_query: String,
    },
    /// POST leg: a form submission redeeming a refresh token.
    Refresh {
        refresh_token: Option<String>,
        raw_body: String,
    },
}

impl CallbackRequest {
    /// Parse the GET leg from a raw query string.
    #[must_use]
    pub fn authorization_code(raw_query: &str) -> Self {
        Self::AuthorizationCode {
            code: form_value(raw_query, "code"),
            state: form_value(raw_query, "state"),
            error: form_value(raw_query, "error"),
            error_description: form_value(raw_query, "error_description"),
            raw_query: raw_query.to_owned(),
        }
    }

    /// Parse the POST leg from a urlencoded form body.
    #[must_use]
    pub fn refresh(raw_body: &str) -> Self {
        Self::Refresh {
            refresh_token: form_value(raw_body, "refresh_token"),
            raw_body: raw_body.to_owned(),
        }
    }
}

// Empty values behave like absent ones, matching how HTML forms submit
// untouched fields.
fn form_value(encoded: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// The terminal result of one callback request. Exactly one outcome is
/// produced per request; the server never retries a failed exchange.
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// The provider answered the authorization request with an error.
    AuthorizationError {
        /// `error` and `error_description` joined as `error: description`.
        message: String,
    },
    /// The GET leg arrived without a `code` parameter.
    MissingCode {
        /// The query string as received, for the error page.
        raw_query: String,
    },
    /// The `state` parameter did not byte-match this run's token.
    StateMismatch,
    /// The POST leg arrived without a `refresh_token` form field.
    MissingRefreshToken {
        /// The form body as received, for the error page.
        raw_body: String,
    },
    /// The token endpoint refused the code or refresh exchange.
    ExchangeFailure {
        /// Endpoint answer or transport error.
        cause: String,
    },
    /// The token response carried no `id_token` to verify.
    MissingIdToken,
    /// The ID token failed signature or claims validation.
    TokenVerificationFailure {
        /// Verifier error.
        cause: String,
    },
    /// The userinfo document could not be resolved.
    UserInfoFailure {
        /// Endpoint answer or transport error.
        cause: String,
    },
    /// The credential is verified and ready to print.
    Success {
        /// Token response or userinfo document, printed to stdout.
        payload: serde_json::Value,
    },
}

impl ExchangeOutcome {
    /// Process exit code this outcome maps to.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!matches!(self, Self::Success { .. }))
    }

    /// Message for the browser-facing error page; `None` for success.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::AuthorizationError { message } => Some(message.clone()),
            Self::MissingCode { raw_query } => Some(format!("no code in request: {raw_query:?}")),
            Self::StateMismatch => Some("state mismatch".into()),
            Self::MissingRefreshToken { raw_body } => {
                Some(format!("no refresh_token in request: {raw_body:?}"))
            }
            Self::ExchangeFailure { cause } => Some(format!("failed to get token: {cause}")),
            Self::MissingIdToken => Some("no id_token in token response".into()),
            Self::TokenVerificationFailure { cause } => {
                Some(format!("failed to verify ID token: {cause}"))
            }
            Self::UserInfoFailure { cause } => Some(format!("failed to fetch user info: {cause}")),
            Self::Success { .. } => None,
        }
    }

    /// The credential document to print on stdout; `None` unless successful.
    #[must_use]
    pub fn stdout_payload(&self) -> Option<String> {
        match self {
            Self::Success { payload } => serde_json::to_string_pretty(payload).ok(),
            _ => None,
        }
    }
}

impl FlowConfig {
    #[must_use]
    pub fn new(
        state: String,
        oauth2: OAuth2Client,
        provider: ProviderMetadata,
        mode: IdentityMode,
    ) -> Self {
        Self {
            state,
            oauth2,
            provider,
            mode,
        }
    }

    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// The provider URL the login stage redirects to, with this run's state
    /// token embedded.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is not a
    /// valid URL.
    pub fn authorization_redirect(&self) -> Result<String, url::ParseError> {
        self.oauth2.authorization_url(&self.state)
    }

    /// Drive one callback request to its terminal outcome.
    ///
    /// Guard checks (provider error, missing code, state match, missing
    /// refresh token) never touch the network; only a passed guard reaches
    /// the token endpoint, and only a successful exchange reaches identity
    /// resolution.
    pub async fn resolve(&self, request: CallbackRequest) -> ExchangeOutcome {
        let token = match request {
            CallbackRequest::AuthorizationCode {
                code,
                state,
                error,
                error_description,
                raw_query,
            } => {
                if let Some(error) = error {
                    let description = error_description.unwrap_or_default();
                    return ExchangeOutcome::AuthorizationError {
                        message: format!("{error}: {description}"),
                    };
                }

                let Some(code) = code else {
                    return ExchangeOutcome::MissingCode { raw_query };
                };

                if state.as_deref() != Some(self.state.as_str()) {
                    return ExchangeOutcome::StateMismatch;
                }

                info!("exchanging authorization code for token");
                match self.oauth2.exchange_code(&code).await {
                    Ok(token) => token,
                    Err(e) => {
                        return ExchangeOutcome::ExchangeFailure {
                            cause: e.to_string(),
                        }
                    }
                }
            }
            CallbackRequest::Refresh {
                refresh_token,
                raw_body,
            } => {
                let Some(refresh) = refresh_token else {
                    return ExchangeOutcome::MissingRefreshToken { raw_body };
                };

                info!("redeeming refresh token");
                let forcing = OAuth2Token::forcing_refresh(refresh);
                match self.oauth2.fresh_token(forcing).await {
                    Ok(token) => token,
                    Err(e) => {
                        return ExchangeOutcome::ExchangeFailure {
                            cause: e.to_string(),
                        }
                    }
                }
            }
        };

        self.resolve_identity(token).await
    }

    async fn resolve_identity(&self, token: OAuth2Token) -> ExchangeOutcome {
        match &self.mode {
            IdentityMode::UserInfo => {
                let Some(endpoint) = self.provider.userinfo_endpoint.as_deref() else {
                    return ExchangeOutcome::UserInfoFailure {
                        cause: "provider advertises no userinfo endpoint".into(),
                    };
                };

                match self.oauth2.fetch_userinfo(endpoint, &token.access_token).await {
                    Ok(payload) => ExchangeOutcome::Success { payload },
                    Err(e) => ExchangeOutcome::UserInfoFailure {
                        cause: e.to_string(),
                    },
                }
            }
            IdentityMode::IdToken(verifier) => {
                let Some(raw_id_token) = token.id_token.as_deref() else {
                    return ExchangeOutcome::MissingIdToken;
                };

                if let Err(e) = verifier.verify(raw_id_token) {
                    return ExchangeOutcome::TokenVerificationFailure {
                        cause: e.to_string(),
                    };
                }

                match serde_json::to_value(&token) {
                    Ok(payload) => ExchangeOutcome::Success { payload },
                    Err(e) => ExchangeOutcome::ExchangeFailure {
                        cause: format!("failed to serialize token response: {e}"),
                    },
                }
            }
        }
    }
}
