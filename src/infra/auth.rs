//! Bearer-token verification for the `/mcp` surface.
//!
//! One shared secret, one fixed grant. Verification runs as axum middleware
//! in front of the streamable MCP service, so a rejected credential never
//! reaches a tool handler or the upstream API.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const CLIENT_ID: &str = "default-client";
const SCOPE: &str = "user";

/// Assertion produced by a successful verification; built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub client_id: &'static str,
    pub scopes: &'static [&'static str],
}

#[derive(Clone)]
pub struct TokenVerifier {
    secret: std::sync::Arc<str>,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into(),
        }
    }

    /// Exact-equality check against the configured secret. Empty or malformed
    /// credentials compare unequal like any other string; never panics.
    pub fn verify(&self, credential: &str) -> Option<Identity> {
        if credential == &*self.secret {
            Some(Identity {
                client_id: CLIENT_ID,
                scopes: &[SCOPE],
            })
        } else {
            None
        }
    }
}

fn bearer_credential(req: &Request) -> &str {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// Fail-closed gate: on mismatch the request terminates here with a
/// constant-shape 401, before any handler runs.
pub async fn require_bearer(
    State(verifier): State<TokenVerifier>,
    req: Request,
    next: Next,
) -> Response {
    match verifier.verify(bearer_credential(&req)) {
        Some(identity) => {
            tracing::debug!(client_id = identity.client_id, "bearer token accepted");
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            "unauthorized",
        )
            .into_response(),
    }
}
