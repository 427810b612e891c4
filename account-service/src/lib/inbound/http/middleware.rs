use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::access::errors::AccessError;
use crate::access::models::Requirement;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Admits any caller holding a valid token.
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    admit(state, req, next, Requirement::Authenticated).await
}

/// Admits only callers whose token carries the `Admin` role.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    admit(state, req, next, Requirement::ADMIN).await
}

/// Runs the access gate and stores the verified [`Caller`] in the request
/// extensions for handlers downstream.
///
/// [`Caller`]: crate::access::models::Caller
async fn admit(
    state: AppState,
    mut req: Request,
    next: Next,
    requirement: Requirement,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req);

    let caller = state.gate.admit(token, requirement).map_err(|e| {
        match &e {
            AccessError::Unauthenticated(reason) => {
                tracing::warn!(reason = %reason, uri = %req.uri(), "Request not authenticated")
            }
            AccessError::Forbidden => {
                tracing::warn!(uri = %req.uri(), "Request forbidden for caller role")
            }
        }
        ApiError::from(e).into_response()
    })?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`; any other shape counts as no token.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
