use crate::auth::policy::{Authorizer, Policy, RequestContext};
use crate::types::{AppError, Claims};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

/// Route-level policy paired with the authorizer that enforces it.
#[derive(Clone)]
pub struct PolicyGuard {
    authorizer: Authorizer,
    policy: Arc<Policy>,
}

impl PolicyGuard {
    pub fn new(authorizer: Authorizer, policy: Policy) -> Self {
        Self {
            authorizer,
            policy: Arc::new(policy),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme name is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Evaluate the route's policy and, when allowed, inject the caller's
/// [`Claims`] into the request extensions.
pub async fn enforce_policy(
    State(guard): State<PolicyGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = RequestContext::new(bearer_token(req.headers()), Utc::now());
    let decision = guard.authorizer.authorize(&ctx, &guard.policy);

    if let Err(err) = decision.ensure_allowed() {
        tracing::debug!(reason = %decision.reason, path = %req.uri().path(), "request denied");
        return Err(err);
    }

    let claims = decision.into_claims().ok_or(AppError::Unauthenticated)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// Extractor for claims
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthenticated)
    }
}
