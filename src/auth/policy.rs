//! Authorization decision point.
//!
//! Every protected operation is described by a [`Policy`] and evaluated once
//! per request:
//!
//! 1. no token → `Deny(Unauthenticated)`
//! 2. invalid or expired token → `Deny(Unauthenticated)`
//! 3. role outside the policy's role set → `Deny(InsufficientRole)`
//! 4. ownership required → the [ownership guard](crate::auth::ownership) decides
//!
//! Otherwise the request is allowed. Evaluation has no side effects.

use crate::auth::jwt::TokenService;
use crate::auth::ownership;
use crate::types::{Claims, Role};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Unauthenticated,
    InsufficientRole,
    NotOwner,
    Allowed,
}

impl DecisionReason {
    /// HTTP status a denial with this reason translates to.
    pub fn status(self) -> StatusCode {
        match self {
            DecisionReason::Unauthenticated => StatusCode::UNAUTHORIZED,
            DecisionReason::InsufficientRole | DecisionReason::NotOwner => StatusCode::FORBIDDEN,
            DecisionReason::Allowed => StatusCode::OK,
        }
    }

    /// Client-facing message.
    pub fn message(self) -> &'static str {
        match self {
            DecisionReason::Unauthenticated => "You need to login first.",
            DecisionReason::InsufficientRole => {
                "Access denied: your role cannot access this endpoint."
            }
            DecisionReason::NotOwner => "Access denied: this resource belongs to another user.",
            DecisionReason::Allowed => "Allowed",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecisionReason::Unauthenticated => "unauthenticated",
            DecisionReason::InsufficientRole => "insufficient role",
            DecisionReason::NotOwner => "not owner",
            DecisionReason::Allowed => "allowed",
        };
        f.write_str(name)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: DecisionReason,
    claims: Option<Claims>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Allowed,
            claims: None,
        }
    }

    pub fn deny(reason: DecisionReason) -> Self {
        debug_assert!(reason != DecisionReason::Allowed);
        Self {
            allowed: false,
            reason,
            claims: None,
        }
    }

    fn with_claims(mut self, claims: &Claims) -> Self {
        if self.allowed {
            self.claims = Some(claims.clone());
        }
        self
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Validated claims of the caller; present only on allowing decisions
    /// produced from a token.
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn into_claims(self) -> Option<Claims> {
        self.claims
    }

    pub fn status(&self) -> StatusCode {
        self.reason.status()
    }

    /// Convert a denial into the matching [`AppError`](crate::types::AppError).
    pub fn ensure_allowed(&self) -> crate::types::Result<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(self.reason.into())
        }
    }
}

/// Declared requirements of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Empty means any authenticated caller.
    pub required_roles: HashSet<Role>,
    pub requires_ownership: bool,
}

impl Policy {
    /// Any valid token.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required_roles: roles.into_iter().collect(),
            requires_ownership: false,
        }
    }

    /// Regular members and administrators.
    pub fn members() -> Self {
        Self::roles([Role::User, Role::Admin])
    }

    pub fn admin_only() -> Self {
        Self::roles([Role::Admin])
    }

    /// Additionally require the caller to own the target resource.
    pub fn owned(mut self) -> Self {
        self.requires_ownership = true;
        self
    }

    pub fn permits_role(&self, role: Role) -> bool {
        self.required_roles.is_empty() || self.required_roles.contains(&role)
    }
}

/// What the decision point knows about an incoming request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub bearer: Option<&'a str>,
    pub now: DateTime<Utc>,
    /// Owner of the target resource, when the caller has already resolved it.
    pub resource_owner: Option<i64>,
}

impl<'a> RequestContext<'a> {
    pub fn new(bearer: Option<&'a str>, now: DateTime<Utc>) -> Self {
        Self {
            bearer,
            now,
            resource_owner: None,
        }
    }

    pub fn with_resource_owner(mut self, owner_id: i64) -> Self {
        self.resource_owner = Some(owner_id);
        self
    }
}

/// Evaluates policies against bearer tokens.
#[derive(Clone)]
pub struct Authorizer {
    tokens: Arc<TokenService>,
}

impl Authorizer {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Run the full decision for one request.
    pub fn authorize(&self, ctx: &RequestContext<'_>, policy: &Policy) -> Decision {
        let Some(token) = ctx.bearer else {
            return Decision::deny(DecisionReason::Unauthenticated);
        };

        let claims = match self.tokens.validate(token, ctx.now) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
                return Decision::deny(DecisionReason::Unauthenticated);
            }
        };

        decide(&claims, policy, ctx.resource_owner)
    }
}

/// Steps 3 and 4 of the decision for an already-authenticated caller.
///
/// An ownership policy without a known owner denies everyone but admins.
pub fn decide(claims: &Claims, policy: &Policy, resource_owner: Option<i64>) -> Decision {
    if !policy.permits_role(claims.role) {
        tracing::debug!(
            subject_id = claims.subject_id,
            role = %claims.role,
            "role not permitted by policy"
        );
        return Decision::deny(DecisionReason::InsufficientRole);
    }

    let decision = if policy.requires_ownership {
        match resource_owner {
            Some(owner_id) => ownership::check(claims.subject_id, claims.role, owner_id),
            None if claims.role.is_elevated() => Decision::allow(),
            None => Decision::deny(DecisionReason::NotOwner),
        }
    } else {
        Decision::allow()
    };

    decision.with_claims(claims)
}
