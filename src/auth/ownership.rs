//! Resource ownership guard.
//!
//! A non-elevated subject may only act on resources it owns. The rule lives
//! here once; every owned resource kind opts in through [`Owned`].

use crate::auth::policy::{self, Decision, DecisionReason, Policy};
use crate::types::{Claims, Role};

/// A resource with an immutable owning subject.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Allow when `role` is elevated or `subject_id` owns the resource.
pub fn check(subject_id: i64, role: Role, owner_id: i64) -> Decision {
    if role.is_elevated() || subject_id == owner_id {
        Decision::allow()
    } else {
        tracing::debug!(subject_id, owner_id, "ownership check denied");
        Decision::deny(DecisionReason::NotOwner)
    }
}

/// Run an authenticated caller's claims against `resource` through the
/// decision point with an ownership policy.
pub fn ensure_owner<R>(claims: &Claims, resource: &R) -> crate::types::Result<()>
where
    R: Owned + ?Sized,
{
    policy::decide(claims, &Policy::authenticated().owned(), Some(resource.owner_id()))
        .ensure_allowed()
}
