// Role/ownership access control.
//
// Every protected route handler consults `can_access` before reading or
// mutating a record. The decision is a pure function of the actor, the
// requested operation, and an ownership snapshot of the parent property;
// it performs no I/O and never consults ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Landlord,
    Tenant,
}

/// The operation a handler wants to perform on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

/// Authenticated identity making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// Why a request was denied. Used for error reporting only; there is no
/// retry and no partial grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    WrongRole,
    NotOwner,
    NotAssociated,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "authentication required",
            DenyReason::WrongRole => "operation not available to this role",
            DenyReason::NotOwner => "property is owned by another landlord",
            DenyReason::NotAssociated => "not associated with this property",
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert to a `Result` so handlers can use `?`.
    pub fn require(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Ownership snapshot of one property: the landlord that owns it and the
/// user ids of tenants currently linked to it. Built by the persistence
/// layer; the landlord id is non-optional because properties cannot be
/// created without an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyScope {
    pub landlord_id: Uuid,
    pub tenant_user_ids: Vec<Uuid>,
}

impl PropertyScope {
    pub fn new(landlord_id: Uuid) -> Self {
        Self { landlord_id, tenant_user_ids: Vec::new() }
    }

    pub fn with_tenants(landlord_id: Uuid, tenant_user_ids: Vec<Uuid>) -> Self {
        Self { landlord_id, tenant_user_ids }
    }

    fn owned_by(&self, user_id: Uuid) -> bool {
        self.landlord_id == user_id
    }

    fn has_tenant(&self, user_id: Uuid) -> bool {
        self.tenant_user_ids.contains(&user_id)
    }
}

/// A record an actor wants to touch, paired with the ownership snapshot of
/// the property it belongs to. Sub-records never carry authority of their
/// own; it always derives from the parent property plus the acting role.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Property(&'a PropertyScope),
    /// An occupancy record. `linked_user` is the authentication user the
    /// record is linked to, if any.
    TenantRecord {
        scope: &'a PropertyScope,
        linked_user: Option<Uuid>,
    },
    Payment(&'a PropertyScope),
    Expense(&'a PropertyScope),
    Message(&'a PropertyScope),
    Maintenance(&'a PropertyScope),
}

impl<'a> Resource<'a> {
    fn scope(&self) -> &'a PropertyScope {
        match self {
            Resource::Property(scope)
            | Resource::TenantRecord { scope, .. }
            | Resource::Payment(scope)
            | Resource::Expense(scope)
            | Resource::Message(scope)
            | Resource::Maintenance(scope) => scope,
        }
    }
}

/// The single authorization predicate.
///
/// `actor == None` means the request carried no valid credential; that is
/// denied before any role or ownership rule runs. Combinations not granted
/// below are denied.
pub fn can_access(actor: Option<&Actor>, op: Operation, resource: Resource<'_>) -> Decision {
    let Some(actor) = actor else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    let scope = resource.scope();

    let owner_gated = |scope: &PropertyScope| {
        if scope.owned_by(actor.id) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::NotOwner)
        }
    };
    let association_gated = |scope: &PropertyScope| {
        if scope.has_tenant(actor.id) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::NotAssociated)
        }
    };

    match resource {
        Resource::Property(_) => match actor.role {
            Role::Landlord => owner_gated(scope),
            Role::Tenant => match op {
                Operation::Read => association_gated(scope),
                _ => Decision::Deny(DenyReason::WrongRole),
            },
        },

        Resource::TenantRecord { linked_user, .. } => match actor.role {
            Role::Landlord => owner_gated(scope),
            Role::Tenant => match op {
                // A tenant may read their own occupancy record only. The
                // association check keeps sub-record access from exceeding
                // property access even on an inconsistent snapshot.
                Operation::Read => {
                    if linked_user == Some(actor.id) && scope.has_tenant(actor.id) {
                        Decision::Allow
                    } else {
                        Decision::Deny(DenyReason::NotAssociated)
                    }
                }
                _ => Decision::Deny(DenyReason::WrongRole),
            },
        },

        Resource::Payment(_) => match actor.role {
            Role::Landlord => owner_gated(scope),
            Role::Tenant => match op {
                Operation::Read | Operation::Create => association_gated(scope),
                Operation::Update | Operation::Delete => Decision::Deny(DenyReason::WrongRole),
            },
        },

        Resource::Expense(_) => match actor.role {
            Role::Landlord => owner_gated(scope),
            Role::Tenant => Decision::Deny(DenyReason::WrongRole),
        },

        Resource::Message(_) => match actor.role {
            Role::Landlord => owner_gated(scope),
            Role::Tenant => match op {
                Operation::Read | Operation::Create => association_gated(scope),
                Operation::Update | Operation::Delete => Decision::Deny(DenyReason::WrongRole),
            },
        },

        Resource::Maintenance(_) => match actor.role {
            // Maintenance requests are tenant-initiated; landlords manage
            // them afterwards.
            Role::Landlord => match op {
                Operation::Create => Decision::Deny(DenyReason::WrongRole),
                _ => owner_gated(scope),
            },
            Role::Tenant => match op {
                Operation::Create => association_gated(scope),
                _ => Decision::Deny(DenyReason::WrongRole),
            },
        },
    }
}

/// List-operation predicate: whether a property (and by extension its
/// record listing) is visible to the actor at all. List endpoints filter
/// with this per record instead of denying the whole request.
pub fn can_view_property(actor: &Actor, scope: &PropertyScope) -> bool {
    can_access(Some(actor), Operation::Read, Resource::Property(scope)).is_allow()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landlord(id: u128) -> Actor {
        Actor { id: Uuid::from_u128(id), role: Role::Landlord }
    }

    fn tenant(id: u128) -> Actor {
        Actor { id: Uuid::from_u128(id), role: Role::Tenant }
    }

    fn scope(owner: u128, tenants: &[u128]) -> PropertyScope {
        PropertyScope::with_tenants(
            Uuid::from_u128(owner),
            tenants.iter().map(|t| Uuid::from_u128(*t)).collect(),
        )
    }

    const ALL_OPS: [Operation; 4] =
        [Operation::Read, Operation::Create, Operation::Update, Operation::Delete];

    #[test]
    fn unauthenticated_is_denied_before_ownership_rules() {
        let s = scope(1, &[9]);
        for op in ALL_OPS {
            assert_eq!(
                can_access(None, op, Resource::Property(&s)),
                Decision::Deny(DenyReason::Unauthenticated)
            );
            assert_eq!(
                can_access(None, op, Resource::Payment(&s)),
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[test]
    fn landlord_has_full_control_of_owned_property() {
        let s = scope(1, &[]);
        for op in ALL_OPS {
            assert!(can_access(Some(&landlord(1)), op, Resource::Property(&s)).is_allow());
        }
    }

    #[test]
    fn landlord_cannot_touch_foreign_property() {
        let s = scope(1, &[]);
        for op in ALL_OPS {
            assert_eq!(
                can_access(Some(&landlord(2)), op, Resource::Property(&s)),
                Decision::Deny(DenyReason::NotOwner)
            );
        }
    }

    #[test]
    fn tenant_reads_associated_property_but_never_mutates_it() {
        let s = scope(1, &[9]);
        assert!(can_access(Some(&tenant(9)), Operation::Read, Resource::Property(&s)).is_allow());
        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            assert_eq!(
                can_access(Some(&tenant(9)), op, Resource::Property(&s)),
                Decision::Deny(DenyReason::WrongRole)
            );
        }
        assert_eq!(
            can_access(Some(&tenant(8)), Operation::Read, Resource::Property(&s)),
            Decision::Deny(DenyReason::NotAssociated)
        );
    }

    #[test]
    fn tenant_reads_own_occupancy_record_only() {
        let s = scope(1, &[9, 10]);
        let own = Resource::TenantRecord { scope: &s, linked_user: Some(Uuid::from_u128(9)) };
        let other = Resource::TenantRecord { scope: &s, linked_user: Some(Uuid::from_u128(10)) };
        let unlinked = Resource::TenantRecord { scope: &s, linked_user: None };

        assert!(can_access(Some(&tenant(9)), Operation::Read, own).is_allow());
        assert_eq!(
            can_access(Some(&tenant(9)), Operation::Read, other),
            Decision::Deny(DenyReason::NotAssociated)
        );
        assert_eq!(
            can_access(Some(&tenant(9)), Operation::Read, unlinked),
            Decision::Deny(DenyReason::NotAssociated)
        );
        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            assert_eq!(
                can_access(Some(&tenant(9)), op, own),
                Decision::Deny(DenyReason::WrongRole)
            );
        }
    }

    #[test]
    fn tenant_may_submit_and_view_payments_when_associated() {
        let s = scope(1, &[9]);
        assert!(can_access(Some(&tenant(9)), Operation::Read, Resource::Payment(&s)).is_allow());
        assert!(can_access(Some(&tenant(9)), Operation::Create, Resource::Payment(&s)).is_allow());
        assert_eq!(
            can_access(Some(&tenant(9)), Operation::Update, Resource::Payment(&s)),
            Decision::Deny(DenyReason::WrongRole)
        );
        assert_eq!(
            can_access(Some(&tenant(9)), Operation::Delete, Resource::Payment(&s)),
            Decision::Deny(DenyReason::WrongRole)
        );
        assert_eq!(
            can_access(Some(&tenant(8)), Operation::Create, Resource::Payment(&s)),
            Decision::Deny(DenyReason::NotAssociated)
        );
    }

    #[test]
    fn expenses_are_landlord_only() {
        let s = scope(1, &[9]);
        for op in ALL_OPS {
            assert!(can_access(Some(&landlord(1)), op, Resource::Expense(&s)).is_allow());
            assert_eq!(
                can_access(Some(&tenant(9)), op, Resource::Expense(&s)),
                Decision::Deny(DenyReason::WrongRole)
            );
        }
    }

    #[test]
    fn messages_flow_both_ways_but_only_landlords_remove_them() {
        let s = scope(1, &[9]);
        assert!(can_access(Some(&tenant(9)), Operation::Create, Resource::Message(&s)).is_allow());
        assert!(can_access(Some(&tenant(9)), Operation::Read, Resource::Message(&s)).is_allow());
        assert!(can_access(Some(&landlord(1)), Operation::Delete, Resource::Message(&s)).is_allow());
        assert_eq!(
            can_access(Some(&tenant(9)), Operation::Delete, Resource::Message(&s)),
            Decision::Deny(DenyReason::WrongRole)
        );
    }

    #[test]
    fn maintenance_submission_is_tenant_initiated() {
        let s = scope(1, &[9]);
        assert!(can_access(Some(&tenant(9)), Operation::Create, Resource::Maintenance(&s)).is_allow());
        assert_eq!(
            can_access(Some(&landlord(1)), Operation::Create, Resource::Maintenance(&s)),
            Decision::Deny(DenyReason::WrongRole)
        );
        for op in [Operation::Read, Operation::Update, Operation::Delete] {
            assert!(can_access(Some(&landlord(1)), op, Resource::Maintenance(&s)).is_allow());
            assert_eq!(
                can_access(Some(&tenant(9)), op, Resource::Maintenance(&s)),
                Decision::Deny(DenyReason::WrongRole)
            );
        }
    }

    #[test]
    fn visibility_predicate_matches_read_decision() {
        let s = scope(1, &[9]);
        assert!(can_view_property(&landlord(1), &s));
        assert!(!can_view_property(&landlord(2), &s));
        assert!(can_view_property(&tenant(9), &s));
        assert!(!can_view_property(&tenant(8), &s));
    }
}
