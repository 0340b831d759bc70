// End-to-end checks of the authorization model across roles, operations
// and record kinds.

use uuid::Uuid;

use rentfolio_api::access::{
    can_access, can_view_property, Actor, Decision, DenyReason, Operation, PropertyScope,
    Resource, Role,
};

const ALL_OPS: [Operation; 4] =
    [Operation::Read, Operation::Create, Operation::Update, Operation::Delete];

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

/// Every sub-record resource kind over a given scope, for sweeping checks.
fn sub_resources(scope: &PropertyScope) -> Vec<Resource<'_>> {
    vec![
        Resource::TenantRecord { scope, linked_user: Some(Uuid::from_u128(9)) },
        Resource::TenantRecord { scope, linked_user: None },
        Resource::Payment(scope),
        Resource::Expense(scope),
        Resource::Message(scope),
        Resource::Maintenance(scope),
    ]
}

#[test]
fn landlord_read_is_exactly_ownership() {
    let owned = scope(1, &[]);
    let foreign = scope(2, &[]);

    assert!(can_access(Some(&landlord(1)), Operation::Read, Resource::Property(&owned)).is_allow());
    assert_eq!(
        can_access(Some(&landlord(1)), Operation::Read, Resource::Property(&foreign)),
        Decision::Deny(DenyReason::NotOwner)
    );
}

#[test]
fn tenant_read_is_exactly_association() {
    let s = scope(1, &[9, 10]);

    assert!(can_access(Some(&tenant(9)), Operation::Read, Resource::Property(&s)).is_allow());
    assert!(can_access(Some(&tenant(10)), Operation::Read, Resource::Property(&s)).is_allow());
    assert_eq!(
        can_access(Some(&tenant(11)), Operation::Read, Resource::Property(&s)),
        Decision::Deny(DenyReason::NotAssociated)
    );
}

// No sub-record access without property access: if any operation on a
// sub-record is allowed, reading the parent property must be allowed too.
#[test]
fn sub_record_access_never_exceeds_property_access() {
    let scopes = [scope(1, &[9]), scope(1, &[]), scope(2, &[9, 10])];
    let actors = [landlord(1), landlord(2), tenant(9), tenant(10), tenant(11)];

    for s in &scopes {
        for actor in &actors {
            for resource in sub_resources(s) {
                for op in ALL_OPS {
                    if can_access(Some(actor), op, resource).is_allow() {
                        assert!(
                            can_access(Some(actor), Operation::Read, Resource::Property(s))
                                .is_allow(),
                            "{actor:?} allowed {op:?} on {resource:?} without property read"
                        );
                    }
                }
            }
        }
    }
}

// The decision is a pure function of its inputs, not of call history.
#[test]
fn repeated_checks_return_identical_decisions() {
    let s = scope(1, &[9]);
    let actors = [landlord(1), landlord(2), tenant(9), tenant(11)];

    for actor in &actors {
        for op in ALL_OPS {
            let first = can_access(Some(actor), op, Resource::Payment(&s));
            let second = can_access(Some(actor), op, Resource::Payment(&s));
            assert_eq!(first, second);
        }
    }
}

// A missing credential is rejected before any ownership rule is even
// consulted, whatever the target is.
#[test]
fn unauthenticated_always_precedes_ownership_checks() {
    let s = scope(1, &[9]);

    for op in ALL_OPS {
        assert_eq!(
            can_access(None, op, Resource::Property(&s)),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        for resource in sub_resources(&s) {
            assert_eq!(
                can_access(None, op, resource),
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }
}

// Landlord A owns P1; landlord B tries to assign a tenant to it.
#[test]
fn only_the_owning_landlord_assigns_tenants() {
    let p1 = scope(1, &[]);
    let new_record = Resource::TenantRecord { scope: &p1, linked_user: None };

    assert_eq!(
        can_access(Some(&landlord(2)), Operation::Create, new_record),
        Decision::Deny(DenyReason::NotOwner)
    );
    assert!(can_access(Some(&landlord(1)), Operation::Create, new_record).is_allow());
}

// Tenant T is associated with P2 but not P3.
#[test]
fn tenant_payment_listing_follows_association() {
    let p2 = scope(1, &[9]);
    let p3 = scope(1, &[10]);
    let t = tenant(9);

    assert!(can_access(Some(&t), Operation::Read, Resource::Payment(&p2)).is_allow());
    assert_eq!(
        can_access(Some(&t), Operation::Read, Resource::Payment(&p3)),
        Decision::Deny(DenyReason::NotAssociated)
    );
}

#[test]
fn property_visibility_filter_matches_read_decisions() {
    let portfolio = [scope(1, &[9]), scope(1, &[]), scope(2, &[9])];

    let visible_to_owner: Vec<_> =
        portfolio.iter().filter(|s| can_view_property(&landlord(1), s)).collect();
    assert_eq!(visible_to_owner.len(), 2);

    let visible_to_tenant: Vec<_> =
        portfolio.iter().filter(|s| can_view_property(&tenant(9), s)).collect();
    assert_eq!(visible_to_tenant.len(), 2);

    let visible_to_stranger: Vec<_> =
        portfolio.iter().filter(|s| can_view_property(&tenant(42), s)).collect();
    assert!(visible_to_stranger.is_empty());
}
