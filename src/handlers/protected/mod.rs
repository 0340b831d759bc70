// Handlers behind the JWT middleware. Every one of these follows the same
// sequence: take the injected actor, look up the target entity (404 when
// absent), consult the access decision, then perform the persistence
// operation.

pub mod auth;
pub mod expenses;
pub mod maintenance;
pub mod messages;
pub mod payments;
pub mod properties;
pub mod tenants;
