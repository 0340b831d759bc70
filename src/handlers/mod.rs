// Route handlers in two security tiers: public (no credential) and
// protected (bearer token required, validated by middleware).

pub mod protected;
pub mod public;
