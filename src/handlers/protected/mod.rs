// Handlers behind JWT authentication. Route groups apply their role
// allow-lists via `middleware::gate::require_roles`; handlers take the role
// extractors so ownership scoping has a typed identity to work with.
pub mod admin;
pub mod auth;
pub mod broker;
pub mod media;
pub mod trainer;
