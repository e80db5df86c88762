// Trainer portal: own profile and own courses only. The group sits behind
// `require_roles(&[Role::Trainer])`; ownership scoping happens per query.
pub mod courses;
pub mod profile;
