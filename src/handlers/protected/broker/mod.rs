// Broker portal: own listing and own media only. The group sits behind
// `require_roles(&[Role::Broker])`.
pub mod media;
pub mod profile;
