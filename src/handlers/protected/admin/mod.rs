// Admin console endpoints: full CRUD over every managed entity. The whole
// group sits behind `require_roles(&[Role::Admin])`.
pub mod articles;
pub mod brokers;
pub mod carousel;
pub mod exchange_rates;
pub mod media;
pub mod quiz;
pub mod signals;
pub mod staff;
pub mod trainers;
