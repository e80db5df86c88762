pub mod account;
pub mod article;
pub mod broker;
pub mod carousel;
pub mod course;
pub mod exchange_rate;
pub mod media;
pub mod quiz;
pub mod signal;
pub mod trainer;
