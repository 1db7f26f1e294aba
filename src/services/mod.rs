pub mod catalog;
pub mod metrics;
pub mod profiles;
pub mod recommendations;
