pub mod coordinator;
pub mod coordinator_config;
pub mod criteria_factory;
