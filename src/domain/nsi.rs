pub mod connection_states;
pub mod criteria;
pub mod message_builder;
pub mod query;
pub mod service_exception;
pub mod text_dump;
