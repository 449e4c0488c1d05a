pub mod credential;
pub mod protocol_client_trait;
pub mod provider_session;
pub mod reply;
pub mod session_message;
pub mod simulated_provider;
