pub mod clock;
pub mod connection_service;
pub mod coordinator;
pub mod nsi;
pub mod protocol;
pub mod reservation;
pub mod utils;
