pub mod config_dto;
pub mod connection_dto;
