use thiserror::Error;

use crate::domain::nsi::service_exception::ServiceException;
use crate::domain::utils::id::ConnectionId;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider answered a request with a service exception.
    #[error("Provider rejected the request: {0}")]
    ProtocolFailure(ServiceException),

    /// The protocol client itself failed (timeout, closed session, rejected credential).
    #[error("Protocol client failed: {0}")]
    TransportFailure(String),

    #[error("No such reservation, id={0}")]
    UnknownReservation(ConnectionId),

    /// The confirmed version is `u32::MAX`, so no further modification can be requested.
    #[error("Reservation {0} has no version left to request")]
    VersionExhausted(ConnectionId),

    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid coordinator configuration: {0}")]
    ConfigError(String),

    #[error("Invalid connection attribute '{name}': {reason}")]
    InvalidAttribute { name: String, reason: String },
}

impl Error {
    pub fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAttribute { name: name.into(), reason: reason.into() }
    }

    /// Failures that retrying the same id can never fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Error::UnknownReservation(_) | Error::VersionExhausted(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
