use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::utils::id::{ConnectionId, NsaId};

/// Well-known NSI error ids used by the simulated provider.
pub mod error_ids {
    pub const MISSING_PARAMETER: &str = "00101";
    pub const INVALID_PARAMETER: &str = "00102";
    pub const INVALID_TRANSITION: &str = "00201";
    pub const RESERVATION_NONEXISTENT: &str = "00203";
    pub const UNAUTHORIZED: &str = "00302";
    pub const CAPACITY_UNAVAILABLE: &str = "00600";
    pub const INTERNAL_ERROR: &str = "00500";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeValue {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

/// Service exception reported by a provider in place of a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceException {
    pub nsa_id: NsaId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ConnectionId>,
    pub error_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<TypeValue>,
}

impl ServiceException {
    pub fn new(nsa_id: NsaId, error_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { nsa_id, connection_id: None, error_id: error_id.into(), text: text.into(), variables: Vec::new() }
    }

    pub fn for_connection(mut self, connection_id: ConnectionId) -> Self {
        self.connection_id = Some(connection_id);
        self
    }

    pub fn with_variable(mut self, type_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push(TypeValue { type_name: type_name.into(), value: value.into() });
        self
    }
}

impl fmt::Display for ServiceException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (nsa={}", self.error_id, self.text, self.nsa_id)?;
        if let Some(connection_id) = &self.connection_id {
            write!(f, ", connectionId={}", connection_id)?;
        }
        for variable in &self.variables {
            write!(f, ", {}={}", variable.type_name, variable.value)?;
        }
        write!(f, ")")
    }
}
