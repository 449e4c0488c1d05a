use serde::{Deserialize, Serialize};

use crate::domain::nsi::connection_states::ConnectionStates;
use crate::domain::nsi::criteria::{ReservationConfirmCriteria, ReservationRequestCriteria};
use crate::domain::nsi::service_exception::ServiceException;
use crate::domain::utils::id::{ConnectionId, GlobalReservationId};

/// A reserve request as handed to the protocol client. Without a connection id
/// it creates a new reservation; with one it modifies that reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ConnectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_reservation_id: Option<GlobalReservationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub criteria: ReservationRequestCriteria,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReserveOutcome {
    Confirmed(ReservationConfirmCriteria),
    Failed(ServiceException),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveReply {
    /// Assigned by the provider; may be missing when a new reservation is rejected outright.
    pub connection_id: Option<ConnectionId>,
    pub outcome: ReserveOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_states: Option<ConnectionStates>,
}

impl ReserveReply {
    pub fn confirmed(connection_id: ConnectionId, criteria: ReservationConfirmCriteria, states: ConnectionStates) -> Self {
        Self { connection_id: Some(connection_id), outcome: ReserveOutcome::Confirmed(criteria), connection_states: Some(states) }
    }

    pub fn failed(connection_id: Option<ConnectionId>, exception: ServiceException, states: Option<ConnectionStates>) -> Self {
        Self { connection_id, outcome: ReserveOutcome::Failed(exception), connection_states: states }
    }
}

/// Reply to commit, abort, provision, release and terminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericReply {
    pub connection_id: ConnectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_exception: Option<ServiceException>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_states: Option<ConnectionStates>,
}

impl GenericReply {
    pub fn confirmed(connection_id: ConnectionId, states: Option<ConnectionStates>) -> Self {
        Self { connection_id, service_exception: None, connection_states: states }
    }

    pub fn failed(connection_id: ConnectionId, exception: ServiceException, states: Option<ConnectionStates>) -> Self {
        Self { connection_id, service_exception: Some(exception), connection_states: states }
    }

    pub fn is_confirmed(&self) -> bool {
        self.service_exception.is_none()
    }
}
