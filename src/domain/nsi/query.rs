use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::nsi::connection_states::{ConnectionStates, DataPlaneStatus};
use crate::domain::nsi::criteria::ReservationConfirmCriteria;
use crate::domain::nsi::service_exception::ServiceException;
use crate::domain::utils::id::{ConnectionId, GlobalReservationId, NsaId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connection_ids: Vec<ConnectionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_reservation_ids: Vec<GlobalReservationId>,
}

impl QueryRequest {
    pub fn for_connection(connection_id: &ConnectionId) -> Self {
        Self { connection_ids: vec![connection_id.clone()], global_reservation_ids: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySummaryResult {
    pub connection_id: ConnectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_reservation_id: Option<GlobalReservationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub requester_nsa: NsaId,
    /// Committed (and held) criteria versions known to the provider.
    pub criteria: Vec<ReservationConfirmCriteria>,
    pub connection_states: ConnectionStates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<u64>,
}

impl QuerySummaryResult {
    /// Highest criteria version reported for the connection.
    pub fn latest_version(&self) -> Option<u32> {
        self.criteria.iter().map(|criteria| criteria.version).max()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySummaryConfirmed {
    pub reservations: Vec<QuerySummaryResult>,
}

impl QuerySummaryConfirmed {
    pub fn find(&self, connection_id: &ConnectionId) -> Option<&QuerySummaryResult> {
        self.reservations.iter().find(|result| &result.connection_id == connection_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNotificationRequest {
    pub connection_id: ConnectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_notification_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_notification_id: Option<u64>,
}

impl QueryNotificationRequest {
    pub fn all(connection_id: &ConnectionId) -> Self {
        Self { connection_id: connection_id.clone(), start_notification_id: None, end_notification_id: None }
    }

    pub fn includes(&self, notification_id: u64) -> bool {
        self.start_notification_id.is_none_or(|start| notification_id >= start)
            && self.end_notification_id.is_none_or(|end| notification_id <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationEvent {
    DataPlaneStateChange { data_plane_status: DataPlaneStatus },
    ReserveTimeout { timeout_value_s: u64 },
    ErrorEvent { event: String, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub notification_id: u64,
    pub time_stamp: DateTime<Utc>,
    pub connection_id: ConnectionId,
    pub event: NotificationEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNotificationConfirmed {
    pub notifications: Vec<NotificationRecord>,
}

/// Asynchronous notification query outcome, delivered through the requester endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryNotificationReply {
    Confirmed(QueryNotificationConfirmed),
    Exception(ServiceException),
}
