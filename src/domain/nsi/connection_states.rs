use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    ReserveStart,
    ReserveChecking,
    ReserveFailed,
    ReserveAborting,
    ReserveHeld,
    ReserveCommitting,
    ReserveTimeout,
}

/// Data plane provisioning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionState {
    Released,
    Provisioning,
    Provisioned,
    Releasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Created,
    Failed,
    PassedEndTime,
    Terminating,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPlaneStatus {
    pub active: bool,
    pub version: u32,
    pub version_consistent: bool,
}

/// Provider-side view of a connection, reported with replies and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStates {
    pub reservation_state: ReservationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision_state: Option<ProvisionState>,
    pub lifecycle_state: LifecycleState,
    pub data_plane_status: DataPlaneStatus,
}

impl ConnectionStates {
    pub fn is_terminated(&self) -> bool {
        self.lifecycle_state == LifecycleState::Terminated
    }
}
