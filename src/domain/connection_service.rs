pub mod connection_request;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::api::connection_dto::{ConnectionAttributesDto, ConnectionStatusDto, ServiceCharacteristicDto};
use crate::domain::clock::Clock;
use crate::domain::connection_service::connection_request::ConnectionRequest;
use crate::domain::coordinator::coordinator::ReservationCoordinator;
use crate::domain::nsi::query::QuerySummaryResult;
use crate::domain::utils::id::ConnectionId;
use crate::error::Result;

/// Connection-level front end over a [`ReservationCoordinator`].
///
/// Creating a connection reserves, commits and provisions it; deleting
/// releases and terminates it.
#[derive(Debug)]
pub struct ConnectionService {
    coordinator: Arc<ReservationCoordinator>,
    clock: Arc<dyn Clock>,
    last_connection: Mutex<Option<ConnectionId>>,
}

impl ConnectionService {
    pub fn new(coordinator: Arc<ReservationCoordinator>, clock: Arc<dyn Clock>) -> Self {
        Self { coordinator, clock, last_connection: Mutex::new(None) }
    }

    pub fn coordinator(&self) -> &ReservationCoordinator {
        &self.coordinator
    }

    pub fn last_connection(&self) -> Option<ConnectionId> {
        self.last_connection.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn create_connection(&self, request: &ConnectionRequest) -> Result<ConnectionId> {
        log::info!("Creating connection {} -> {} ({} Mbit/s)", request.source_stp, request.dest_stp, request.capacity);

        let reservation_id = self.coordinator.reserve_commit(&request.to_reservation_request())?;
        self.coordinator.provision(&reservation_id)?;

        log::info!("Connection {} created", reservation_id);
        *self.last_connection.lock().unwrap_or_else(PoisonError::into_inner) = Some(reservation_id.clone());
        Ok(reservation_id)
    }

    pub fn create_from_attributes(&self, attributes: &ConnectionAttributesDto) -> Result<ConnectionId> {
        let request = ConnectionRequest::from_attributes(attributes, self.clock.as_ref())?;
        self.create_connection(&request)
    }

    pub fn create_from_characteristics(&self, characteristics: &[ServiceCharacteristicDto]) -> Result<ConnectionId> {
        let attributes = characteristics_to_attributes(characteristics)?;
        self.create_from_attributes(&attributes)
    }

    /// Releases and terminates a connection. Failures are logged only.
    pub fn delete_connection(&self, reservation_id: &ConnectionId) {
        log::info!("Deleting connection {}", reservation_id);

        if let Err(e) = self.coordinator.release(reservation_id).and_then(|_| self.coordinator.terminate(reservation_id)) {
            log::error!("Deleting connection {} failed: {}", reservation_id, e);
            return;
        }

        log::debug!("Connection {} deleted", reservation_id);
    }

    /// Deletes the most recently created connection, if there is one.
    pub fn delete_last_connection(&self) -> Option<ConnectionId> {
        let last = self.last_connection.lock().unwrap_or_else(PoisonError::into_inner).take();
        match &last {
            Some(reservation_id) => self.delete_connection(reservation_id),
            None => log::warn!("No connection created yet, nothing to delete"),
        }
        last
    }

    /// Status of a connection, `None` when the provider does not know it.
    pub fn query_connection(&self, reservation_id: &ConnectionId) -> Result<Option<ConnectionStatusDto>> {
        let summary = self.coordinator.query_summary(reservation_id)?;
        Ok(summary.find(reservation_id).map(status_of))
    }
}

fn status_of(result: &QuerySummaryResult) -> ConnectionStatusDto {
    let states = &result.connection_states;
    ConnectionStatusDto {
        active: states.data_plane_status.active,
        connection_id: result.connection_id.to_string(),
        description: result.description.clone(),
        global_reservation_id: result.global_reservation_id.as_ref().map(ToString::to_string),
        lifecycle_state: state_name(&states.lifecycle_state),
        notification_id: result.notification_id,
        provision_state: states.provision_state.as_ref().map(state_name),
        requester_nsa: result.requester_nsa.to_string(),
        reservation_state: state_name(&states.reservation_state),
        version: states.data_plane_status.version,
        version_consistent: states.data_plane_status.version_consistent,
    }
}

/// Wire name of a state enum, e.g. `RESERVE_HELD`.
fn state_name<T: Serialize + std::fmt::Debug>(state: &T) -> String {
    match serde_json::to_value(state) {
        Ok(serde_json::Value::String(name)) => name,
        _ => format!("{:?}", state),
    }
}

/// Folds a name/value characteristic list into connection attributes. Later duplicates win.
pub fn characteristics_to_attributes(characteristics: &[ServiceCharacteristicDto]) -> Result<ConnectionAttributesDto> {
    let attributes: serde_json::Map<String, serde_json::Value> =
        characteristics.iter().map(|characteristic| (characteristic.name.clone(), characteristic.value.clone())).collect();

    Ok(serde_json::from_value(serde_json::Value::Object(attributes))?)
}

/// Flattens a connection status into a name/value characteristic list, sorted by name.
pub fn status_to_characteristics(status: &ConnectionStatusDto) -> Result<Vec<ServiceCharacteristicDto>> {
    let value = serde_json::to_value(status)?;

    let characteristics = match value {
        serde_json::Value::Object(fields) => fields.into_iter().map(|(name, value)| ServiceCharacteristicDto { name, value }).collect(),
        _ => Vec::new(),
    };
    Ok(characteristics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn characteristics_fold_into_attributes() {
        let characteristics = vec![
            ServiceCharacteristicDto { name: "description".to_string(), value: json!("demo") },
            ServiceCharacteristicDto { name: "src_vlan".to_string(), value: json!(1202) },
            ServiceCharacteristicDto { name: "dst_vlan".to_string(), value: json!("2001") },
            ServiceCharacteristicDto { name: "explicit_routes".to_string(), value: json!(["urn:hop:1"]) },
            ServiceCharacteristicDto { name: "description".to_string(), value: json!("renamed") },
        ];

        let attributes = characteristics_to_attributes(&characteristics).unwrap();

        assert_eq!(attributes.description.as_deref(), Some("renamed"));
        assert_eq!(attributes.src_vlan.and_then(|vlan| vlan.as_i64()), Some(1202));
        assert_eq!(attributes.dst_vlan.and_then(|vlan| vlan.as_i64()), Some(2001));
        assert_eq!(attributes.explicit_routes, Some(vec!["urn:hop:1".to_string()]));
        assert!(attributes.capacity.is_none());
    }

    #[test]
    fn status_flattens_to_sorted_characteristics() {
        let status = ConnectionStatusDto {
            active: true,
            connection_id: "urn:uuid:1".to_string(),
            description: Some("demo".to_string()),
            global_reservation_id: None,
            lifecycle_state: "CREATED".to_string(),
            notification_id: Some(3),
            provision_state: Some("PROVISIONED".to_string()),
            requester_nsa: "urn:ogf:network:requester:nsa".to_string(),
            reservation_state: "RESERVE_START".to_string(),
            version: 1,
            version_consistent: true,
        };

        let characteristics = status_to_characteristics(&status).unwrap();
        let names: Vec<&str> = characteristics.iter().map(|characteristic| characteristic.name.as_str()).collect();

        assert_eq!(names.first(), Some(&"active"));
        assert!(names.contains(&"requesterNSA"));
        assert!(names.windows(2).all(|pair| pair[0] <= pair[1]));

        let version = characteristics.iter().find(|characteristic| characteristic.name == "version").unwrap();
        assert_eq!(version.value, json!(1));
    }
}
