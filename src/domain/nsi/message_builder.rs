use chrono::{DateTime, Utc};

use crate::domain::nsi::criteria::{Directionality, EVTS_SERVICE_TYPE, P2PService, ReservationRequestCriteria, Schedule};
use crate::domain::utils::id::StpId;

/// Builds protocol criteria documents from semantic parameters.
///
/// Every document leaves the builder with version 0; the coordinator sets
/// the version it wants to request.
pub trait MessageBuilder: std::fmt::Debug + Send + Sync {
    fn build_schedule(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Schedule;

    fn build_criteria(
        &self,
        schedule: Schedule,
        source_stp: &StpId,
        source_vlan: u16,
        dest_stp: &StpId,
        dest_vlan: u16,
        capacity: i64,
    ) -> ReservationRequestCriteria;

    /// Criteria for a modification: schedule and capacity only.
    fn build_modify_criteria(&self, schedule: Schedule, capacity: i64) -> ReservationRequestCriteria;
}

/// Builds EVTS point-to-point criteria. VLAN tags are attached to the
/// endpoints as STP labels (`<stp>?vlan=<tag>`).
#[derive(Debug, Clone)]
pub struct P2pMessageBuilder {
    service_type: String,
    directionality: Directionality,
    symmetric_path: bool,
}

impl P2pMessageBuilder {
    pub fn new() -> Self {
        Self { service_type: EVTS_SERVICE_TYPE.to_string(), directionality: Directionality::Bidirectional, symmetric_path: true }
    }

    pub fn with_directionality(mut self, directionality: Directionality) -> Self {
        self.directionality = directionality;
        self
    }

    pub fn labelled_stp(stp: &StpId, vlan: u16) -> StpId {
        StpId::new(format!("{}?vlan={}", stp, vlan))
    }
}

impl Default for P2pMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBuilder for P2pMessageBuilder {
    fn build_schedule(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Schedule {
        Schedule::new(start, end)
    }

    fn build_criteria(
        &self,
        schedule: Schedule,
        source_stp: &StpId,
        source_vlan: u16,
        dest_stp: &StpId,
        dest_vlan: u16,
        capacity: i64,
    ) -> ReservationRequestCriteria {
        ReservationRequestCriteria {
            version: 0,
            schedule,
            service_type: self.service_type.clone(),
            p2ps: Some(P2PService {
                capacity,
                directionality: self.directionality,
                symmetric_path: Some(self.symmetric_path),
                source_stp: Some(Self::labelled_stp(source_stp, source_vlan)),
                dest_stp: Some(Self::labelled_stp(dest_stp, dest_vlan)),
                ero: None,
            }),
        }
    }

    fn build_modify_criteria(&self, schedule: Schedule, capacity: i64) -> ReservationRequestCriteria {
        ReservationRequestCriteria {
            version: 0,
            schedule,
            service_type: self.service_type.clone(),
            p2ps: Some(P2PService {
                capacity,
                directionality: self.directionality,
                symmetric_path: None,
                source_stp: None,
                dest_stp: None,
                ero: None,
            }),
        }
    }
}
