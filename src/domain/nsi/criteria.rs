use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::utils::id::StpId;

/// Service type announced in every criteria document built by this requester.
pub const EVTS_SERVICE_TYPE: &str = "http://services.ogf.org/nsi/2013/12/descriptions/EVTS.A-GOLE";

/// Reservation time window. A missing start means "begin immediately",
/// a missing end means the connection stays up until it is terminated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(start_time: Option<DateTime<Utc>>, end_time: Option<DateTime<Utc>>) -> Self {
        Self { start_time, end_time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Directionality {
    #[default]
    Bidirectional,
    Unidirectional,
}

/// One hop of an explicit route, tagged with its zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedStp {
    pub order: u32,
    pub stp: StpId,
}

/// Point-to-point service element of a criteria document.
///
/// Endpoints are absent in modify requests, which only carry the parts that change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct P2PService {
    /// Requested bandwidth in Mbit/s.
    pub capacity: i64,
    pub directionality: Directionality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symmetric_path: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_stp: Option<StpId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_stp: Option<StpId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ero: Option<Vec<OrderedStp>>,
}

impl P2PService {
    /// Appends the hops to the explicit route object, numbering them after
    /// any hops already present. An empty hop list leaves the route untouched.
    pub fn append_explicit_route(&mut self, hops: &[StpId]) {
        if hops.is_empty() {
            return;
        }

        let route = self.ero.get_or_insert_with(Vec::new);
        let offset = route.len();

        for (index, stp) in hops.iter().enumerate() {
            log::debug!("ero order={}, stp={}", offset + index, stp);
            route.push(OrderedStp { order: (offset + index) as u32, stp: stp.clone() });
        }
    }
}

/// Criteria sent with a reserve request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequestCriteria {
    pub version: u32,
    pub schedule: Schedule,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2ps: Option<P2PService>,
}

impl ReservationRequestCriteria {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.schedule.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.schedule.end_time
    }

    pub fn capacity(&self) -> Option<i64> {
        self.p2ps.as_ref().map(|p2ps| p2ps.capacity)
    }

    /// Explicit route hops in order; empty when no route is set.
    pub fn explicit_route(&self) -> &[OrderedStp] {
        self.p2ps.as_ref().and_then(|p2ps| p2ps.ero.as_deref()).unwrap_or(&[])
    }

    /// Applies an explicit route to the point-to-point element.
    ///
    /// Criteria without a point-to-point element are returned unchanged.
    pub fn apply_explicit_route(&mut self, hops: &[StpId]) {
        match self.p2ps.as_mut() {
            Some(p2ps) => p2ps.append_explicit_route(hops),
            None => log::debug!("Criteria carry no point-to-point service, explicit route ignored"),
        }
    }
}

/// Criteria as confirmed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationConfirmCriteria {
    pub version: u32,
    pub schedule: Schedule,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2ps: Option<P2PService>,
}

impl ReservationConfirmCriteria {
    pub fn from_request(criteria: &ReservationRequestCriteria, version: u32) -> Self {
        Self { version, schedule: criteria.schedule.clone(), service_type: criteria.service_type.clone(), p2ps: criteria.p2ps.clone() }
    }
}
