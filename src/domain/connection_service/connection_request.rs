use lazy_static::lazy_static;

use crate::api::connection_dto::{ConnectionAttributesDto, NumberOrStringDto};
use crate::domain::clock::Clock;
use crate::domain::coordinator::coordinator::ReservationRequest;
use crate::domain::coordinator::criteria_factory::ServiceEndpoints;
use crate::domain::utils::id::{GlobalReservationId, StpId};
use crate::domain::utils::time_constraints::time_constraints;
use crate::error::{Error, Result};

lazy_static! {
    /// Global reservation id attached to every connection created through the service front end.
    pub static ref DEFAULT_GLOBAL_RESERVATION_ID: GlobalReservationId = GlobalReservationId::new("NSI-REST service");
}

/// Validated connection attributes, resolved to epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub global_reservation_id: GlobalReservationId,
    pub description: String,
    pub source_stp: StpId,
    pub source_vlan: u16,
    pub dest_stp: StpId,
    pub dest_vlan: u16,
    pub capacity: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub explicit_routes: Vec<StpId>,
}

impl ConnectionRequest {
    /// Builds a request from client attributes.
    ///
    /// Termination points are `domain:port`. A missing start or end replaces the
    /// whole window by a generated one starting shortly after now.
    pub fn from_attributes(dto: &ConnectionAttributesDto, clock: &dyn Clock) -> Result<Self> {
        let description = required_text("description", &dto.description)?;
        let source_stp = stp("src", &dto.src_domain, &dto.src_port)?;
        let dest_stp = stp("dst", &dto.dst_domain, &dto.dst_port)?;
        let source_vlan = vlan("src_vlan", &dto.src_vlan)?;
        let dest_vlan = vlan("dst_vlan", &dto.dst_vlan)?;

        let capacity = required_number("capacity", &dto.capacity)?;
        if capacity <= 0 {
            return Err(Error::invalid_attribute("capacity", format!("must be positive, got {}", capacity)));
        }

        let (start_time, end_time) =
            time_constraints(dto.start_time.as_deref(), dto.end_time.as_deref(), clock.get_current_time_in_s())?;

        let explicit_routes = dto
            .explicit_routes
            .iter()
            .flatten()
            .map(|hop| hop.trim())
            .filter(|hop| !hop.is_empty())
            .map(StpId::new)
            .collect();

        Ok(Self {
            global_reservation_id: DEFAULT_GLOBAL_RESERVATION_ID.clone(),
            description,
            source_stp,
            source_vlan,
            dest_stp,
            dest_vlan,
            capacity,
            start_time,
            end_time,
            explicit_routes,
        })
    }

    pub fn to_reservation_request(&self) -> ReservationRequest {
        ReservationRequest {
            global_reservation_id: Some(self.global_reservation_id.clone()),
            description: Some(self.description.clone()),
            endpoints: ServiceEndpoints {
                source_stp: self.source_stp.clone(),
                source_vlan: self.source_vlan,
                dest_stp: self.dest_stp.clone(),
                dest_vlan: self.dest_vlan,
            },
            capacity: self.capacity,
            start_time: self.start_time,
            end_time: self.end_time,
            explicit_route: self.explicit_routes.clone(),
        }
    }
}

fn required_text(name: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(Error::invalid_attribute(name, "missing or empty")),
    }
}

fn required_number(name: &str, value: &Option<NumberOrStringDto>) -> Result<i64> {
    let value = value.as_ref().ok_or_else(|| Error::invalid_attribute(name, "missing"))?;
    value.as_i64().ok_or_else(|| Error::invalid_attribute(name, format!("{:?} is not an integer", value)))
}

fn vlan(name: &str, value: &Option<NumberOrStringDto>) -> Result<u16> {
    let number = required_number(name, value)?;
    u16::try_from(number).map_err(|_| Error::invalid_attribute(name, format!("{} is out of range", number)))
}

fn stp(side: &str, domain: &Option<String>, port: &Option<String>) -> Result<StpId> {
    let domain = required_text(&format!("{}_domain", side), domain)?;
    let port = required_text(&format!("{}_port", side), port)?;
    Ok(StpId::new(format!("{}:{}", domain, port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::MockClock;
    use crate::domain::utils::time_constraints::{GENERATED_WINDOW_S, PROCESSING_MARGIN_S};

    const NOW: i64 = 1_700_000_000;

    fn attributes() -> ConnectionAttributesDto {
        ConnectionAttributesDto {
            description: Some("required by service 3232-4345".to_string()),
            src_domain: Some("urn:ogf:network:pionier.net.pl:2013:topology".to_string()),
            src_port: Some("felix-ge-1-0-9".to_string()),
            src_vlan: Some(NumberOrStringDto::Number(1202)),
            dst_domain: Some("urn:ogf:network:geant.net:2013:topology".to_string()),
            dst_port: Some("iMinds__port__to__GEANT".to_string()),
            dst_vlan: Some(NumberOrStringDto::Text("2001".to_string())),
            capacity: Some(NumberOrStringDto::Number(100)),
            start_time: None,
            end_time: None,
            explicit_routes: None,
        }
    }

    #[test]
    fn builds_stps_from_domain_and_port() {
        let request = ConnectionRequest::from_attributes(&attributes(), &MockClock::new(NOW)).unwrap();

        assert_eq!(request.source_stp.as_str(), "urn:ogf:network:pionier.net.pl:2013:topology:felix-ge-1-0-9");
        assert_eq!(request.dest_stp.as_str(), "urn:ogf:network:geant.net:2013:topology:iMinds__port__to__GEANT");
        assert_eq!((request.source_vlan, request.dest_vlan), (1202, 2001));
        assert_eq!(request.global_reservation_id.as_str(), "NSI-REST service");
        assert_eq!(request.start_time, NOW + PROCESSING_MARGIN_S);
        assert_eq!(request.end_time, NOW + PROCESSING_MARGIN_S + GENERATED_WINDOW_S);
        assert!(request.explicit_routes.is_empty());
    }

    #[test]
    fn explicit_window_is_used_when_complete() {
        let mut dto = attributes();
        dto.start_time = Some("2030-01-01T00:00:00+01:00".to_string());
        dto.end_time = Some("2030-01-01T12:00:00Z".to_string());

        let request = ConnectionRequest::from_attributes(&dto, &MockClock::new(NOW)).unwrap();

        assert_eq!(request.start_time, 1_893_452_400 + PROCESSING_MARGIN_S);
        assert_eq!(request.end_time, 1_893_499_200);
    }

    #[test]
    fn missing_or_malformed_attributes_are_rejected() {
        let clock = MockClock::new(NOW);

        let mut dto = attributes();
        dto.src_port = Some("  ".to_string());
        assert!(matches!(ConnectionRequest::from_attributes(&dto, &clock), Err(Error::InvalidAttribute { name, .. }) if name == "src_port"));

        let mut dto = attributes();
        dto.dst_vlan = Some(NumberOrStringDto::Text("vlan-7".to_string()));
        assert!(matches!(ConnectionRequest::from_attributes(&dto, &clock), Err(Error::InvalidAttribute { name, .. }) if name == "dst_vlan"));

        let mut dto = attributes();
        dto.src_vlan = Some(NumberOrStringDto::Number(70_000));
        assert!(ConnectionRequest::from_attributes(&dto, &clock).is_err());

        let mut dto = attributes();
        dto.capacity = None;
        assert!(matches!(ConnectionRequest::from_attributes(&dto, &clock), Err(Error::InvalidAttribute { name, .. }) if name == "capacity"));
    }

    #[test]
    fn explicit_routes_keep_their_order() {
        let mut dto = attributes();
        dto.explicit_routes = Some(vec!["urn:hop:1".to_string(), "".to_string(), "urn:hop:2".to_string()]);

        let request = ConnectionRequest::from_attributes(&dto, &MockClock::new(NOW)).unwrap();
        let reservation = request.to_reservation_request();

        let hops: Vec<&str> = reservation.explicit_route.iter().map(StpId::as_str).collect();
        assert_eq!(hops, vec!["urn:hop:1", "urn:hop:2"]);
        assert_eq!(reservation.capacity, 100);
        assert_eq!(reservation.description.as_deref(), Some("required by service 3232-4345"));
    }
}
