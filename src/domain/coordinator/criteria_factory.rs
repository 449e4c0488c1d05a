use chrono::{DateTime, Utc};

use crate::domain::nsi::criteria::ReservationRequestCriteria;
use crate::domain::nsi::message_builder::MessageBuilder;
use crate::domain::utils::id::StpId;
use crate::error::{Error, Result};

/// Epoch-seconds marker for "not specified".
pub const UNSPECIFIED_TIME: i64 = -1;

/// Windows ending at most this long after the start are replaced by the default duration.
pub const SHORT_WINDOW_S: i64 = 3 * 3600;

/// Duration applied to short or degenerate windows (3 days).
pub const DEFAULT_DURATION_S: i64 = 72 * 3600;

/// Source and destination termination points with their VLAN tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub source_stp: StpId,
    pub source_vlan: u16,
    pub dest_stp: StpId,
    pub dest_vlan: u16,
}

/// Absolute instants resolved from a requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

fn instant(name: &str, epoch_s: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(epoch_s, 0).ok_or_else(|| Error::invalid_attribute(name, format!("{} is not a representable instant", epoch_s)))
}

/// Resolves requested epoch seconds against `now_s`.
///
/// A start in the past (or now) becomes now. An end no later than three hours
/// after the resolved start becomes resolved start + 72 h. `-1` omits the
/// instant from the window; an omitted start still anchors the end at now.
pub fn resolve_schedule_window(start_time: i64, end_time: i64, now_s: i64) -> Result<ScheduleWindow> {
    let resolved_start = start_time.max(now_s);

    let resolved_end = if end_time <= resolved_start.saturating_add(SHORT_WINDOW_S) {
        resolved_start.saturating_add(DEFAULT_DURATION_S)
    } else {
        end_time
    };

    let start = if start_time == UNSPECIFIED_TIME { None } else { Some(instant("start_time", resolved_start)?) };
    let end = if end_time == UNSPECIFIED_TIME { None } else { Some(instant("end_time", resolved_end)?) };

    Ok(ScheduleWindow { start, end })
}

/// Builds version-0 criteria for a new reservation.
pub fn make_reservation_criteria(
    builder: &dyn MessageBuilder,
    endpoints: &ServiceEndpoints,
    capacity: i64,
    start_time: i64,
    end_time: i64,
    now_s: i64,
) -> Result<ReservationRequestCriteria> {
    let window = resolve_schedule_window(start_time, end_time, now_s)?;
    let schedule = builder.build_schedule(window.start, window.end);

    let mut criteria = builder.build_criteria(
        schedule,
        &endpoints.source_stp,
        endpoints.source_vlan,
        &endpoints.dest_stp,
        endpoints.dest_vlan,
        capacity,
    );
    criteria.version = 0;
    Ok(criteria)
}

/// Same as [`make_reservation_criteria`], with an explicit route applied.
pub fn make_reservation_criteria_with_route(
    builder: &dyn MessageBuilder,
    endpoints: &ServiceEndpoints,
    capacity: i64,
    start_time: i64,
    end_time: i64,
    now_s: i64,
    explicit_route: &[StpId],
) -> Result<ReservationRequestCriteria> {
    let mut criteria = make_reservation_criteria(builder, endpoints, capacity, start_time, end_time, now_s)?;
    criteria.apply_explicit_route(explicit_route);
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::nsi::message_builder::P2pMessageBuilder;

    const NOW: i64 = 1_700_000_000;

    fn endpoints() -> ServiceEndpoints {
        ServiceEndpoints {
            source_stp: StpId::new("urn:ogf:network:a.net:2013:topology:port-a"),
            source_vlan: 1202,
            dest_stp: StpId::new("urn:ogf:network:b.net:2013:topology:port-b"),
            dest_vlan: 2001,
        }
    }

    #[test]
    fn past_start_resolves_to_now() {
        let window = resolve_schedule_window(0, NOW + 10 * 3600, NOW).unwrap();

        assert_eq!(window.start.unwrap().timestamp(), NOW);
        assert_eq!(window.end.unwrap().timestamp(), NOW + 10 * 3600);
    }

    #[test]
    fn future_start_is_kept() {
        let start = NOW + 600;
        let window = resolve_schedule_window(start, start + 5 * 3600, NOW).unwrap();

        assert_eq!(window.start.unwrap().timestamp(), start);
        assert_eq!(window.end.unwrap().timestamp(), start + 5 * 3600);
    }

    #[test]
    fn short_windows_get_default_duration() {
        let start = NOW + 600;
        for end in [0, start - 1, start, start + 1, start + SHORT_WINDOW_S] {
            let window = resolve_schedule_window(start, end, NOW).unwrap();
            assert_eq!(window.end.unwrap().timestamp(), start + DEFAULT_DURATION_S, "end={}", end);
        }

        let window = resolve_schedule_window(start, start + SHORT_WINDOW_S + 1, NOW).unwrap();
        assert_eq!(window.end.unwrap().timestamp(), start + SHORT_WINDOW_S + 1);
    }

    #[test]
    fn unspecified_times_are_omitted() {
        let window = resolve_schedule_window(UNSPECIFIED_TIME, NOW + 10 * 3600, NOW).unwrap();
        assert!(window.start.is_none());
        assert_eq!(window.end.unwrap().timestamp(), NOW + 10 * 3600);

        let window = resolve_schedule_window(NOW + 60, UNSPECIFIED_TIME, NOW).unwrap();
        assert_eq!(window.start.unwrap().timestamp(), NOW + 60);
        assert!(window.end.is_none());

        let window = resolve_schedule_window(UNSPECIFIED_TIME, UNSPECIFIED_TIME, NOW).unwrap();
        assert_eq!(window, ScheduleWindow { start: None, end: None });
    }

    #[test]
    fn zero_window_becomes_three_days_from_now() {
        let builder = P2pMessageBuilder::new();
        let criteria = make_reservation_criteria(&builder, &endpoints(), 50, 0, 0, NOW).unwrap();

        let start = criteria.start_time().unwrap();
        let end = criteria.end_time().unwrap();
        assert_eq!(start.timestamp(), NOW);
        assert_eq!((end - start).num_hours(), 72);
        assert_eq!(criteria.version, 0);
        assert_eq!(criteria.capacity(), Some(50));
    }

    #[test]
    fn route_is_applied_in_order() {
        let builder = P2pMessageBuilder::new();
        let route = vec![StpId::new("urn:ero:x"), StpId::new("urn:ero:y")];

        let criteria = make_reservation_criteria_with_route(&builder, &endpoints(), 50, 0, 0, NOW, &route).unwrap();

        let hops: Vec<(u32, &str)> = criteria.explicit_route().iter().map(|hop| (hop.order, hop.stp.as_str())).collect();
        assert_eq!(hops, vec![(0, "urn:ero:x"), (1, "urn:ero:y")]);

        let criteria = make_reservation_criteria_with_route(&builder, &endpoints(), 50, 0, 0, NOW, &[]).unwrap();
        assert!(criteria.p2ps.unwrap().ero.is_none());
    }
}
