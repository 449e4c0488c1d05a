#![allow(dead_code)]

use std::sync::Arc;

use nsi_rust_requester::domain::clock::MockClock;
use nsi_rust_requester::domain::coordinator::coordinator::{ReservationCoordinator, ReservationRequest};
use nsi_rust_requester::domain::coordinator::coordinator_config::CoordinatorConfig;
use nsi_rust_requester::domain::coordinator::criteria_factory::ServiceEndpoints;
use nsi_rust_requester::domain::protocol::simulated_provider::SimulatedProvider;
use nsi_rust_requester::domain::reservation::reservation_store::ReservationStore;
use nsi_rust_requester::domain::utils::id::{GlobalReservationId, StpId};

pub const NOW: i64 = 1_700_000_000;

pub const PROVIDER_NSA: &str = "urn:ogf:network:provider.example.net:2013:nsa";
pub const REQUESTER_NSA: &str = "urn:ogf:network:requester.example.net:2013:nsa";

pub fn request_only_config() -> CoordinatorConfig {
    CoordinatorConfig::new(PROVIDER_NSA, "https://provider.example.net/nsi/ConnectionProvider", REQUESTER_NSA, None)
}

pub fn callback_config() -> CoordinatorConfig {
    CoordinatorConfig::new(
        PROVIDER_NSA,
        "https://provider.example.net/nsi/ConnectionProvider",
        REQUESTER_NSA,
        Some("https://requester.example.net/nsi/ConnectionRequester"),
    )
}

pub struct Fixture {
    pub coordinator: Arc<ReservationCoordinator>,
    pub provider: Arc<SimulatedProvider>,
    pub clock: MockClock,
}

/// Coordinator talking directly to a simulated provider, both on a mock clock at `NOW`.
pub fn setup_with(config: CoordinatorConfig, customize: impl FnOnce(SimulatedProvider) -> SimulatedProvider) -> Fixture {
    let clock = MockClock::new(NOW);
    let provider = Arc::new(customize(SimulatedProvider::new(&config, Arc::new(clock.clone()))));
    let coordinator =
        Arc::new(ReservationCoordinator::new(&config, provider.clone(), ReservationStore::new()).with_clock(Arc::new(clock.clone())));

    Fixture { coordinator, provider, clock }
}

pub fn setup() -> Fixture {
    setup_with(request_only_config(), |provider| provider)
}

pub fn reservation_request(capacity: i64, start_time: i64, end_time: i64) -> ReservationRequest {
    ReservationRequest {
        global_reservation_id: Some(GlobalReservationId::new("urn:uuid:global-test")),
        description: Some("integration test".to_string()),
        endpoints: ServiceEndpoints {
            source_stp: StpId::new("urn:ogf:network:a.net:2013:topology:port-a"),
            source_vlan: 1202,
            dest_stp: StpId::new("urn:ogf:network:b.net:2013:topology:port-b"),
            dest_vlan: 2001,
        },
        capacity,
        start_time,
        end_time,
        explicit_route: Vec::new(),
    }
}
