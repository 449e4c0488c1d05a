mod provider_fixture;

use logtest::Logger;

use nsi_rust_requester::domain::nsi::service_exception::error_ids;
use nsi_rust_requester::domain::protocol::protocol_client_trait::ProviderOperation;

use provider_fixture::{reservation_request, setup};

// Single test: logtest installs a process-wide logger.
#[test]
fn test_commit_failure_is_logged() {
    let mut logger = Logger::start();
    let fixture = setup();
    fixture.provider.fail_next(ProviderOperation::ReserveCommit, error_ids::INTERNAL_ERROR, "commit refused by test");

    assert!(fixture.coordinator.reserve_commit(&reservation_request(50, 0, 0)).is_err());

    let mut warned = false;
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Warn && record.args().contains("commit refused by test") {
            warned = true;
        }
    }
    assert!(warned, "commit failure was not logged");
}
