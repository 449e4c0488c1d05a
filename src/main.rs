use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use nsi_rust_requester::domain::clock::{Clock, SystemClock};
use nsi_rust_requester::domain::coordinator::coordinator::ReservationRequest;
use nsi_rust_requester::domain::coordinator::coordinator_config::CoordinatorConfig;
use nsi_rust_requester::domain::coordinator::criteria_factory::ServiceEndpoints;
use nsi_rust_requester::domain::nsi::service_exception::error_ids;
use nsi_rust_requester::domain::protocol::protocol_client_trait::ProviderOperation;
use nsi_rust_requester::domain::protocol::simulated_provider::SimulatedProvider;
use nsi_rust_requester::domain::utils::id::{GlobalReservationId, StpId};
use nsi_rust_requester::{logger, start_coordinator};

/// Runs a complete reservation lifecycle against an in-process provider.
#[derive(Debug, Parser)]
#[command(name = "nsi-requester", version)]
struct Cli {
    /// Coordinator configuration (JSON).
    #[arg(long, default_value = "config/requester.json")]
    config: PathBuf,

    /// Artificial delay of every provider reply.
    #[arg(long, default_value_t = 0)]
    provider_delay_ms: u64,

    /// Pause between lifecycle steps.
    #[arg(long, default_value_t = 0)]
    pause_secs: u64,

    /// Let the provider reject the first call of this operation (e.g. `reserveCommit`).
    #[arg(long)]
    inject_fault: Option<ProviderOperation>,
}

fn main() -> Result<()> {
    logger::init();
    let cli = Cli::parse();

    log::info!("Loading configuration from '{}'.", cli.config.display());
    let config = CoordinatorConfig::from_json_file(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let provider = Arc::new(SimulatedProvider::new(&config, clock.clone()).with_reply_delay(Duration::from_millis(cli.provider_delay_ms)));
    if let Some(operation) = cli.inject_fault {
        log::info!("Provider will reject the first {:?} call.", operation);
        provider.fail_next(operation, error_ids::INTERNAL_ERROR, "fault injected from the command line");
    }

    let (coordinator, session) = start_coordinator(&config, provider, clock.clone())?;
    let pause = || thread::sleep(Duration::from_secs(cli.pause_secs));

    let request = ReservationRequest {
        global_reservation_id: Some(GlobalReservationId::new("NSI-REST service")),
        description: Some("nsi-requester demo".to_string()),
        endpoints: ServiceEndpoints {
            source_stp: StpId::new("urn:ogf:network:example.net:2013:topology:port-a"),
            source_vlan: 1202,
            dest_stp: StpId::new("urn:ogf:network:example.net:2013:topology:port-b"),
            dest_vlan: 2001,
        },
        capacity: 100,
        start_time: 0,
        end_time: 0,
        explicit_route: Vec::new(),
    };

    let outcome = (|| -> Result<()> {
        let id = coordinator.reserve_commit(&request).context("reserveCommit")?;
        log::info!("Reservation {} committed.", id);
        pause();

        coordinator.provision(&id).context("provision")?;
        log::info!("Connection {} provisioned.", id);
        log::info!("Summary:\n{}", coordinator.query(&id)?);
        pause();

        let new_end = clock.get_current_time_in_s() + 7 * 24 * 3600;
        coordinator.modify_commit(None, Some("nsi-requester demo (extended)"), &id, new_end).context("modifyCommit")?;
        log::info!("Reservation {} extended, now at version {:?}.", id, coordinator.store().get_version(&id));
        pause();

        coordinator.release(&id).context("release")?;
        pause();
        coordinator.provision(&id).context("provision")?;

        let report = coordinator.query_notification(&id)?;
        log::info!("{} notifications for {}.", report.synchronous.notifications.len(), id);
        pause();

        coordinator.terminate(&id).context("terminate")?;
        log::info!("Connection {} terminated.", id);
        Ok(())
    })();

    session.shutdown();

    if let Err(e) = &outcome {
        log::error!("Demo lifecycle failed: {:#}", e);
    }
    outcome
}
