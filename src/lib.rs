use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::coordinator::coordinator::ReservationCoordinator;
use crate::domain::coordinator::coordinator_config::CoordinatorConfig;
use crate::domain::protocol::protocol_client_trait::ProtocolClient;
use crate::domain::protocol::provider_session::ProviderSession;
use crate::domain::reservation::reservation_store::ReservationStore;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Starts a provider session over `client` and builds a coordinator that talks through it.
///
/// The returned session handle is only needed to shut the worker down.
pub fn start_coordinator(
    config: &CoordinatorConfig,
    client: Arc<dyn ProtocolClient>,
    clock: Arc<dyn Clock>,
) -> Result<(ReservationCoordinator, ProviderSession)> {
    let session = ProviderSession::spawn(config.provider.nsa.to_string(), client, config.reply_wait)?;
    log::info!("Provider session to {} started.", config.provider.uri);

    let coordinator = ReservationCoordinator::new(config, Arc::new(session.clone()), ReservationStore::new()).with_clock(clock);
    Ok((coordinator, session))
}
