use std::sync::Arc;

use serde::Serialize;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::coordinator::coordinator_config::{CoordinatorConfig, NotificationChannel, ProviderEndpoint};
use crate::domain::coordinator::criteria_factory::{self, ServiceEndpoints, UNSPECIFIED_TIME};
use crate::domain::nsi::criteria::ReservationRequestCriteria;
use crate::domain::nsi::message_builder::{MessageBuilder, P2pMessageBuilder};
use crate::domain::nsi::query::{QueryNotificationConfirmed, QueryNotificationReply, QueryNotificationRequest, QueryRequest, QuerySummaryConfirmed};
use crate::domain::nsi::text_dump::{show_message, to_text};
use crate::domain::protocol::protocol_client_trait::ProtocolClient;
use crate::domain::protocol::reply::{GenericReply, ReserveOutcome, ReserveReply, ReserveRequest};
use crate::domain::reservation::reservation_locks::ReservationLocks;
use crate::domain::reservation::reservation_store::ReservationStore;
use crate::domain::utils::id::{ConnectionId, GlobalReservationId, StpId};
use crate::error::{Error, Result};

/// Everything needed to create and commit a new reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub global_reservation_id: Option<GlobalReservationId>,
    pub description: Option<String>,
    pub endpoints: ServiceEndpoints,
    /// Bandwidth in Mbit/s.
    pub capacity: i64,
    /// Epoch seconds, `-1` for "start immediately".
    pub start_time: i64,
    /// Epoch seconds, `-1` for "until terminated".
    pub end_time: i64,
    /// Ordered hops; empty for no explicit route.
    pub explicit_route: Vec<StpId>,
}

/// Result of a notification query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub synchronous: QueryNotificationConfirmed,
    /// Only present with a callback channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asynchronous: Option<QueryNotificationReply>,
}

/// Drives the reservation lifecycle against one provider and keeps the local
/// view of every reservation consistent with what the provider confirmed.
#[derive(Debug)]
pub struct ReservationCoordinator {
    provider: ProviderEndpoint,
    notification_channel: NotificationChannel,
    client: Arc<dyn ProtocolClient>,
    builder: Box<dyn MessageBuilder>,
    clock: Arc<dyn Clock>,
    store: ReservationStore,
    locks: ReservationLocks,
}

impl ReservationCoordinator {
    pub fn new(config: &CoordinatorConfig, client: Arc<dyn ProtocolClient>, store: ReservationStore) -> Self {
        log::info!(
            "Coordinator for provider {} ({}) in {} mode, reply wait {:?}",
            config.provider.nsa,
            config.provider.uri,
            match &config.notification_channel {
                NotificationChannel::Callback { .. } => "callback",
                NotificationChannel::RequestOnly => "request-only",
            },
            config.reply_wait
        );

        Self {
            provider: config.provider.clone(),
            notification_channel: config.notification_channel.clone(),
            client,
            builder: Box::new(P2pMessageBuilder::new()),
            clock: Arc::new(SystemClock::new()),
            store,
            locks: ReservationLocks::new(),
        }
    }

    pub fn with_message_builder(mut self, builder: Box<dyn MessageBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &ReservationStore {
        &self.store
    }

    pub fn locks(&self) -> &ReservationLocks {
        &self.locks
    }

    pub fn notification_channel(&self) -> &NotificationChannel {
        &self.notification_channel
    }

    pub fn provider(&self) -> &ProviderEndpoint {
        &self.provider
    }

    /// Builds version-0 criteria for a new reservation, resolving the requested window against now.
    pub fn make_reservation_criteria(
        &self,
        endpoints: &ServiceEndpoints,
        capacity: i64,
        start_time: i64,
        end_time: i64,
        explicit_route: &[StpId],
    ) -> Result<ReservationRequestCriteria> {
        criteria_factory::make_reservation_criteria_with_route(
            self.builder.as_ref(),
            endpoints,
            capacity,
            start_time,
            end_time,
            self.clock.get_current_time_in_s(),
            explicit_route,
        )
    }

    /// Reserves and commits a new reservation.
    ///
    /// Criteria and capacity are recorded only after the commit is confirmed.
    /// A failed commit leaves the held reservation and its confirmed version in place.
    pub fn reserve_commit(&self, request: &ReservationRequest) -> Result<ConnectionId> {
        let criteria = self.make_reservation_criteria(
            &request.endpoints,
            request.capacity,
            request.start_time,
            request.end_time,
            &request.explicit_route,
        )?;

        let reservation_id =
            self.reserve(None, request.global_reservation_id.as_ref(), request.description.as_deref(), criteria.clone())?;
        log::debug!("Reserved {}, committing", reservation_id);

        self.commit(&reservation_id)?;

        self.store.record_terms(&reservation_id, criteria, request.capacity);
        log::info!("Reservation {} committed ({} Mbit/s)", reservation_id, request.capacity);
        Ok(reservation_id)
    }

    /// Sends a reserve request and stores the version the provider confirmed.
    ///
    /// Without `reservation_id` a new reservation is created and the provider
    /// assigned id is returned.
    pub fn reserve(
        &self,
        reservation_id: Option<&ConnectionId>,
        global_reservation_id: Option<&GlobalReservationId>,
        description: Option<&str>,
        criteria: ReservationRequestCriteria,
    ) -> Result<ConnectionId> {
        let request = ReserveRequest {
            connection_id: reservation_id.cloned(),
            global_reservation_id: global_reservation_id.cloned(),
            description: description.map(str::to_string),
            criteria,
        };

        // Ids this requester does not track get no lock region.
        match reservation_id {
            Some(id) if self.store.contains(id) => self.locks.with_exclusive(id, || self.send_reserve(request)),
            _ => self.send_reserve(request),
        }
    }

    /// Modifies the end of an existing reservation, keeping its start and capacity.
    ///
    /// `end_time` is epoch seconds; `-1` makes the reservation open ended. The
    /// stored version only ever changes to a version the provider confirmed.
    pub fn modify(
        &self,
        global_reservation_id: Option<&GlobalReservationId>,
        description: Option<&str>,
        reservation_id: &ConnectionId,
        end_time: i64,
    ) -> Result<ConnectionId> {
        if self.modifiable_terms(reservation_id).is_none() {
            log::warn!("Modify of unknown reservation {}", reservation_id);
            return Err(Error::UnknownReservation(reservation_id.clone()));
        }

        self.locks.with_exclusive(reservation_id, || {
            let Some((old, capacity)) = self.modifiable_terms(reservation_id) else {
                log::warn!("Reservation {} was terminated before it could be modified", reservation_id);
                return Err(Error::UnknownReservation(reservation_id.clone()));
            };

            let end = if end_time == UNSPECIFIED_TIME {
                None
            } else {
                Some(chrono::DateTime::from_timestamp(end_time, 0).ok_or_else(|| {
                    Error::invalid_attribute("end_time", format!("{} is not a representable instant", end_time))
                })?)
            };

            let schedule = self.builder.build_schedule(old.start_time(), end);
            let mut criteria = self.builder.build_modify_criteria(schedule, capacity);
            criteria.version = self.store.next_version(reservation_id)?;

            let request = ReserveRequest {
                connection_id: Some(reservation_id.clone()),
                global_reservation_id: global_reservation_id.cloned(),
                description: description.map(str::to_string),
                criteria,
            };

            self.send_reserve(request)
        })
    }

    /// `modify` followed by `commit`; no commit is attempted when the modification fails.
    pub fn modify_commit(
        &self,
        global_reservation_id: Option<&GlobalReservationId>,
        description: Option<&str>,
        reservation_id: &ConnectionId,
        end_time: i64,
    ) -> Result<ConnectionId> {
        let modified_id = self.modify(global_reservation_id, description, reservation_id, end_time)?;
        self.commit(reservation_id)?;
        Ok(modified_id)
    }

    /// Commits a held reservation. A rejected commit leaves local state untouched.
    pub fn commit(&self, reservation_id: &ConnectionId) -> Result<()> {
        let reply = self.client.reserve_commit(reservation_id)?;
        match reply.service_exception {
            None => {
                log::debug!("ReserveCommitConfirmed for {}", reservation_id);
                Ok(())
            }
            Some(exception) => {
                log::warn!("Commit of {} rejected: {}", reservation_id, exception);
                show_message("ServiceException", &exception);
                show_message("ConnectionStates", &reply.connection_states);
                Err(Error::ProtocolFailure(exception))
            }
        }
    }

    /// Aborts a held reservation. Local state is kept for follow-up operations.
    pub fn abort(&self, reservation_id: &ConnectionId) -> Result<()> {
        log::debug!("Aborting {}", reservation_id);
        let reply = self.client.reserve_abort(reservation_id)?;
        Self::confirm_generic("Abort", reply)
    }

    pub fn provision(&self, reservation_id: &ConnectionId) -> Result<()> {
        log::debug!("Provisioning {}", reservation_id);
        let reply = self.client.provision(reservation_id)?;
        Self::confirm_generic("Provision", reply)
    }

    pub fn release(&self, reservation_id: &ConnectionId) -> Result<()> {
        log::debug!("Releasing {}", reservation_id);
        let reply = self.client.release(reservation_id)?;
        Self::confirm_generic("Release", reply)
    }

    /// Terminates a reservation and always drops its local bookkeeping,
    /// even when the provider reports a failure. The failure is still returned.
    pub fn terminate(&self, reservation_id: &ConnectionId) -> Result<()> {
        log::debug!("Terminating {}", reservation_id);

        let outcome = self.locks.with_exclusive(reservation_id, || {
            let outcome = self.client.terminate(reservation_id);
            self.store.remove(reservation_id);
            outcome
        });
        self.locks.remove(reservation_id);

        match outcome {
            Ok(reply) => Self::confirm_generic("Terminate", reply),
            Err(e) => {
                log::warn!("Terminate of {} failed, local state dropped anyway: {}", reservation_id, e);
                Err(e)
            }
        }
    }

    /// Synchronous summary query for one reservation.
    pub fn query_summary(&self, reservation_id: &ConnectionId) -> Result<QuerySummaryConfirmed> {
        let summary = self.client.query_summary_sync(&QueryRequest::for_connection(reservation_id))?;
        show_message("QuerySummary (sync)", &summary);
        Ok(summary)
    }

    /// Summary of the reservation rendered as text.
    pub fn query(&self, reservation_id: &ConnectionId) -> Result<String> {
        self.query_summary(reservation_id).map(|summary| to_text(&summary))
    }

    /// Notification query. The asynchronous variant runs only with a callback channel.
    pub fn query_notification(&self, reservation_id: &ConnectionId) -> Result<NotificationReport> {
        let query = QueryNotificationRequest::all(reservation_id);

        let synchronous = self.client.query_notification_sync(&query)?;
        show_message("QueryNotification (sync)", &synchronous);

        let asynchronous = match &self.notification_channel {
            NotificationChannel::Callback { .. } => {
                let reply = self.client.query_notification(&query)?;
                match &reply {
                    QueryNotificationReply::Confirmed(confirmed) => show_message("QueryNotification (async)", confirmed),
                    QueryNotificationReply::Exception(exception) => {
                        log::warn!("Asynchronous notification query for {} failed: {}", reservation_id, exception);
                        show_message("QueryNotification (async)", exception);
                    }
                }
                Some(reply)
            }
            NotificationChannel::RequestOnly => None,
        };

        Ok(NotificationReport { synchronous, asynchronous })
    }

    /// Criteria and capacity of a committed reservation, the inputs of a modification.
    fn modifiable_terms(&self, reservation_id: &ConnectionId) -> Option<(ReservationRequestCriteria, i64)> {
        Some((self.store.get_criteria(reservation_id)?, self.store.get_capacity(reservation_id)?))
    }

    fn send_reserve(&self, request: ReserveRequest) -> Result<ConnectionId> {
        show_message("ReservationRequestCriteria", &request.criteria);
        let requested_id = request.connection_id.clone();

        let reply = self.client.reserve(request)?;
        let (reservation_id, version) = Self::interpret_reserve_reply(requested_id, reply)?;

        self.store.record_version(&reservation_id, version);
        Ok(reservation_id)
    }

    /// Extracts the reservation id and the confirmed version, or the service exception.
    fn interpret_reserve_reply(requested_id: Option<ConnectionId>, reply: ReserveReply) -> Result<(ConnectionId, u32)> {
        match reply.outcome {
            ReserveOutcome::Confirmed(confirm) => {
                let reservation_id = reply.connection_id.or(requested_id).ok_or_else(|| {
                    Error::TransportFailure("reserve confirmation carries no connection id".to_string())
                })?;
                log::debug!("ReserveConfirmed {} version {}", reservation_id, confirm.version);
                show_message("ReservationConfirmCriteria", &confirm);
                Ok((reservation_id, confirm.version))
            }
            ReserveOutcome::Failed(exception) => {
                log::warn!("Reserve failed: {}", exception);
                show_message("ServiceException", &exception);
                show_message("ConnectionStates", &reply.connection_states);
                Err(Error::ProtocolFailure(exception))
            }
        }
    }

    fn confirm_generic(operation: &str, reply: GenericReply) -> Result<()> {
        match reply.service_exception {
            None => {
                log::debug!("{} confirmed for {}", operation, reply.connection_id);
                Ok(())
            }
            Some(exception) => {
                log::warn!("{} of {} rejected: {}", operation, reply.connection_id, exception);
                show_message("ConnectionStates", &reply.connection_states);
                Err(Error::ProtocolFailure(exception))
            }
        }
    }
}
