use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::coordinator::coordinator_config::CoordinatorConfig;
use crate::domain::nsi::connection_states::{ConnectionStates, DataPlaneStatus, LifecycleState, ProvisionState, ReservationState};
use crate::domain::nsi::criteria::{ReservationConfirmCriteria, ReservationRequestCriteria};
use crate::domain::nsi::query::{
    NotificationEvent, NotificationRecord, QueryNotificationConfirmed, QueryNotificationReply, QueryNotificationRequest, QueryRequest,
    QuerySummaryConfirmed, QuerySummaryResult,
};
use crate::domain::nsi::service_exception::{ServiceException, error_ids};
use crate::domain::protocol::credential::Credential;
use crate::domain::protocol::protocol_client_trait::{ProtocolClient, ProviderOperation};
use crate::domain::protocol::reply::{GenericReply, ReserveOutcome, ReserveReply, ReserveRequest};
use crate::domain::utils::id::{ConnectionId, GlobalReservationId, NsaId};
use crate::error::{Error, Result};

/// One protocol call as seen by the simulated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub operation: ProviderOperation,
    pub connection_id: Option<ConnectionId>,
    /// Criteria version of a reserve request.
    pub requested_version: Option<u32>,
}

#[derive(Debug, Clone)]
struct ProviderConnection {
    global_reservation_id: Option<GlobalReservationId>,
    description: Option<String>,
    committed: Option<ReservationConfirmCriteria>,
    held: Option<ReservationConfirmCriteria>,
    reservation_state: ReservationState,
    provision_state: ProvisionState,
    lifecycle_state: LifecycleState,
    active: bool,
    notifications: Vec<NotificationRecord>,
}

impl ProviderConnection {
    fn states(&self) -> ConnectionStates {
        ConnectionStates {
            reservation_state: self.reservation_state,
            provision_state: Some(self.provision_state),
            lifecycle_state: self.lifecycle_state,
            data_plane_status: DataPlaneStatus {
                active: self.active,
                version: self.committed_version().unwrap_or(0),
                version_consistent: true,
            },
        }
    }

    fn committed_version(&self) -> Option<u32> {
        self.committed.as_ref().map(|criteria| criteria.version)
    }

    fn latest_version(&self) -> Option<u32> {
        self.held.as_ref().or(self.committed.as_ref()).map(|criteria| criteria.version)
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    connections: HashMap<ConnectionId, ProviderConnection>,
    pending_faults: HashMap<ProviderOperation, VecDeque<(String, String)>>,
    calls: Vec<ProviderCall>,
    next_notification_id: u64,
}

/// In-process connection provider implementing the NSI reservation state machine.
///
/// It stands in for a remote provider in tests and in the demo driver:
/// connection ids are `urn:uuid` values, versions are confirmed as requested
/// (plus an optional skew on modifications), faults can be injected per operation.
#[derive(Debug)]
pub struct SimulatedProvider {
    provider_nsa: NsaId,
    requester_nsa: NsaId,
    requester_uri: Option<String>,
    presented_credential: Credential,
    required_credential: Option<Credential>,
    reply_delay: Duration,
    version_skew: u32,
    held_modifications: bool,
    clock: Arc<dyn Clock>,
    state: Mutex<ProviderState>,
}

impl SimulatedProvider {
    pub fn new(config: &CoordinatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider_nsa: config.provider.nsa.clone(),
            requester_nsa: config.requester_nsa.clone(),
            requester_uri: config.notification_channel.requester_uri().map(str::to_string),
            presented_credential: config.credential.clone(),
            required_credential: None,
            reply_delay: Duration::ZERO,
            version_skew: 0,
            held_modifications: false,
            clock,
            state: Mutex::new(ProviderState::default()),
        }
    }

    /// Rejects every call whose session credential differs from `credential`.
    pub fn with_required_credential(mut self, credential: Credential) -> Self {
        self.required_credential = Some(credential);
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Confirms modifications with `requested + skew` instead of the requested version.
    pub fn with_version_skew(mut self, skew: u32) -> Self {
        self.version_skew = skew;
        self
    }

    /// Also accepts a modification while an earlier one is still held; the newer one replaces it.
    pub fn with_held_modifications(mut self) -> Self {
        self.held_modifications = true;
        self
    }

    /// The next call of `operation` is answered with a service exception.
    pub fn fail_next(&self, operation: ProviderOperation, error_id: &str, text: &str) {
        self.lock_state().pending_faults.entry(operation).or_default().push_back((error_id.to_string(), text.to_string()));
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock_state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_state().calls.len()
    }

    /// Last committed version of a connection.
    pub fn committed_version(&self, connection_id: &ConnectionId) -> Option<u32> {
        self.lock_state().connections.get(connection_id).and_then(ProviderConnection::committed_version)
    }

    pub fn connection_states(&self, connection_id: &ConnectionId) -> Option<ConnectionStates> {
        self.lock_state().connections.get(connection_id).map(ProviderConnection::states)
    }

    fn lock_state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn exception(&self, error_id: &str, text: impl Into<String>) -> ServiceException {
        ServiceException::new(self.provider_nsa.clone(), error_id, text)
    }

    /// Records the call, waits the reply delay, authenticates and pops an injected fault.
    fn enter(&self, operation: ProviderOperation, connection_id: Option<&ConnectionId>) -> Result<Option<ServiceException>> {
        self.record_and_enter(ProviderCall { operation, connection_id: connection_id.cloned(), requested_version: None })
    }

    fn record_and_enter(&self, call: ProviderCall) -> Result<Option<ServiceException>> {
        let operation = call.operation;
        let connection_id = call.connection_id.clone();
        self.lock_state().calls.push(call);

        if !self.reply_delay.is_zero() {
            thread::sleep(self.reply_delay);
        }

        if let Some(required) = &self.required_credential {
            if required != &self.presented_credential {
                log::warn!("Provider {} rejected {:?} call: credential mismatch", self.provider_nsa, operation);
                return Err(Error::TransportFailure(format!("HTTP 401 Unauthorized from provider {}", self.provider_nsa)));
            }
        }

        let fault = self.lock_state().pending_faults.get_mut(&operation).and_then(VecDeque::pop_front);
        Ok(fault.map(|(error_id, text)| {
            let exception = self.exception(&error_id, text);
            match connection_id {
                Some(id) => exception.for_connection(id),
                None => exception,
            }
        }))
    }

    fn validate_new_criteria(&self, criteria: &ReservationRequestCriteria) -> std::result::Result<(), ServiceException> {
        let p2ps = criteria.p2ps.as_ref().ok_or_else(|| self.exception(error_ids::MISSING_PARAMETER, "p2ps service element missing"))?;

        if p2ps.source_stp.is_none() || p2ps.dest_stp.is_none() {
            return Err(self.exception(error_ids::MISSING_PARAMETER, "sourceSTP and destSTP are required"));
        }
        if p2ps.capacity <= 0 {
            return Err(self.exception(error_ids::INVALID_PARAMETER, "capacity must be positive")
                .with_variable("capacity", p2ps.capacity.to_string()));
        }
        if let (Some(start), Some(end)) = (criteria.start_time(), criteria.end_time()) {
            if end <= start {
                return Err(self.exception(error_ids::INVALID_PARAMETER, "endTime must be after startTime"));
            }
        }
        Ok(())
    }

    fn reserve_new(&self, request: ReserveRequest) -> ReserveReply {
        if let Err(exception) = self.validate_new_criteria(&request.criteria) {
            return ReserveReply::failed(None, exception, None);
        }

        let connection_id = ConnectionId::new(format!("urn:uuid:{}", Uuid::new_v4()));
        let confirmed = ReservationConfirmCriteria::from_request(&request.criteria, request.criteria.version);

        let connection = ProviderConnection {
            global_reservation_id: request.global_reservation_id,
            description: request.description,
            committed: None,
            held: Some(confirmed.clone()),
            reservation_state: ReservationState::ReserveHeld,
            provision_state: ProvisionState::Released,
            lifecycle_state: LifecycleState::Created,
            active: false,
            notifications: Vec::new(),
        };
        let states = connection.states();

        self.lock_state().connections.insert(connection_id.clone(), connection);
        log::debug!("Provider {} holds new reservation {}", self.provider_nsa, connection_id);

        ReserveReply::confirmed(connection_id, confirmed, states)
    }

    fn reserve_modify(&self, connection_id: ConnectionId, request: ReserveRequest) -> ReserveReply {
        let mut state = self.lock_state();
        let Some(connection) = state.connections.get_mut(&connection_id) else {
            let exception = self.exception(error_ids::RESERVATION_NONEXISTENT, "no such reservation").for_connection(connection_id.clone());
            return ReserveReply::failed(Some(connection_id), exception, None);
        };

        let modifiable = match connection.reservation_state {
            ReservationState::ReserveStart => true,
            ReservationState::ReserveHeld => self.held_modifications && connection.committed.is_some(),
            _ => false,
        };
        if connection.lifecycle_state != LifecycleState::Created || !modifiable {
            let exception = self
                .exception(error_ids::INVALID_TRANSITION, "reservation cannot be modified in its current state")
                .for_connection(connection_id.clone());
            return ReserveReply::failed(Some(connection_id), exception, Some(connection.states()));
        }

        let current_version = connection.latest_version().unwrap_or(0);
        if request.criteria.version <= current_version && connection.committed.is_some() {
            let exception = self
                .exception(error_ids::INVALID_PARAMETER, "requested version must be greater than the current version")
                .for_connection(connection_id.clone())
                .with_variable("version", request.criteria.version.to_string());
            return ReserveReply::failed(Some(connection_id), exception, Some(connection.states()));
        }

        let mut modified = connection.committed.clone().or_else(|| connection.held.clone()).unwrap_or_else(|| {
            ReservationConfirmCriteria::from_request(&request.criteria, request.criteria.version)
        });
        modified.version = request.criteria.version + self.version_skew;
        modified.schedule = request.criteria.schedule.clone();
        if let (Some(current), Some(requested)) = (modified.p2ps.as_mut(), request.criteria.p2ps.as_ref()) {
            current.capacity = requested.capacity;
        }

        if request.description.is_some() {
            connection.description = request.description;
        }
        connection.held = Some(modified.clone());
        connection.reservation_state = ReservationState::ReserveHeld;

        ReserveReply::confirmed(connection_id, modified, connection.states())
    }

    /// Applies `transition` to a known connection, answering unknown ids with a service exception.
    fn transition<F>(&self, connection_id: &ConnectionId, transition: F) -> GenericReply
    where
        F: FnOnce(&mut ProviderConnection) -> std::result::Result<Option<NotificationEvent>, (&'static str, &'static str)>,
    {
        let mut state = self.lock_state();
        let notification_id = state.next_notification_id + 1;

        let Some(connection) = state.connections.get_mut(connection_id) else {
            let exception = self.exception(error_ids::RESERVATION_NONEXISTENT, "no such reservation").for_connection(connection_id.clone());
            return GenericReply::failed(connection_id.clone(), exception, None);
        };

        match transition(connection) {
            Ok(event) => {
                let emitted = event.is_some();
                if let Some(event) = event {
                    connection.notifications.push(NotificationRecord {
                        notification_id,
                        time_stamp: self.clock.now(),
                        connection_id: connection_id.clone(),
                        event,
                    });
                }
                let states = connection.states();
                if emitted {
                    state.next_notification_id = notification_id;
                }
                GenericReply::confirmed(connection_id.clone(), Some(states))
            }
            Err((error_id, text)) => {
                let states = connection.states();
                GenericReply::failed(connection_id.clone(), self.exception(error_id, text).for_connection(connection_id.clone()), Some(states))
            }
        }
    }

    fn with_fault(&self, connection_id: &ConnectionId, fault: ServiceException) -> GenericReply {
        let states = self.connection_states(connection_id);
        GenericReply::failed(connection_id.clone(), fault, states)
    }

    fn data_plane_event(connection: &ProviderConnection) -> NotificationEvent {
        NotificationEvent::DataPlaneStateChange { data_plane_status: connection.states().data_plane_status }
    }
}

impl ProtocolClient for SimulatedProvider {
    fn reserve(&self, request: ReserveRequest) -> Result<ReserveReply> {
        let call = ProviderCall {
            operation: ProviderOperation::Reserve,
            connection_id: request.connection_id.clone(),
            requested_version: Some(request.criteria.version),
        };
        if let Some(fault) = self.record_and_enter(call)? {
            let states = request.connection_id.as_ref().and_then(|id| self.connection_states(id));
            return Ok(ReserveReply::failed(request.connection_id.clone(), fault, states));
        }

        let reply = match request.connection_id.clone() {
            None => self.reserve_new(request),
            Some(connection_id) => self.reserve_modify(connection_id, request),
        };

        if let ReserveOutcome::Failed(exception) = &reply.outcome {
            log::debug!("Provider {} rejected reserve: {}", self.provider_nsa, exception);
        }
        Ok(reply)
    }

    fn reserve_commit(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        if let Some(fault) = self.enter(ProviderOperation::ReserveCommit, Some(connection_id))? {
            return Ok(self.with_fault(connection_id, fault));
        }

        Ok(self.transition(connection_id, |connection| {
            if connection.reservation_state != ReservationState::ReserveHeld {
                return Err((error_ids::INVALID_TRANSITION, "no held reservation to commit"));
            }
            connection.committed = connection.held.take();
            connection.reservation_state = ReservationState::ReserveStart;
            Ok(None)
        }))
    }

    fn reserve_abort(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        if let Some(fault) = self.enter(ProviderOperation::ReserveAbort, Some(connection_id))? {
            return Ok(self.with_fault(connection_id, fault));
        }

        Ok(self.transition(connection_id, |connection| {
            if connection.reservation_state != ReservationState::ReserveHeld {
                return Err((error_ids::INVALID_TRANSITION, "no held reservation to abort"));
            }
            connection.held = None;
            connection.reservation_state = ReservationState::ReserveStart;
            Ok(None)
        }))
    }

    fn provision(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        if let Some(fault) = self.enter(ProviderOperation::Provision, Some(connection_id))? {
            return Ok(self.with_fault(connection_id, fault));
        }

        Ok(self.transition(connection_id, |connection| {
            if connection.lifecycle_state != LifecycleState::Created {
                return Err((error_ids::INVALID_TRANSITION, "connection is not in lifecycle state CREATED"));
            }
            if connection.committed.is_none() {
                return Err((error_ids::INVALID_TRANSITION, "reservation was never committed"));
            }
            connection.provision_state = ProvisionState::Provisioned;
            connection.active = true;
            Ok(Some(Self::data_plane_event(connection)))
        }))
    }

    fn release(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        if let Some(fault) = self.enter(ProviderOperation::Release, Some(connection_id))? {
            return Ok(self.with_fault(connection_id, fault));
        }

        Ok(self.transition(connection_id, |connection| {
            if connection.lifecycle_state != LifecycleState::Created {
                return Err((error_ids::INVALID_TRANSITION, "connection is not in lifecycle state CREATED"));
            }
            let was_active = connection.active;
            connection.provision_state = ProvisionState::Released;
            connection.active = false;
            Ok(was_active.then(|| Self::data_plane_event(connection)))
        }))
    }

    fn terminate(&self, connection_id: &ConnectionId) -> Result<GenericReply> {
        if let Some(fault) = self.enter(ProviderOperation::Terminate, Some(connection_id))? {
            return Ok(self.with_fault(connection_id, fault));
        }

        Ok(self.transition(connection_id, |connection| {
            let was_active = connection.active;
            connection.lifecycle_state = LifecycleState::Terminated;
            connection.provision_state = ProvisionState::Released;
            connection.active = false;
            connection.held = None;
            Ok(was_active.then(|| Self::data_plane_event(connection)))
        }))
    }

    fn query_summary_sync(&self, query: &QueryRequest) -> Result<QuerySummaryConfirmed> {
        if let Some(fault) = self.enter(ProviderOperation::QuerySummarySync, query.connection_ids.first())? {
            return Err(Error::ProtocolFailure(fault));
        }

        let state = self.lock_state();
        let mut ids: Vec<&ConnectionId> = state
            .connections
            .iter()
            .filter(|(id, connection)| {
                query.connection_ids.contains(id)
                    || connection.global_reservation_id.as_ref().is_some_and(|gid| query.global_reservation_ids.contains(gid))
            })
            .map(|(id, _)| id)
            .collect();
        ids.sort();

        let reservations = ids
            .into_iter()
            .filter_map(|id| state.connections.get(id).map(|connection| (id, connection)))
            .map(|(id, connection)| QuerySummaryResult {
                connection_id: id.clone(),
                global_reservation_id: connection.global_reservation_id.clone(),
                description: connection.description.clone(),
                requester_nsa: self.requester_nsa.clone(),
                criteria: connection.committed.iter().chain(connection.held.iter()).cloned().collect(),
                connection_states: connection.states(),
                notification_id: connection.notifications.last().map(|record| record.notification_id),
            })
            .collect();

        Ok(QuerySummaryConfirmed { reservations })
    }

    fn query_notification_sync(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationConfirmed> {
        if let Some(fault) = self.enter(ProviderOperation::QueryNotificationSync, Some(&query.connection_id))? {
            return Err(Error::ProtocolFailure(fault));
        }

        let state = self.lock_state();
        let connection = state.connections.get(&query.connection_id).ok_or_else(|| {
            Error::ProtocolFailure(
                self.exception(error_ids::RESERVATION_NONEXISTENT, "no such reservation").for_connection(query.connection_id.clone()),
            )
        })?;

        let notifications = connection.notifications.iter().filter(|record| query.includes(record.notification_id)).cloned().collect();
        Ok(QueryNotificationConfirmed { notifications })
    }

    fn query_notification(&self, query: &QueryNotificationRequest) -> Result<QueryNotificationReply> {
        if self.requester_uri.is_none() {
            return Err(Error::TransportFailure(
                "asynchronous queryNotification needs a requester endpoint to deliver the reply".to_string(),
            ));
        }

        if let Some(fault) = self.enter(ProviderOperation::QueryNotification, Some(&query.connection_id))? {
            return Ok(QueryNotificationReply::Exception(fault));
        }

        let state = self.lock_state();
        match state.connections.get(&query.connection_id) {
            Some(connection) => Ok(QueryNotificationReply::Confirmed(QueryNotificationConfirmed {
                notifications: connection.notifications.iter().filter(|record| query.includes(record.notification_id)).cloned().collect(),
            })),
            None => Ok(QueryNotificationReply::Exception(
                self.exception(error_ids::RESERVATION_NONEXISTENT, "no such reservation").for_connection(query.connection_id.clone()),
            )),
        }
    }
}
