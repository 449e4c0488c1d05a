use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::nsi::criteria::ReservationRequestCriteria;
use crate::domain::utils::id::ConnectionId;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct StoreInner {
    /// Criteria last submitted and confirmed for the reservation.
    criteria: HashMap<ConnectionId, ReservationRequestCriteria>,

    /// Version last confirmed by the provider.
    versions: HashMap<ConnectionId, u32>,

    /// Requested bandwidth, threaded into modify requests.
    capacities: HashMap<ConnectionId, i64>,
}

/// Local bookkeeping of the reservations this requester created.
///
/// All maps are protected with a single lock, so removing a reservation is
/// atomic. Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct ReservationStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites all attributes of a reservation.
    pub fn put(&self, id: &ConnectionId, criteria: ReservationRequestCriteria, version: u32, capacity: i64) {
        let mut guard = self.write();
        guard.criteria.insert(id.clone(), criteria);
        guard.versions.insert(id.clone(), version);
        guard.capacities.insert(id.clone(), capacity);
    }

    /// Stores a provider-confirmed version.
    pub fn record_version(&self, id: &ConnectionId, version: u32) {
        self.write().versions.insert(id.clone(), version);
    }

    /// Stores the criteria of a reservation. The capacity is kept from the first call.
    pub fn record_terms(&self, id: &ConnectionId, criteria: ReservationRequestCriteria, capacity: i64) {
        let mut guard = self.write();
        guard.criteria.insert(id.clone(), criteria);

        let stored = *guard.capacities.entry(id.clone()).or_insert(capacity);
        if stored != capacity {
            log::warn!("Reservation {}: capacity is fixed at {} Mbit/s, ignoring {} Mbit/s", id, stored, capacity);
        }
    }

    pub fn get_criteria(&self, id: &ConnectionId) -> Option<ReservationRequestCriteria> {
        self.read().criteria.get(id).cloned()
    }

    pub fn get_version(&self, id: &ConnectionId) -> Option<u32> {
        self.read().versions.get(id).copied()
    }

    pub fn get_capacity(&self, id: &ConnectionId) -> Option<i64> {
        self.read().capacities.get(id).copied()
    }

    /// Version to request next: the confirmed version + 1, or 0 for an unknown id.
    ///
    /// Nothing is persisted; only the provider's confirmation is stored. Fails
    /// when the confirmed version is already `u32::MAX`.
    pub fn next_version(&self, id: &ConnectionId) -> Result<u32> {
        match self.read().versions.get(id) {
            None => Ok(0),
            Some(version) => version.checked_add(1).ok_or_else(|| Error::VersionExhausted(id.clone())),
        }
    }

    /// Deletes every attribute of the reservation.
    pub fn remove(&self, id: &ConnectionId) {
        let mut guard = self.write();
        guard.criteria.remove(id);
        guard.versions.remove(id);
        guard.capacities.remove(id);
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        let guard = self.read();
        guard.versions.contains_key(id) || guard.criteria.contains_key(id) || guard.capacities.contains_key(id)
    }

    /// Number of known reservations.
    pub fn len(&self) -> usize {
        self.read().versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
