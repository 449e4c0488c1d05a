use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::utils::id::ConnectionId;

/// Per-reservation exclusive regions.
///
/// Guards the read-version / send / store-confirmation sequence so two callers
/// never request the same speculative version for one reservation. Distinct
/// reservations do not block each other.
#[derive(Clone, Debug, Default)]
pub struct ReservationLocks {
    gates: Arc<Mutex<HashMap<ConnectionId, Arc<Mutex<()>>>>>,
}

impl ReservationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, id: &ConnectionId) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        gates.entry(id.clone()).or_default().clone()
    }

    /// Runs `f` while holding the exclusive region of `id`.
    pub fn with_exclusive<R>(&self, id: &ConnectionId, f: impl FnOnce() -> R) -> R {
        let gate = self.gate(id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Forgets the region of a terminated reservation.
    pub fn remove(&self, id: &ConnectionId) {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).remove(id);
    }

    pub fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
