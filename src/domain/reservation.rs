pub mod reservation_locks;
pub mod reservation_store;
