//! Backend identity and the ownership gate
//!
//! The registry of backends decides which one is active and records it in a
//! shared [`ActiveBackend`]. Filters only read it, at every check.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

/// Opaque identity of one backend instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendId(Uuid);

impl BackendId {
    /// Allocate a fresh identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BackendId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The backend currently designated to receive editor traffic
///
/// Shared by every filter; written only by the backend registry.
#[derive(Debug, Default)]
pub struct ActiveBackend {
    current: RwLock<Option<BackendId>>,
}

impl ActiveBackend {
    /// Create with no active backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active backend, if any
    pub fn current(&self) -> Option<BackendId> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `id` the active backend, returning the previous one
    pub fn set(&self, id: BackendId) -> Option<BackendId> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(id)
    }

    /// Leave no backend active, returning the previous one
    pub fn clear(&self) -> Option<BackendId> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Passes only while the bound backend is the active one
#[derive(Debug, Clone)]
pub struct OwnershipGate {
    me: BackendId,
    active: Arc<ActiveBackend>,
}

impl OwnershipGate {
    pub fn new(me: BackendId, active: Arc<ActiveBackend>) -> Self {
        Self { me, active }
    }

    /// Identity this gate is bound to
    pub fn backend_id(&self) -> BackendId {
        self.me
    }

    /// Whether the bound backend is active right now
    pub fn is_open(&self) -> bool {
        self.active.current() == Some(self.me)
    }
}
