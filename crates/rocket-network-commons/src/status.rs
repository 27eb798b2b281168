//! Connectivity gate
//!
//! Consulted synchronously right before every outbound call. Implementations
//! are fed by platform code; the gate itself does no I/O.

use std::sync::Arc;

/// Answers "is the device online"
pub trait NetworkHandler: Send + Sync {
    /// Whether any network is currently usable
    fn is_connected(&self) -> bool;

    /// Whether the active network is metered
    fn is_metered(&self) -> bool;
}

impl<T: NetworkHandler + ?Sized> NetworkHandler for Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn is_metered(&self) -> bool {
        (**self).is_metered()
    }
}

/// Gate that always reports an unmetered connection
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConnected;

impl NetworkHandler for AlwaysConnected {
    fn is_connected(&self) -> bool {
        true
    }

    fn is_metered(&self) -> bool {
        false
    }
}
