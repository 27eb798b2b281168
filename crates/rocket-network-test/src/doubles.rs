//! Test doubles for the connectivity gate and the diagnostic logger

use rocket_network_commons::{CrashLogger, LogEntry, NetworkHandler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Connectivity gate switchable from the test
#[derive(Debug)]
pub struct TestNetworkHandler {
    connected: AtomicBool,
    metered: AtomicBool,
}

impl TestNetworkHandler {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            metered: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_metered(&self, metered: bool) {
        self.metered.store(metered, Ordering::SeqCst);
    }
}

impl Default for TestNetworkHandler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkHandler for TestNetworkHandler {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_metered(&self) -> bool {
        self.metered.load(Ordering::SeqCst)
    }
}

/// Logger that keeps every entry for later assertions
#[derive(Debug, Default)]
pub struct TestLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl TestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn last(&self) -> Option<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl CrashLogger for TestLogger {
    fn log(&self, entry: LogEntry) {
        tracing::debug!(
            level = %entry.level,
            message = entry.message.as_deref().unwrap_or_default(),
            exception = entry.exception.as_deref().unwrap_or_default(),
            context = ?entry.map,
            "TestLogger"
        );
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}
