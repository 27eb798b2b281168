//! Connectivity tracking fed by platform network callbacks
//!
//! Platform code reports networks coming and going through
//! [`NetworkStatusHandler::on_available`] and
//! [`NetworkStatusHandler::on_lost`]. The handler publishes the resulting
//! [`NetworkStatus`] on a watch channel and doubles as the connectivity gate
//! for [`ApiClient`](rocket_network_commons::ApiClient).
//!
//! Losing a network does not publish `None` right away: the device often
//! hands over from one network to another, so the loss is only published if
//! no network is left once the grace period ends.

use rocket_network_commons::{CrashLogger, LogLevel, LogMap, NetworkHandler};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Grace period between losing the last network and publishing `None`
pub const TIME_TO_DISCONNECT: Duration = Duration::from_millis(5000);

/// Published connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkStatus {
    Wifi,
    Cellular,
    None,
}

/// Transport reported by the platform for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportType {
    Wifi,
    Cellular,
    Other,
}

impl From<TransportType> for NetworkStatus {
    fn from(transport: TransportType) -> Self {
        match transport {
            TransportType::Wifi => NetworkStatus::Wifi,
            TransportType::Cellular => NetworkStatus::Cellular,
            TransportType::Other => NetworkStatus::None,
        }
    }
}

/// Keeps the set of active networks and decides when connectivity is gone
#[derive(Clone)]
pub struct NetworksAvailableManager {
    active: Arc<Mutex<Vec<String>>>,
    crash_logger: Arc<dyn CrashLogger>,
    disconnect_delay: Duration,
}

impl NetworksAvailableManager {
    pub fn new(crash_logger: Arc<dyn CrashLogger>) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            crash_logger,
            disconnect_delay: TIME_TO_DISCONNECT,
        }
    }

    pub fn with_disconnect_delay(mut self, delay: Duration) -> Self {
        self.disconnect_delay = delay;
        self
    }

    pub fn has_any_connection(&self) -> bool {
        !self.active.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    /// Register `network` and publish its status
    pub fn add_connection(
        &self,
        network: &str,
        transport: TransportType,
        on_available: impl FnOnce(NetworkStatus),
    ) {
        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if active.is_empty() {
                self.debug("NetworksAvailableManager restoring connection!");
            }
            active.push(network.to_string());
        }
        self.debug(&format!("NetworksAvailableManager added {}", network));
        on_available(transport.into());
    }

    /// Forget `network`; publish `None` after the grace period if nothing
    /// else came up meanwhile.
    ///
    /// Outside a tokio runtime there is nothing to wait on, so the check
    /// happens immediately.
    pub fn lose_connection(
        &self,
        network: &str,
        on_lost: impl FnOnce(NetworkStatus) + Send + 'static,
    ) {
        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pos) = active.iter().position(|n| n == network) {
                active.remove(pos);
            }
        }
        self.debug(&format!("NetworksAvailableManager lost current {}", network));

        let manager = self.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(manager.disconnect_delay).await;
                    manager.publish_if_disconnected(on_lost);
                });
            }
            Err(_) => manager.publish_if_disconnected(on_lost),
        }
    }

    fn publish_if_disconnected(&self, on_lost: impl FnOnce(NetworkStatus)) {
        if !self.has_any_connection() {
            self.debug("NetworksAvailableManager no active connections!");
            on_lost(NetworkStatus::None);
        }
    }

    fn debug(&self, message: &str) {
        self.crash_logger.log_message(message, LogMap::new(), LogLevel::Debug);
    }
}

/// Publishes connectivity changes and answers the connectivity gate
#[derive(Clone)]
pub struct NetworkStatusHandler {
    sender: Arc<watch::Sender<NetworkStatus>>,
    manager: NetworksAvailableManager,
}

impl NetworkStatusHandler {
    /// Starts disconnected until a network is reported
    pub fn new(manager: NetworksAvailableManager) -> Self {
        let (sender, _) = watch::channel(NetworkStatus::None);
        Self {
            sender: Arc::new(sender),
            manager,
        }
    }

    /// Subscribe to status changes
    pub fn status(&self) -> watch::Receiver<NetworkStatus> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> NetworkStatus {
        *self.sender.borrow()
    }

    pub fn on_available(&self, network: &str, transport: TransportType) {
        let sender = self.sender.clone();
        self.manager.add_connection(network, transport, move |status| {
            sender.send_replace(status);
        });
    }

    pub fn on_lost(&self, network: &str) {
        let sender = self.sender.clone();
        self.manager.lose_connection(network, move |status| {
            sender.send_replace(status);
        });
    }
}

impl NetworkHandler for NetworkStatusHandler {
    fn is_connected(&self) -> bool {
        self.current() != NetworkStatus::None
    }

    fn is_metered(&self) -> bool {
        self.current() == NetworkStatus::Cellular
    }
}
