//! Explicit wiring context
//!
//! One [`NetworkProvider`] is built at start-up and passed by reference to
//! whatever needs an [`ApiClient`] or a [`NetworkDatasource`]. The client is
//! built on first use and then shared.

use crate::config::NetworkConfig;
use crate::datasource::NetworkDatasource;
use crate::status::{NetworkStatusHandler, NetworksAvailableManager};
use rocket_network_commons::{
    AlwaysConnected, ApiClient, CrashLogger, HeaderInterceptor, NetworkHandler, Result,
    TracingLogger,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct NetworkProvider {
    config: NetworkConfig,
    crash_logger: Arc<dyn CrashLogger>,
    network_handler: Arc<dyn NetworkHandler>,
    status_handler: Option<NetworkStatusHandler>,
    header_interceptor: Option<Arc<dyn HeaderInterceptor>>,
    api_client: Mutex<Option<Arc<ApiClient>>>,
}

impl NetworkProvider {
    /// Provider with the tracing logger and an always-connected gate
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            crash_logger: Arc::new(TracingLogger),
            network_handler: Arc::new(AlwaysConnected),
            status_handler: None,
            header_interceptor: None,
            api_client: Mutex::new(None),
        }
    }

    /// Provider configured from `ROCKET_NETWORK_*` variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(NetworkConfig::from_env()?))
    }

    /// Replace the logger. Status tracking, when on, is rebuilt so it reports
    /// to the new logger too.
    pub fn with_crash_logger(mut self, crash_logger: Arc<dyn CrashLogger>) -> Self {
        self.crash_logger = crash_logger;
        if self.status_handler.is_some() {
            self = self.with_status_tracking();
        }
        self
    }

    pub fn with_network_handler(mut self, network_handler: Arc<dyn NetworkHandler>) -> Self {
        self.network_handler = network_handler;
        self.status_handler = None;
        self
    }

    pub fn with_header_interceptor(mut self, interceptor: Arc<dyn HeaderInterceptor>) -> Self {
        self.header_interceptor = Some(interceptor);
        self
    }

    /// Gate calls on a [`NetworkStatusHandler`] fed by platform callbacks.
    ///
    /// The handler starts disconnected; report networks through
    /// [`NetworkProvider::network_status_handler`].
    pub fn with_status_tracking(mut self) -> Self {
        let manager = NetworksAvailableManager::new(self.crash_logger.clone());
        let handler = NetworkStatusHandler::new(manager);
        self.network_handler = Arc::new(handler.clone());
        self.status_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn crash_logger(&self) -> Arc<dyn CrashLogger> {
        self.crash_logger.clone()
    }

    pub fn network_handler(&self) -> Arc<dyn NetworkHandler> {
        self.network_handler.clone()
    }

    pub fn network_status_handler(&self) -> Option<&NetworkStatusHandler> {
        self.status_handler.as_ref()
    }

    /// Shared client, built and validated on first call
    pub fn api_client(&self) -> Result<Arc<ApiClient>> {
        let mut slot = self.api_client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        self.config.validate()?;
        let mut builder = ApiClient::builder(self.config.base_url.clone())
            .timeouts(self.config.timeouts())
            .network_handler(self.network_handler.clone())
            .print_logs(self.config.print_logs);
        if let Some(interceptor) = &self.header_interceptor {
            builder = builder.header_interceptor(interceptor.clone());
        }

        let client = Arc::new(builder.build()?);
        debug!(base_url = %self.config.base_url, "Created API client");
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Datasource reporting to this provider's logger and log path
    pub fn datasource(&self) -> NetworkDatasource {
        NetworkDatasource::new(self.crash_logger.clone())
            .with_log_path(self.config.log_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TransportType;

    #[test]
    fn test_api_client_is_built_once() {
        let provider = NetworkProvider::new(NetworkConfig::new("http://localhost:8080/"));
        let first = provider.api_client().unwrap();
        let second = provider.api_client().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let provider = NetworkProvider::new(NetworkConfig::default());
        assert!(provider.api_client().is_err());

        // A later valid attempt is not poisoned by the failure
        let provider = NetworkProvider::new(NetworkConfig::new("http://localhost/"));
        assert!(provider.api_client().is_ok());
    }

    #[test]
    fn test_timeouts_come_from_config() {
        let mut config = NetworkConfig::new("http://localhost/");
        config.connect_timeout = 3;
        config.read_timeout = 7;
        let client = NetworkProvider::new(config).api_client().unwrap();
        assert_eq!(client.timeouts().connect_timeout.as_secs(), 3);
        assert_eq!(client.timeouts().read_timeout.as_secs(), 7);
    }

    #[test]
    fn test_status_tracking_gates_calls() {
        let provider =
            NetworkProvider::new(NetworkConfig::new("http://localhost/")).with_status_tracking();
        assert!(!provider.network_handler().is_connected());

        let handler = provider.network_status_handler().unwrap();
        handler.on_available("wlan0", TransportType::Wifi);
        assert!(provider.network_handler().is_connected());
        assert!(!provider.network_handler().is_metered());
    }

    #[test]
    fn test_status_tracking_follows_logger_replacement() {
        #[derive(Default)]
        struct CountingLogger(std::sync::atomic::AtomicUsize);

        impl CrashLogger for CountingLogger {
            fn log(&self, _entry: rocket_network_commons::LogEntry) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }

        let logger = Arc::new(CountingLogger::default());
        let provider = NetworkProvider::new(NetworkConfig::new("http://localhost/"))
            .with_status_tracking()
            .with_crash_logger(logger.clone());

        provider
            .network_status_handler()
            .unwrap()
            .on_available("wlan0", TransportType::Wifi);

        assert!(logger.0.load(std::sync::atomic::Ordering::SeqCst) > 0);
        assert!(provider.network_handler().is_connected());
    }

    #[test]
    fn test_datasource_carries_log_path() {
        let mut config = NetworkConfig::new("http://localhost/");
        config.log_path = Some("/tmp/network.log".into());
        let datasource = NetworkProvider::new(config).datasource();
        assert!(format!("{:?}", datasource).contains("/tmp/network.log"));
    }
}
