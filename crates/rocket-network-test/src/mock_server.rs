//! Mock server harness
//!
//! [`MockServerTest`] wraps a `wiremock` server with the pieces every
//! datasource test needs: a switchable connectivity gate, a recording
//! logger, FIFO response queueing and assertions over the requests the
//! server received, taken one at a time in arrival order.

use crate::doubles::{TestLogger, TestNetworkHandler};
use crate::fixtures::Fixture;
use crate::logging::init_test_tracing;
use rocket_network_commons::{ApiClient, HeaderInterceptor, TimeoutConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Timeouts short enough to exercise timeout paths quickly
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(250);

pub struct MockServerTest {
    server: MockServer,
    network_handler: Arc<TestNetworkHandler>,
    crash_logger: Arc<TestLogger>,
    taken: AtomicUsize,
}

impl MockServerTest {
    /// Start a server with the gate reporting connected
    pub async fn start() -> Self {
        init_test_tracing();
        Self {
            server: MockServer::start().await,
            network_handler: Arc::new(TestNetworkHandler::new(true)),
            crash_logger: Arc::new(TestLogger::new()),
            taken: AtomicUsize::new(0),
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Server root with a trailing slash
    pub fn base_endpoint(&self) -> String {
        format!("{}/", self.server.uri())
    }

    pub fn network_handler(&self) -> Arc<TestNetworkHandler> {
        self.network_handler.clone()
    }

    pub fn crash_logger(&self) -> Arc<TestLogger> {
        self.crash_logger.clone()
    }

    pub fn configure_network_connected(&self) {
        self.network_handler.set_connected(true);
    }

    pub fn configure_network_disconnected(&self) {
        self.network_handler.set_connected(false);
    }

    /// Client for this server, gated by the test handler
    pub fn api_client(&self, header_interceptor: Option<Arc<dyn HeaderInterceptor>>) -> ApiClient {
        self.api_client_for(&self.base_endpoint(), header_interceptor, TimeoutConfig::default())
    }

    /// Client that gives up after [`SHORT_TIMEOUT`]
    pub fn api_client_with_short_timeout(
        &self,
        header_interceptor: Option<Arc<dyn HeaderInterceptor>>,
    ) -> ApiClient {
        self.api_client_for(
            &self.base_endpoint(),
            header_interceptor,
            TimeoutConfig::new(SHORT_TIMEOUT, SHORT_TIMEOUT),
        )
    }

    /// Client for an arbitrary base URL, still gated by the test handler
    pub fn api_client_for(
        &self,
        base_url: &str,
        header_interceptor: Option<Arc<dyn HeaderInterceptor>>,
        timeouts: TimeoutConfig,
    ) -> ApiClient {
        let mut builder = ApiClient::builder(base_url)
            .network_handler(self.network_handler.clone())
            .timeouts(timeouts)
            .print_logs(true);
        if let Some(interceptor) = header_interceptor {
            builder = builder.header_interceptor(interceptor);
        }
        match builder.build() {
            Ok(client) => client,
            Err(e) => panic!("invalid test client for {}: {}", base_url, e),
        }
    }

    /// Queue a response; queued responses are served once each, in order
    pub async fn enqueue_mock_response(&self, code: u16, body: Option<&str>) {
        self.enqueue(ResponseTemplate::new(code).set_body_string(body.unwrap_or_default()))
            .await;
    }

    pub async fn enqueue_fixture(&self, code: u16, fixture: Fixture) {
        self.enqueue_mock_response(code, Some(fixture.body())).await;
    }

    /// Queue a response held back for `delay`
    pub async fn enqueue_delayed_response(&self, code: u16, body: Option<&str>, delay: Duration) {
        self.enqueue(
            ResponseTemplate::new(code)
                .set_body_string(body.unwrap_or_default())
                .set_delay(delay),
        )
        .await;
    }

    async fn enqueue(&self, template: ResponseTemplate) {
        Mock::given(any())
            .respond_with(template)
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Next request not yet taken by an assertion
    pub async fn take_request(&self) -> Request {
        let index = self.taken.fetch_add(1, Ordering::SeqCst);
        let requests = self.received_requests().await;
        match requests.into_iter().nth(index) {
            Some(request) => request,
            None => panic!("expected request #{} to have reached the server", index + 1),
        }
    }

    #[track_caller]
    fn check(request: &Request, path: &str, method: Option<&str>) {
        assert_eq!(request.url.path(), path, "unexpected request path");
        if let Some(method) = method {
            assert_eq!(request.method.as_str(), method, "unexpected request method");
        }
    }

    pub async fn assert_request_sent_to(&self, path: &str) {
        Self::check(&self.take_request().await, path, None);
    }

    pub async fn assert_get_request_sent_to(&self, path: &str) {
        Self::check(&self.take_request().await, path, Some("GET"));
    }

    pub async fn assert_post_request_sent_to(&self, path: &str) {
        Self::check(&self.take_request().await, path, Some("POST"));
    }

    pub async fn assert_put_request_sent_to(&self, path: &str) {
        Self::check(&self.take_request().await, path, Some("PUT"));
    }

    pub async fn assert_delete_request_sent_to(&self, path: &str) {
        Self::check(&self.take_request().await, path, Some("DELETE"));
    }

    pub async fn assert_request_contains_header(&self, key: &str, expected: &str) {
        let request = self.take_request().await;
        let value = request.headers.get(key).and_then(|v| v.to_str().ok());
        assert_eq!(value, Some(expected), "unexpected value for header '{}'", key);
    }

    pub async fn assert_request_body_equals(&self, expected: &str) {
        let request = self.take_request().await;
        assert_eq!(String::from_utf8_lossy(&request.body), expected);
    }

    pub async fn assert_no_requests(&self) {
        let requests = self.received_requests().await;
        assert!(requests.is_empty(), "expected no requests, got {}", requests.len());
    }
}

/// Run blocking client code off the async runtime.
///
/// Blocking clients must be created, used and dropped outside the runtime,
/// so everything they touch should be moved into `f`. Panics inside `f`
/// are re-raised on the caller.
pub async fn run_blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => panic!("blocking task did not complete: {}", e),
    }
}
