//! HTTP client bound to a base URL
//!
//! `ApiClient` is the transport call executor. Every call:
//! 1. applies interceptor headers and resolves the path against the base URL
//! 2. reads the connectivity gate once; offline calls fail without touching
//!    the network, even when the path itself was invalid
//! 3. executes through `reqwest` (blocking or async)
//! 4. captures the response into a [`RawResponse`], or classifies the
//!    transport fault into a [`NetworkException`]
//!
//! The underlying `reqwest` clients are built lazily on first use and then
//! shared by every call.

use crate::error::{Error, NetworkException, Result};
use crate::interceptor::HeaderInterceptor;
use crate::status::{AlwaysConnected, NetworkHandler};
use crate::timeout::TimeoutConfig;
use crate::transport::{RawResponse, RequestInfo};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};
use url::Url;

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Description of a single API call relative to the client's base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    body_error: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            body_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Encode `body` as the JSON request body.
    ///
    /// An encoding failure is kept and reported as an I/O fault when the
    /// request is executed.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(json) => {
                self.body = Some(json);
                self.body_error = None;
            }
            Err(e) => {
                self.body = None;
                self.body_error = Some(format!("Failed to encode request body: {}", e));
            }
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Request resolved against the base URL, ready to be sent
struct PreparedRequest {
    info: RequestInfo,
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl PreparedRequest {
    /// Maps `reqwest` failures of this request to transport faults
    fn fault(&self) -> impl Fn(reqwest::Error) -> NetworkException + '_ {
        move |e| classify_transport_error(&e, &self.info)
    }

    fn client_fault(&self, error: Error) -> NetworkException {
        NetworkException::io(error.to_string()).with_request(self.info.clone())
    }
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: String,
    timeouts: TimeoutConfig,
    network_handler: Arc<dyn NetworkHandler>,
    header_interceptor: Option<Arc<dyn HeaderInterceptor>>,
    print_logs: bool,
}

impl ApiClientBuilder {
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn network_handler(mut self, handler: Arc<dyn NetworkHandler>) -> Self {
        self.network_handler = handler;
        self
    }

    pub fn header_interceptor(mut self, interceptor: Arc<dyn HeaderInterceptor>) -> Self {
        self.header_interceptor = Some(interceptor);
        self
    }

    /// Trace request and response bodies at debug level
    pub fn print_logs(mut self, enabled: bool) -> Self {
        self.print_logs = enabled;
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
            source: Some(e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: self.base_url,
                message: "URL cannot be used as a base".to_string(),
                source: None,
            });
        }

        self.timeouts.validate()?;

        Ok(ApiClient {
            base_url,
            timeouts: self.timeouts,
            network_handler: self.network_handler,
            header_interceptor: self.header_interceptor,
            print_logs: self.print_logs,
            async_client: Mutex::new(None),
            blocking_client: Mutex::new(None),
        })
    }
}

/// HTTP client bound to a base URL and a connectivity gate
pub struct ApiClient {
    base_url: Url,
    timeouts: TimeoutConfig,
    network_handler: Arc<dyn NetworkHandler>,
    header_interceptor: Option<Arc<dyn HeaderInterceptor>>,
    print_logs: bool,
    async_client: Mutex<Option<reqwest::Client>>,
    blocking_client: Mutex<Option<reqwest::blocking::Client>>,
}

impl ApiClient {
    /// Start building a client for `base_url`
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            timeouts: TimeoutConfig::default(),
            network_handler: Arc::new(AlwaysConnected),
            header_interceptor: None,
            print_logs: false,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Execute on the calling thread.
    ///
    /// Must not be called from within an async runtime; use [`ApiClient::send`]
    /// there.
    pub fn execute(
        &self,
        request: ApiRequest,
    ) -> std::result::Result<RawResponse, NetworkException> {
        let prepared = self.prepare(request)?;
        let client = self.blocking_client().map_err(|e| prepared.client_fault(e))?;

        let mut builder = client
            .request(prepared.method.clone(), prepared.url.clone())
            .headers(prepared.headers.clone());
        if let Some(body) = prepared.info.body.clone() {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(prepared.fault())?;
        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response.text().map_err(prepared.fault())?;

        Ok(self.capture(prepared.info, status, headers, body))
    }

    /// Execute asynchronously. Dropping the future aborts the request.
    pub async fn send(
        &self,
        request: ApiRequest,
    ) -> std::result::Result<RawResponse, NetworkException> {
        let prepared = self.prepare(request)?;
        let client = self.async_client().map_err(|e| prepared.client_fault(e))?;

        let mut builder = client
            .request(prepared.method.clone(), prepared.url.clone())
            .headers(prepared.headers.clone());
        if let Some(body) = prepared.info.body.clone() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(prepared.fault())?;
        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response.text().await.map_err(prepared.fault())?;

        Ok(self.capture(prepared.info, status, headers, body))
    }

    /// Resolve the request and consult the connectivity gate
    fn prepare(
        &self,
        request: ApiRequest,
    ) -> std::result::Result<PreparedRequest, NetworkException> {
        let ApiRequest {
            method,
            path,
            query,
            headers: request_headers,
            body,
            body_error,
        } = request;

        let mut headers = BTreeMap::new();
        if let Some(interceptor) = &self.header_interceptor {
            for (key, value) in interceptor.headers_map() {
                headers.insert(key.to_ascii_lowercase(), value);
            }
        }
        for (key, value) in request_headers {
            headers.insert(key.to_ascii_lowercase(), value);
        }
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        }

        let mut info = RequestInfo {
            method: method.as_str().to_string(),
            url: path.clone(),
            headers,
            body,
        };

        // The gate is read before the path is validated so offline calls are
        // always reported as such.
        let joined = self.base_url.join(&path).map(|mut url| {
            if !query.is_empty() {
                url.query_pairs_mut().extend_pairs(query.iter());
            }
            url
        });
        if let Ok(url) = &joined {
            info.url = url.to_string();
        }

        if !self.network_handler.is_connected() {
            debug!(
                method = %info.method,
                url = %info.url,
                "Network not connected, request not sent"
            );
            return Err(NetworkException::no_connection().with_request(info));
        }

        let url = joined.map_err(|e| {
            NetworkException::io(format!("Invalid request path '{}': {}", path, e))
                .with_request(info.clone())
        })?;

        if let Some(message) = body_error {
            return Err(NetworkException::io(message).with_request(info));
        }

        let header_map = to_header_map(&info.headers)
            .map_err(|message| NetworkException::io(message).with_request(info.clone()))?;

        if self.print_logs {
            debug!(
                method = %info.method,
                url = %info.url,
                headers = ?info.headers,
                body = info.body.as_deref().unwrap_or_default(),
                "--> request"
            );
        }

        Ok(PreparedRequest {
            info,
            method,
            url,
            headers: header_map,
        })
    }

    fn capture(
        &self,
        request: RequestInfo,
        status: reqwest::StatusCode,
        headers: BTreeMap<String, String>,
        body: String,
    ) -> RawResponse {
        let response = RawResponse {
            request,
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        };

        if self.print_logs {
            debug!(
                status = response.status,
                url = %response.request.url,
                headers = ?response.headers,
                body = %response.body,
                "<-- response"
            );
        }

        response
    }

    fn async_client(&self) -> Result<reqwest::Client> {
        let mut slot = self.async_client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        trace!(base_url = %self.base_url, "Building async HTTP client");
        let client = reqwest::Client::builder()
            .connect_timeout(self.timeouts.connect_timeout)
            .timeout(self.timeouts.read_timeout)
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn blocking_client(&self) -> Result<reqwest::blocking::Client> {
        let mut slot = self.blocking_client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        trace!(base_url = %self.base_url, "Building blocking HTTP client");
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(self.timeouts.connect_timeout)
            .timeout(self.timeouts.read_timeout)
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

fn to_header_map(headers: &BTreeMap<String, String>) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| format!("Invalid header name '{}': {}", key, e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid value for header '{}': {}", key, e))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| {
            (
                key.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Classify a `reqwest` failure without looking at any response body
pub fn classify_transport_error(error: &reqwest::Error, request: &RequestInfo) -> NetworkException {
    let message = error.to_string();
    let exception = if error.is_timeout() {
        NetworkException::timeout(message)
    } else if is_dns_error(error) {
        NetworkException::unknown_host(message)
    } else {
        NetworkException::io(message)
    };
    exception.with_request(request.clone())
}

/// Walk the source chain looking for a name resolution failure
fn is_dns_error(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_ascii_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        current = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct SwitchableHandler(AtomicBool);

    impl NetworkHandler for SwitchableHandler {
        fn is_connected(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        fn is_metered(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = ApiClient::builder("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));

        let result = ApiClient::builder("mailto:someone@example.com").build();
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn test_builder_rejects_zero_timeouts() {
        let result = ApiClient::builder("http://localhost/")
            .timeouts(TimeoutConfig::from_secs(0, 0))
            .build();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_prepare_resolves_path_query_and_headers() {
        let client = ApiClient::builder("http://localhost:8080/api/")
            .header_interceptor(Arc::new(
                crate::StaticHeaders::new().with("x-lang", "ES").with("Content-Type", "text/plain"),
            ))
            .build()
            .unwrap();

        let request = ApiRequest::post("/all")
            .query("page", "2")
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({"id": "1"}));
        let prepared = client.prepare(request).unwrap();

        assert_eq!(prepared.info.method, "POST");
        assert_eq!(prepared.info.url, "http://localhost:8080/all?page=2");
        assert_eq!(prepared.info.headers["x-lang"], "ES");
        assert_eq!(prepared.info.headers["content-type"], "application/json");
        assert_eq!(prepared.info.body.as_deref(), Some(r#"{"id":"1"}"#));
    }

    #[test]
    fn test_prepare_relative_path() {
        let client = ApiClient::builder("http://localhost:8080/api/").build().unwrap();
        let prepared = client.prepare(ApiRequest::get("element/ID")).unwrap();
        assert_eq!(prepared.info.url, "http://localhost:8080/api/element/ID");
        assert!(!prepared.info.headers.contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_prepare_fails_when_disconnected() {
        let handler = Arc::new(SwitchableHandler(AtomicBool::new(false)));
        let client = ApiClient::builder("http://localhost/")
            .network_handler(handler.clone())
            .build()
            .unwrap();

        let err = client.prepare(ApiRequest::get("/all")).err().unwrap();
        match err {
            NetworkException::NoConnection { request: Some(info) } => {
                assert_eq!(info.method, "GET");
                assert_eq!(info.url, "http://localhost/all");
            }
            other => panic!("unexpected exception: {:?}", other),
        }

        handler.0.store(true, Ordering::SeqCst);
        assert!(client.prepare(ApiRequest::get("/all")).is_ok());
    }

    #[test]
    fn test_gate_is_read_before_path_is_validated() {
        let handler = Arc::new(SwitchableHandler(AtomicBool::new(false)));
        let client = ApiClient::builder("http://localhost/")
            .network_handler(handler.clone())
            .build()
            .unwrap();

        let err = client.prepare(ApiRequest::get("http://[::1")).err().unwrap();
        match err {
            NetworkException::NoConnection { request: Some(info) } => {
                assert_eq!(info.url, "http://[::1");
            }
            other => panic!("unexpected exception: {:?}", other),
        }

        handler.0.store(true, Ordering::SeqCst);
        let err = client.prepare(ApiRequest::get("http://[::1")).err().unwrap();
        assert!(matches!(err, NetworkException::Io { .. }));
        assert!(err.to_string().starts_with("Invalid request path"));
    }

    #[test]
    fn test_prepared_headers_match_request_info() {
        let client = ApiClient::builder("http://localhost/")
            .header_interceptor(Arc::new(crate::StaticHeaders::new().with("X-Lang", "ES")))
            .build()
            .unwrap();

        let prepared = client.prepare(ApiRequest::put("/element/1").json(&[1, 2])).unwrap();
        assert_eq!(prepared.headers.len(), prepared.info.headers.len());
        assert_eq!(prepared.headers.get("x-lang").and_then(|v| v.to_str().ok()), Some("ES"));
        assert_eq!(
            prepared.headers.get("content-type").and_then(|v| v.to_str().ok()),
            Some(APPLICATION_JSON)
        );
    }

    #[test]
    fn test_invalid_header_value_surfaces_as_io() {
        let client = ApiClient::builder("http://localhost/").build().unwrap();
        let err = client
            .prepare(ApiRequest::get("/all").header("x-token", "line\nbreak"))
            .err()
            .unwrap();
        assert!(matches!(err, NetworkException::Io { .. }));
        assert!(err.to_string().contains("x-token"));
    }

    #[test]
    fn test_unencodable_body_surfaces_as_io() {
        use std::collections::HashMap;

        // Non-string map keys cannot be encoded as JSON objects
        let body: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let client = ApiClient::builder("http://localhost/").build().unwrap();

        let err = client.prepare(ApiRequest::post("/all").json(&body)).err().unwrap();
        assert!(matches!(err, NetworkException::Io { .. }));
        assert!(err.to_string().starts_with("Failed to encode request body"));
    }

    #[test]
    fn test_dns_error_detection() {
        let err = std::io::Error::other("dns error: failed to lookup address information");
        assert!(is_dns_error(&err));

        let err = std::io::Error::other("Connection refused (os error 111)");
        assert!(!is_dns_error(&err));
    }
}
