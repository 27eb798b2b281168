//! # rocket-network-commons
//!
//! Low level network plumbing shared by the Rocket network crates: the
//! connectivity gate, the HTTP client that executes calls, request header
//! interceptors and the diagnostic logger.
//!
//! Nothing here decides whether a call succeeded from the application's
//! point of view. That is the job of `rocket-network`.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod logger;
pub mod status;
pub mod timeout;
pub mod transport;

pub use client::{classify_transport_error, ApiClient, ApiClientBuilder, ApiRequest};
pub use error::{Error, NetworkException, Result};
pub use interceptor::{HeaderInterceptor, StaticHeaders};
pub use logger::{
    map_from_request, map_from_response, CrashLogger, LogEntry, LogLevel, LogMap, TracingLogger,
};
pub use status::{AlwaysConnected, NetworkHandler};
pub use timeout::TimeoutConfig;
pub use transport::{format_headers, RawResponse, RequestInfo};

/// Re-exported so callers can name HTTP methods without depending on reqwest
pub use reqwest::Method;
