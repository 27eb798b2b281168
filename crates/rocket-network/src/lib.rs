//! # rocket-network
//!
//! Uniform request/response handling on top of `rocket-network-commons`.
//!
//! Every call made through a [`NetworkDatasource`] ends in an
//! [`Outcome<NetworkFailure, T>`](Outcome): transport faults, error statuses,
//! envelope errors and undecodable bodies are all turned into a
//! [`NetworkFailure`] and reported once to the configured
//! [`CrashLogger`](rocket_network_commons::CrashLogger).
//!
//! # Example
//!
//! ```no_run
//! use rocket_network::{NetworkConfig, NetworkFailure, NetworkProvider, Outcome};
//! use rocket_network_commons::ApiRequest;
//!
//! fn fetch_all(provider: &NetworkProvider) -> Outcome<NetworkFailure, Option<Vec<String>>> {
//!     let client = provider.api_client().expect("valid configuration");
//!     provider
//!         .datasource()
//!         .request_generic_api(|| client.execute(ApiRequest::get("/all")), |body| body)
//! }
//!
//! let provider = NetworkProvider::new(NetworkConfig::new("https://api.example.com/"));
//! let _ = fetch_all(&provider);
//! ```

pub mod codes;
pub mod config;
pub mod datasource;
pub mod envelope;
pub mod failure;
pub mod mapper;
pub mod outcome;
pub mod parser;
pub mod provider;
pub mod status;

pub use config::NetworkConfig;
pub use datasource::{CallResult, NetworkDatasource};
pub use envelope::{EnvelopeResponse, ErrorEnvelope};
pub use failure::NetworkFailure;
pub use mapper::{parse_to_failure, status_code_mapper, FailureMapper};
pub use outcome::Outcome;
pub use parser::{
    CodeMessageErrorParser, ComplexError, DefaultErrorParser, ErrorDetail, ErrorParser, SimpleError,
};
pub use provider::NetworkProvider;
pub use status::{NetworkStatus, NetworkStatusHandler, NetworksAvailableManager, TransportType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
