//! # rocket-network-test
//!
//! Test support for datasources built on `rocket-network`:
//!
//! - [`MockServerTest`]: a `wiremock` server with FIFO response queueing,
//!   request assertions and a switchable connectivity gate
//! - [`TestNetworkHandler`] and [`TestLogger`] test doubles
//! - [`OutcomeExt`] accessors (`l()` / `r()`)
//! - JSON [`Fixture`]s and the fake backend in [`fakes`]

pub mod doubles;
pub mod fakes;
pub mod fixtures;
pub mod logging;
pub mod mock_server;
pub mod outcome_ext;

pub use doubles::{TestLogger, TestNetworkHandler};
pub use fixtures::Fixture;
pub use logging::init_test_tracing;
pub use mock_server::{run_blocking, MockServerTest, SHORT_TIMEOUT};
pub use outcome_ext::OutcomeExt;
