//! Raw error codes
//!
//! Internal sentinels that route transport faults through the failure
//! mapper. Real servers never send negative codes, so these cannot collide
//! with a backend's own error codes.

/// Envelope reported failure without naming a code
pub const UNKNOWN_ERROR_CODE: &str = "-1";
/// Connectivity gate reported the device offline
pub const NO_CONNECTION: &str = "-400";
/// Any I/O fault that is neither a timeout nor a resolution failure
pub const HTTP_EXCEPTION_CODE: &str = "-401";
pub const TIMEOUT: &str = "-402";
pub const UNKNOWN_HOST: &str = "-403";
/// A body could not be decoded into the expected shape
pub const JSON_FORMAT: &str = "-404";
