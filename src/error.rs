//! Error types for the gateway's validation seams.
//!
//! The sniffer's hot path (`isotp`, `uds`, `sniffer`, `fingerprint`,
//! `interceptor`) never returns a `Result` — malformed bus traffic is
//! recovered locally per the error-kind policy table, not surfaced as an
//! error. This type exists for construction-time configuration validation.

use std::error::Error;
use std::fmt;

/// Errors raised at configuration/construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// A configuration value was outside its valid range.
    InvalidParameter,
    /// A component was used before it was opened/initialized.
    NotInitialized,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::InvalidParameter => write!(f, "invalid parameter"),
            GatewayError::NotInitialized => write!(f, "component not initialized"),
        }
    }
}

impl Error for GatewayError {}

/// A specialized `Result` for gateway configuration operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
