//! Error types for the networking module.

use std::time::Duration;

use horizon_reach_core::CoreError;

/// Errors produced while resolving a host name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The request was malformed (for example, an empty host name).
    /// The resolver was never invoked.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Resolution did not finish within the allowed time.
    #[error("Resolution timed out after {0:?}")]
    Timeout(Duration),

    /// The name does not exist.
    #[error("Host not found: {0}")]
    NotFound(String),

    /// The operating system reported an error code.
    #[error("Resolver failed with OS error {0}")]
    Underlying(i32),
}

impl From<CoreError> for ResolveError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RuntimeCreation(io) => Self::Underlying(io.raw_os_error().unwrap_or(-1)),
        }
    }
}

/// Errors produced by a [`ReachabilityMonitor`](crate::reachability::ReachabilityMonitor).
///
/// Stopping a monitor that is not running is a no-op and never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// The target could not be used (bad host name, URL without a host, or a
    /// host that failed eager resolution).
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The platform refused to schedule change notifications.
    #[error("Reachability registration failed: {0}")]
    RegistrationFailed(String),
}

/// Errors reported by a [`ReachabilityProvider`](crate::reachability::ReachabilityProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The platform facility is missing or out of resources.
    #[error("Reachability provider unavailable: {0}")]
    Unavailable(String),

    /// Reading network state failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A specialized Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
