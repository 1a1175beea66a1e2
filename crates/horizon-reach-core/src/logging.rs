//! Logging facilities for Horizon Reach.
//!
//! Horizon Reach uses the `tracing` crate for instrumentation. Library code
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("horizon_reach_net::reachability=debug"))
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! The constants in [`targets`] name every target used by the workspace so
//! filter directives can be written without guessing module paths.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_reach_core";
    /// Signal/slot fan-out target.
    pub const SIGNAL: &str = "horizon_reach_core::signal";
    /// Shared runtime target.
    pub const RUNTIME: &str = "horizon_reach_core::runtime";
    /// Name resolution target.
    pub const DNS: &str = "horizon_reach_net::dns";
    /// Reachability monitor target.
    pub const REACHABILITY: &str = "horizon_reach_net::reachability";
    /// Notification bus target.
    pub const NOTIFICATION: &str = "horizon_reach_net::notification";
}

/// Render a panic payload as text for log output.
///
/// Panics raised with a string literal or a formatted `String` are returned
/// verbatim; anything else is reported as an opaque payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let literal = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "boom");

        let formatted = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "code 7");

        let opaque = std::panic::catch_unwind(|| std::panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(opaque.as_ref()), "<non-string panic payload>");
    }

    #[test]
    fn test_targets_are_prefixed_by_crate() {
        assert!(targets::SIGNAL.starts_with(targets::CORE));
        assert!(targets::REACHABILITY.starts_with("horizon_reach_net"));
    }
}
