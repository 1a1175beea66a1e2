//! Networking module for Horizon Reach.
//!
//! This crate provides two facilities that share one problem: turning an
//! OS-level, callback-driven network primitive into something a caller can
//! start, query and stop without races or leaks.
//!
//! - **Name resolution** ([`dns`]): host name to addresses with a hard
//!   timeout, blocking or in the background
//! - **Reachability** ([`reachability`]): watch a target and learn whether it
//!   is reachable, and over which kind of link
//! - **Notifications** ([`notification`]): a process-wide channel for status
//!   changes
//!
//! # Resolving a Host
//!
//! ```ignore
//! use std::time::Duration;
//! use horizon_reach_net::dns::AddressResolver;
//!
//! let resolver = AddressResolver::system();
//! let addresses = resolver.resolve_sync("example.com", Duration::from_secs(1))?;
//! ```
//!
//! # Watching Reachability
//!
//! ```ignore
//! use horizon_reach_net::reachability::ReachabilityMonitor;
//!
//! let monitor = ReachabilityMonitor::for_host_name("api.example.com")?;
//! monitor.set_change_handler(|_, status| println!("now {status}"));
//! monitor.start()?;
//! // ...
//! monitor.stop()?;
//! ```
//!
//! # Logging
//!
//! Everything is logged through `tracing`. Targets are listed in
//! [`horizon_reach_core::logging::targets`]; install a subscriber in the
//! application to see them.

mod error;
pub mod dns;
pub mod notification;
pub mod reachability;

pub use error::{MonitorError, ProviderError, ResolveError, Result};

// Re-export commonly used types at the crate root
pub use dns::{AddressResolver, ResolverConfig, ResolverRequest};
pub use notification::{NotificationBus, StatusChange, SubscriptionHandle, STATUS_CHANGED};
pub use reachability::{
    MonitorBuilder, MonitorState, NetworkStatus, ReachabilityFlags, ReachabilityMonitor, Target,
};
