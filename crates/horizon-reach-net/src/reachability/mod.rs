//! Reachability monitoring module for Horizon Reach.
//!
//! A [`ReachabilityMonitor`] watches one [`Target`] (an address, a host name,
//! or the host of a URL) and reports how the network can reach it:
//!
//! - [`NetworkStatus::NotReachable`]
//! - [`NetworkStatus::ReachableViaWiFi`] (any local link, wired included)
//! - [`NetworkStatus::ReachableViaWWAN`] (only a cellular-class link)
//!
//! The raw [`ReachabilityFlags`] come from a [`ReachabilityProvider`]. The
//! [`SystemProvider`] reads the host's interfaces and watches them for
//! changes; the [`SimulatedProvider`] is driven by hand for tests.
//!
//! # Example
//!
//! ```ignore
//! use horizon_reach_net::notification::NotificationBus;
//! use horizon_reach_net::reachability::ReachabilityMonitor;
//!
//! NotificationBus::global().subscribe_fn(|change| {
//!     println!("{}: {} -> {}", change.monitor.target(), change.previous, change.status);
//! });
//!
//! let monitor = ReachabilityMonitor::internet();
//! monitor.start()?;
//! println!("currently {}", monitor.status());
//! ```

mod flags;
mod monitor;
mod provider;
mod simulated;
mod system;
mod target;

pub use flags::{NetworkStatus, ReachabilityFlags};
pub use monitor::{ChangeHandler, MonitorBuilder, MonitorState, ReachabilityMonitor};
pub use provider::{FlagsCallback, ReachabilityProvider, Registration};
pub use simulated::SimulatedProvider;
pub use system::SystemProvider;
pub use target::Target;
