//! Name resolution module for Horizon Reach.
//!
//! This module turns host names into addresses with a hard upper bound on
//! how long a caller can be kept waiting.
//!
//! # Features
//!
//! - **Bounded blocking resolution**: [`AddressResolver::resolve_sync`] never
//!   blocks longer than its timeout, even if the OS resolver hangs
//! - **Background resolution**: [`AddressResolver::resolve_async`] delivers
//!   exactly one completion off the calling thread
//! - **Single-shot requests**: [`ResolverRequest`] records its outcome once
//! - **Pluggable primitive**: the OS resolver by default, any [`NameLookup`]
//!   for tests or custom platforms
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use horizon_reach_net::dns::{AddressResolver, IpStrategy, ResolverConfig};
//!
//! let resolver = AddressResolver::new(
//!     ResolverConfig::default()
//!         .timeout(Duration::from_millis(750))
//!         .ip_strategy(IpStrategy::Ipv4ThenIpv6),
//! );
//!
//! let addresses = resolver.resolve_sync("example.com", Duration::from_secs(1))?;
//! for addr in &addresses {
//!     if let std::net::IpAddr::V4(v4) = addr {
//!         println!("{:?}", horizon_reach_net::dns::format_ipv4(&v4.octets()));
//!     }
//! }
//! ```

mod config;
mod format;
mod lookup;
mod request;
mod resolver;

pub use config::{IpStrategy, ResolverConfig, DEFAULT_TIMEOUT};
pub use format::format_ipv4;
pub use lookup::{NameLookup, SystemLookup};
pub use request::ResolverRequest;
pub use resolver::AddressResolver;
