//! The name-resolution primitive.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

use horizon_reach_core::logging::targets;

use crate::error::ResolveError;

/// A blocking host-name resolution primitive.
///
/// Implementations may block the calling thread. [`AddressResolver`] always
/// calls them from a background thread and enforces its own deadline, so a
/// primitive that ignores `timeout` cannot hang a caller; `timeout` is passed
/// through as a hint for primitives able to give up early.
///
/// [`AddressResolver`]: super::AddressResolver
pub trait NameLookup: Send + Sync + 'static {
    /// Resolve `host_name` to its addresses, in the resolver's order.
    ///
    /// A name that exists but has no address records resolves to an empty
    /// vector, which is success and distinct from [`ResolveError::NotFound`].
    fn lookup(&self, host_name: &str, timeout: Duration) -> Result<Vec<IpAddr>, ResolveError>;
}

/// The operating system's resolver (`getaddrinfo` on Unix).
///
/// This honours the hosts file, search domains and whatever else the host is
/// configured for. The OS call cannot be interrupted; `timeout` is enforced
/// by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl NameLookup for SystemLookup {
    fn lookup(&self, host_name: &str, _timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
        tracing::trace!(target: targets::DNS, host = host_name, "system lookup");

        let addresses = (host_name, 0)
            .to_socket_addrs()
            .map_err(|err| map_lookup_error(host_name, &err))?;

        let mut resolved: Vec<IpAddr> = Vec::new();
        for addr in addresses {
            // getaddrinfo repeats an address once per socket type.
            if !resolved.contains(&addr.ip()) {
                resolved.push(addr.ip());
            }
        }
        Ok(resolved)
    }
}

/// Translate a resolver failure into the resolution taxonomy.
///
/// Errors carrying an OS error code are reported as-is. Resolver failures
/// (`EAI_*`) surface without one and mean the name could not be resolved.
fn map_lookup_error(host_name: &str, err: &io::Error) -> ResolveError {
    match err.raw_os_error() {
        Some(code) => ResolveError::Underlying(code),
        None => ResolveError::NotFound(format!("{host_name}: {err}")),
    }
}
