//! Single-shot resolution requests.

use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::Duration;

use url::{Host, Url};

use crate::dns::config::DEFAULT_TIMEOUT;
use crate::dns::resolver::{validate_host_name, AddressResolver};
use crate::error::ResolveError;

/// A host name to resolve, together with the outcome once it is known.
///
/// The outcome is written at most once. Calling [`resolve`](Self::resolve)
/// again returns the stored outcome instead of querying a second time, so a
/// failed request stays failed; create a new request to retry.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use horizon_reach_net::dns::{AddressResolver, ResolverRequest};
///
/// let request = ResolverRequest::new("example.com")?.with_timeout(Duration::from_millis(500));
/// assert!(request.addresses().is_none());
///
/// request.resolve(&AddressResolver::system())?;
/// println!("{:?}", request.addresses());
/// ```
#[derive(Debug)]
pub struct ResolverRequest {
    host_name: String,
    timeout: Duration,
    outcome: OnceLock<Result<Vec<IpAddr>, ResolveError>>,
}

impl ResolverRequest {
    /// Create a request for `host_name` with the default one second timeout.
    pub fn new(host_name: impl Into<String>) -> Result<Self, ResolveError> {
        let host_name = host_name.into();
        validate_host_name(&host_name)?;
        Ok(Self {
            host_name,
            timeout: DEFAULT_TIMEOUT,
            outcome: OnceLock::new(),
        })
    }

    /// Create a request for the host component of `url`.
    pub fn from_url(url: &Url) -> Result<Self, ResolveError> {
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => {
                return Err(ResolveError::InvalidArgument(format!(
                    "URL has no host: {url}"
                )));
            }
        };
        Self::new(host)
    }

    /// Set the timeout used by [`resolve`](Self::resolve).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The host name being resolved.
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// The resolution timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the host name with `resolver`, blocking for at most the
    /// request's timeout.
    ///
    /// Only the first call queries the resolver. Concurrent callers wait for
    /// that first call and observe its outcome.
    pub fn resolve(&self, resolver: &AddressResolver) -> Result<&[IpAddr], ResolveError> {
        self.outcome
            .get_or_init(|| resolver.resolve_sync(&self.host_name, self.timeout))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// The resolved addresses, or `None` until resolution has succeeded.
    pub fn addresses(&self) -> Option<&[IpAddr]> {
        self.outcome.get()?.as_deref().ok()
    }

    /// Whether resolution has finished, successfully or not.
    pub fn is_complete(&self) -> bool {
        self.outcome.get().is_some()
    }
}
