//! Monitoring targets.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use url::{Host, Url};

use crate::error::MonitorError;

/// Maximum length of a host name, in octets, without the trailing dot.
const MAX_HOST_NAME_LEN: usize = 253;
/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// What a [`ReachabilityMonitor`](super::ReachabilityMonitor) watches.
///
/// Exactly one form is held and it never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A socket address. No name work is ever performed for it.
    Address(SocketAddr),
    /// A syntactically valid host name.
    HostName(String),
    /// A URL whose host is a domain name; only the host is monitored.
    Url(Url),
}

impl Target {
    /// The unspecified IPv4 address, i.e. "is the internet reachable at all".
    pub fn any() -> Self {
        Self::Address(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))
    }

    /// Target a socket address.
    pub fn address(address: SocketAddr) -> Self {
        Self::Address(address)
    }

    /// Target a host name, validating its syntax.
    ///
    /// IP literals are accepted and become [`Target::Address`] with port 0.
    pub fn host_name(host_name: impl AsRef<str>) -> Result<Self, MonitorError> {
        let host_name = host_name.as_ref().trim();
        if let Ok(ip) = host_name.parse::<IpAddr>() {
            return Ok(Self::Address(SocketAddr::new(ip, 0)));
        }
        validate_host_name(host_name)?;
        Ok(Self::HostName(host_name.to_string()))
    }

    /// Target the host of `url`.
    ///
    /// A URL whose host is an IP literal becomes [`Target::Address`], using
    /// the URL's port or the scheme's default.
    pub fn url(url: Url) -> Result<Self, MonitorError> {
        let port = url.port_or_known_default().unwrap_or(0);
        match url.host() {
            Some(Host::Domain(domain)) => {
                validate_host_name(domain)?;
                Ok(Self::Url(url))
            }
            Some(Host::Ipv4(addr)) => Ok(Self::Address(SocketAddr::new(IpAddr::V4(addr), port))),
            Some(Host::Ipv6(addr)) => Ok(Self::Address(SocketAddr::new(IpAddr::V6(addr), port))),
            None => Err(MonitorError::InvalidTarget(format!("URL has no host: {url}"))),
        }
    }

    /// Parse `input` as a URL and target its host.
    pub fn parse_url(input: &str) -> Result<Self, MonitorError> {
        let url = Url::parse(input)
            .map_err(|e| MonitorError::InvalidTarget(format!("{input}: {e}")))?;
        Self::url(url)
    }

    /// The host name to monitor, if this target is name-based.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Address(_) => None,
            Self::HostName(name) => Some(name),
            Self::Url(url) => url.host_str(),
        }
    }

    /// The socket address, if this target is address-based.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Self::Address(addr) => Some(*addr),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::HostName(name) => write!(f, "{name}"),
            Self::Url(url) => write!(f, "{}", url.host_str().unwrap_or_default()),
        }
    }
}

impl From<SocketAddr> for Target {
    fn from(addr: SocketAddr) -> Self {
        Self::Address(addr)
    }
}

/// Check host-name syntax (RFC 1123 labels, underscores tolerated).
fn validate_host_name(host_name: &str) -> Result<(), MonitorError> {
    let invalid = |reason: &str| MonitorError::InvalidTarget(format!("{host_name:?}: {reason}"));

    if host_name.is_empty() {
        return Err(invalid("host name is empty"));
    }

    let name = host_name.strip_suffix('.').unwrap_or(host_name);
    if name.is_empty() {
        return Err(invalid("host name has no labels"));
    }
    if name.len() > MAX_HOST_NAME_LEN {
        return Err(invalid("host name is too long"));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid("label is too long"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("label starts or ends with a hyphen"));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(invalid("label contains an invalid character"));
        }
    }

    Ok(())
}
