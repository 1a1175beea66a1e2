//! Reachability derived from the host's network interfaces.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use horizon_reach_core::logging::targets;
use netdev::interface::InterfaceType as NetdevInterfaceType;

use super::flags::ReachabilityFlags;
use super::provider::{FlagsCallback, ReachabilityProvider, Registration};
use super::target::Target;
use crate::error::ProviderError;

/// Transport class of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum InterfaceType {
    /// Wired Ethernet.
    Ethernet,
    /// 802.11 wireless.
    WiFi,
    /// Cellular, mobile broadband or PPP.
    Wwan,
    /// Loopback interface (localhost).
    Loopback,
    /// Virtual or tunnel interface.
    Virtual,
    /// Unknown interface type.
    Unknown,
}

impl InterfaceType {
    fn from_netdev(iface: &netdev::Interface) -> Self {
        if iface.is_loopback() {
            return Self::Loopback;
        }
        if iface.is_tun() {
            return Self::Virtual;
        }
        match iface.if_type {
            NetdevInterfaceType::Ethernet => Self::Ethernet,
            NetdevInterfaceType::Wireless80211 => Self::WiFi,
            NetdevInterfaceType::Wwanpp | NetdevInterfaceType::Wwanpp2 | NetdevInterfaceType::Ppp => {
                Self::Wwan
            }
            NetdevInterfaceType::Tunnel => Self::Virtual,
            _ => Self::Unknown,
        }
    }

    /// Path bits contributed by routing through this interface type.
    fn transport_flags(self) -> ReachabilityFlags {
        match self {
            Self::WiFi => ReachabilityFlags::IS_LOCAL_WIRELESS,
            Self::Wwan => ReachabilityFlags::IS_WWAN,
            _ => ReachabilityFlags::empty(),
        }
    }
}

/// The parts of an interface that decide reachability.
#[derive(Debug, Clone)]
pub(crate) struct Link {
    pub is_up: bool,
    pub is_default: bool,
    pub kind: InterfaceType,
    pub ipv4: Vec<(Ipv4Addr, u8)>,
    pub ipv6: Vec<(Ipv6Addr, u8)>,
}

impl Link {
    fn has_addresses(&self) -> bool {
        !self.ipv4.is_empty() || !self.ipv6.is_empty()
    }

    fn usable(&self) -> bool {
        self.is_up && self.kind != InterfaceType::Loopback && self.has_addresses()
    }

    fn owns(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.ipv4.iter().any(|(addr, _)| *addr == v4),
            IpAddr::V6(v6) => self.ipv6.iter().any(|(addr, _)| *addr == v6),
        }
    }

    fn on_link(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self
                .ipv4
                .iter()
                .any(|(addr, prefix)| same_prefix_v4(*addr, v4, *prefix)),
            IpAddr::V6(v6) => self
                .ipv6
                .iter()
                .any(|(addr, prefix)| same_prefix_v6(*addr, v6, *prefix)),
        }
    }
}

fn same_prefix_v4(a: Ipv4Addr, b: Ipv4Addr, prefix: u8) -> bool {
    if prefix == 0 {
        return false;
    }
    let mask = u32::MAX << (32 - u32::from(prefix.min(32)));
    u32::from(a) & mask == u32::from(b) & mask
}

fn same_prefix_v6(a: Ipv6Addr, b: Ipv6Addr, prefix: u8) -> bool {
    if prefix == 0 {
        return false;
    }
    let mask = u128::MAX << (128 - u32::from(prefix.min(128)));
    u128::from(a) & mask == u128::from(b) & mask
}

/// Compute the flags for `target` over a snapshot of the host's links.
///
/// Name targets are judged by the default route alone; no name resolution
/// happens here. `localhost` names and loopback addresses are always local.
pub(crate) fn derive_flags(target: &Target, links: &[Link]) -> ReachabilityFlags {
    let local = ReachabilityFlags::REACHABLE
        | ReachabilityFlags::IS_LOCAL_ADDRESS
        | ReachabilityFlags::IS_DIRECT;

    let ip = match target {
        Target::Address(addr) => Some(addr.ip()),
        other => {
            let host = other.host().unwrap_or_default().trim_end_matches('.');
            if host.eq_ignore_ascii_case("localhost")
                || host.to_ascii_lowercase().ends_with(".localhost")
            {
                return local;
            }
            None
        }
    };

    if let Some(ip) = ip.filter(|ip| !ip.is_unspecified()) {
        if ip.is_loopback() {
            return local;
        }
        let up = || links.iter().filter(|link| link.is_up);
        if let Some(link) = up().find(|link| link.owns(ip)) {
            return local | link.kind.transport_flags();
        }
        if let Some(link) = up().find(|link| link.kind != InterfaceType::Loopback && link.on_link(ip)) {
            return ReachabilityFlags::REACHABLE
                | ReachabilityFlags::IS_DIRECT
                | link.kind.transport_flags();
        }
    }

    default_route_flags(links)
}

fn default_route_flags(links: &[Link]) -> ReachabilityFlags {
    let route = links
        .iter()
        .find(|link| link.is_default && link.usable())
        .or_else(|| links.iter().find(|link| link.usable()));

    match route {
        Some(link) => {
            let mut flags = ReachabilityFlags::REACHABLE | link.kind.transport_flags();
            if link.kind == InterfaceType::Virtual {
                flags |= ReachabilityFlags::TRANSIENT_CONNECTION;
            }
            flags
        }
        None => ReachabilityFlags::empty(),
    }
}

/// Read the current links from the OS.
fn snapshot_links() -> Vec<Link> {
    let default_index = netdev::get_default_interface().ok().map(|iface| iface.index);

    netdev::get_interfaces()
        .into_iter()
        .map(|iface| Link {
            is_up: iface.is_up(),
            is_default: Some(iface.index) == default_index,
            kind: InterfaceType::from_netdev(&iface),
            ipv4: iface.ipv4.iter().map(|net| (net.addr(), net.prefix_len())).collect(),
            ipv6: iface.ipv6.iter().map(|net| (net.addr(), net.prefix_len())).collect(),
        })
        .collect()
}

/// The host's own view of reachability.
///
/// Flags are computed from the interface table (`netdev`): which interface
/// carries the route to the target, and what kind of link it is. Changes are
/// observed with `netwatcher`, whose background thread delivers callbacks
/// whenever an interface or address is added or removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProvider;

impl SystemProvider {
    /// Create a system provider.
    pub fn new() -> Self {
        Self
    }
}

impl ReachabilityProvider for SystemProvider {
    fn query_flags(&self, target: &Target) -> Result<ReachabilityFlags, ProviderError> {
        let links = snapshot_links();
        let flags = derive_flags(target, &links);
        tracing::trace!(
            target: targets::REACHABILITY,
            %target,
            %flags,
            interfaces = links.len(),
            "queried interface flags"
        );
        Ok(flags)
    }

    fn register(&self, target: &Target, callback: FlagsCallback) -> Result<Registration, ProviderError> {
        let target = target.clone();
        let provider = *self;

        let handle = netwatcher::watch_interfaces(move |update| {
            tracing::trace!(
                target: targets::REACHABILITY,
                added = update.diff.added.len(),
                removed = update.diff.removed.len(),
                "interface change"
            );
            callback(provider.query_flags(&target));
        })
        .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Registration::from_handle(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(kind: InterfaceType, ipv4: &[(&str, u8)], is_default: bool) -> Link {
        Link {
            is_up: true,
            is_default,
            kind,
            ipv4: ipv4.iter().map(|(a, p)| (a.parse().unwrap(), *p)).collect(),
            ipv6: Vec::new(),
        }
    }

    fn laptop() -> Vec<Link> {
        vec![
            link(InterfaceType::Loopback, &[("127.0.0.1", 8)], false),
            link(InterfaceType::WiFi, &[("192.168.1.20", 24)], true),
            link(InterfaceType::Wwan, &[("100.64.3.9", 30)], false),
        ]
    }

    fn addr(s: &str) -> Target {
        Target::Address(s.parse().unwrap())
    }

    #[test]
    fn test_loopback_is_local() {
        let flags = derive_flags(&addr("127.0.0.1:80"), &[]);
        assert!(flags.contains(ReachabilityFlags::IS_LOCAL_ADDRESS | ReachabilityFlags::IS_DIRECT));
        assert!(flags.is_reachable());

        let flags = derive_flags(&Target::host_name("localhost").unwrap(), &[]);
        assert!(flags.contains(ReachabilityFlags::IS_LOCAL_ADDRESS));
    }

    #[test]
    fn test_own_address_is_local_with_transport() {
        let flags = derive_flags(&addr("192.168.1.20:0"), &laptop());
        assert!(flags.contains(ReachabilityFlags::IS_LOCAL_ADDRESS));
        assert!(flags.contains(ReachabilityFlags::IS_LOCAL_WIRELESS));
    }

    #[test]
    fn test_on_link_target_is_direct() {
        let flags = derive_flags(&addr("100.64.3.10:443"), &laptop());
        assert!(flags.contains(ReachabilityFlags::IS_DIRECT));
        assert!(flags.contains(ReachabilityFlags::IS_WWAN));
        assert!(!flags.contains(ReachabilityFlags::IS_LOCAL_ADDRESS));
    }

    #[test]
    fn test_remote_targets_follow_default_route() {
        let flags = derive_flags(&Target::host_name("api.example.com").unwrap(), &laptop());
        assert_eq!(flags, ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_LOCAL_WIRELESS);

        let flags = derive_flags(&Target::any(), &laptop());
        assert_eq!(flags, ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_LOCAL_WIRELESS);
    }

    #[test]
    fn test_cellular_only_host() {
        let links = vec![
            link(InterfaceType::Loopback, &[("127.0.0.1", 8)], false),
            link(InterfaceType::Wwan, &[("100.64.3.9", 30)], true),
        ];
        let flags = derive_flags(&addr("203.0.113.5:443"), &links);
        assert!(flags.via_wide_area());
        assert!(!flags.via_local_wireless());
    }

    #[test]
    fn test_no_usable_links_is_unreachable() {
        let mut links = laptop();
        for link in &mut links {
            if link.kind != InterfaceType::Loopback {
                link.is_up = false;
            }
        }
        assert_eq!(derive_flags(&addr("203.0.113.5:443"), &links), ReachabilityFlags::empty());
        assert_eq!(derive_flags(&addr("203.0.113.5:443"), &[]), ReachabilityFlags::empty());
    }

    #[test]
    fn test_fallback_without_default_interface() {
        let links = vec![link(InterfaceType::Ethernet, &[("10.0.0.2", 8)], false)];
        assert_eq!(derive_flags(&Target::any(), &links), ReachabilityFlags::REACHABLE);
    }

    #[test]
    fn test_prefix_matching() {
        let a: Ipv4Addr = "10.1.2.3".parse().unwrap();
        assert!(same_prefix_v4(a, "10.1.255.255".parse().unwrap(), 16));
        assert!(!same_prefix_v4(a, "10.2.0.1".parse().unwrap(), 16));
        assert!(same_prefix_v4(a, a, 32));
        assert!(!same_prefix_v4(a, a, 0));

        let b: Ipv6Addr = "fe80::1".parse().unwrap();
        assert!(same_prefix_v6(b, "fe80::abcd".parse().unwrap(), 64));
        assert!(!same_prefix_v6(b, "fe81::1".parse().unwrap(), 64));
    }

    #[test]
    fn test_system_query_does_not_fail() {
        // Depends on the host, but must always produce an answer.
        let flags = SystemProvider::new().query_flags(&addr("127.0.0.1:0")).unwrap();
        assert!(flags.is_reachable());
    }
}
