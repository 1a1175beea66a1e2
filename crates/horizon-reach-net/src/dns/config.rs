//! Resolver configuration types.

use std::net::IpAddr;
use std::time::Duration;

/// Default upper bound on a single resolution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for name resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Hard upper bound for one resolution. The caller gets
    /// [`ResolveError::Timeout`](crate::ResolveError::Timeout) once it elapses,
    /// whether or not the OS resolver has returned.
    pub timeout: Duration,

    /// IP version preference applied to the resolver's answer.
    pub ip_strategy: IpStrategy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            ip_strategy: IpStrategy::default(),
        }
    }
}

impl ResolverConfig {
    /// Create a configuration with the system defaults.
    pub fn system() -> Self {
        Self::default()
    }

    /// Set the resolution timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the IP strategy.
    pub fn ip_strategy(mut self, strategy: IpStrategy) -> Self {
        self.ip_strategy = strategy;
        self
    }
}

/// IP version selection applied to resolved addresses.
///
/// The OS resolver is always asked for every family it supports; the strategy
/// filters and orders its answer. Relative order within a family is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IpStrategy {
    /// Keep IPv4 addresses only.
    Ipv4Only,
    /// Keep IPv6 addresses only.
    Ipv6Only,
    /// Keep both families, IPv4 first.
    Ipv4ThenIpv6,
    /// Keep both families, IPv6 first.
    Ipv6ThenIpv4,
    /// Keep both families in the order the resolver returned them.
    #[default]
    Ipv4AndIpv6,
}

impl IpStrategy {
    /// Filter and order `addresses` according to this strategy.
    pub fn apply(self, addresses: Vec<IpAddr>) -> Vec<IpAddr> {
        match self {
            Self::Ipv4AndIpv6 => addresses,
            Self::Ipv4Only => addresses.into_iter().filter(IpAddr::is_ipv4).collect(),
            Self::Ipv6Only => addresses.into_iter().filter(IpAddr::is_ipv6).collect(),
            Self::Ipv4ThenIpv6 => {
                let (mut v4, v6): (Vec<_>, Vec<_>) =
                    addresses.into_iter().partition(IpAddr::is_ipv4);
                v4.extend(v6);
                v4
            }
            Self::Ipv6ThenIpv4 => {
                let (mut v6, v4): (Vec<_>, Vec<_>) =
                    addresses.into_iter().partition(IpAddr::is_ipv6);
                v6.extend(v4);
                v6
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn mixed() -> Vec<IpAddr> {
        vec![
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        ]
    }

    #[test]
    fn test_default_timeout_is_one_second() {
        assert_eq!(ResolverConfig::default().timeout, Duration::from_secs(1));
        assert_eq!(ResolverConfig::system().ip_strategy, IpStrategy::Ipv4AndIpv6);
    }

    #[test]
    fn test_strategy_ordering() {
        let v4_first = IpStrategy::Ipv4ThenIpv6.apply(mixed());
        assert_eq!(v4_first[0], IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(v4_first[1], IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        assert!(v4_first[2].is_ipv6());

        let v6_first = IpStrategy::Ipv6ThenIpv4.apply(mixed());
        assert_eq!(v6_first[0], IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert!(v6_first[2].is_ipv4());

        assert_eq!(IpStrategy::Ipv4AndIpv6.apply(mixed()), mixed());
    }

    #[test]
    fn test_strategy_filtering() {
        assert!(IpStrategy::Ipv4Only.apply(mixed()).iter().all(IpAddr::is_ipv4));
        assert_eq!(IpStrategy::Ipv6Only.apply(mixed()).len(), 2);
    }
}
