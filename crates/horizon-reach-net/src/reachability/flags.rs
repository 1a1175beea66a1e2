//! Reachability flags and their classification.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Capability flags reported by a reachability provider for one target.
    ///
    /// The low bits describe whether and how a connection can be made; the
    /// high bits describe the path. `IS_WWAN` is only ever set by providers
    /// that can observe a cellular-class transport.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReachabilityFlags: u32 {
        /// Reachable, but through a transient connection such as PPP.
        const TRANSIENT_CONNECTION = 1 << 0;
        /// A route to the target exists.
        const REACHABLE = 1 << 1;
        /// A connection must be established before traffic can flow.
        const CONNECTION_REQUIRED = 1 << 2;
        /// The required connection is brought up automatically by traffic.
        const CONNECTION_ON_TRAFFIC = 1 << 3;
        /// Bringing the connection up needs user intervention.
        const INTERVENTION_REQUIRED = 1 << 4;
        /// The required connection is brought up on demand.
        const CONNECTION_ON_DEMAND = 1 << 5;
        /// The target is an address of this host.
        const IS_LOCAL_ADDRESS = 1 << 16;
        /// Traffic goes directly to the target, not through a gateway.
        const IS_DIRECT = 1 << 17;
        /// The path uses a wide-area (cellular-class) transport.
        const IS_WWAN = 1 << 18;
        /// The path uses a local wireless (802.11-class) transport.
        const IS_LOCAL_WIRELESS = 1 << 19;
    }
}

impl ReachabilityFlags {
    /// Whether traffic can reach the target without user intervention.
    ///
    /// A route must exist, and if a connection is required it must come up
    /// on its own (on traffic or on demand) without intervention.
    pub fn is_reachable(self) -> bool {
        if !self.contains(Self::REACHABLE) {
            return false;
        }
        if !self.contains(Self::CONNECTION_REQUIRED) {
            return true;
        }
        self.intersects(Self::CONNECTION_ON_TRAFFIC | Self::CONNECTION_ON_DEMAND)
            && !self.contains(Self::INTERVENTION_REQUIRED)
    }

    /// Whether the target is reachable through a local (non-cellular) link.
    pub fn via_local_wireless(self) -> bool {
        self.is_reachable()
            && (self.contains(Self::IS_LOCAL_WIRELESS) || !self.contains(Self::IS_WWAN))
    }

    /// Whether the target is reachable through a wide-area link.
    pub fn via_wide_area(self) -> bool {
        self.is_reachable() && self.contains(Self::IS_WWAN)
    }

    /// The three-way classification of these flags.
    pub fn status(self) -> NetworkStatus {
        NetworkStatus::classify(self)
    }
}

impl fmt::Display for ReachabilityFlags {
    /// Renders the flags as a fixed-width letter mask, `-` for unset bits:
    /// `W` wwan, `w` wireless, `R` reachable, `t` transient, `c` connection
    /// required, `C` on traffic, `i` intervention, `D` on demand, `l` local
    /// address, `d` direct.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [(ReachabilityFlags, char); 10] = [
            (ReachabilityFlags::IS_WWAN, 'W'),
            (ReachabilityFlags::IS_LOCAL_WIRELESS, 'w'),
            (ReachabilityFlags::REACHABLE, 'R'),
            (ReachabilityFlags::TRANSIENT_CONNECTION, 't'),
            (ReachabilityFlags::CONNECTION_REQUIRED, 'c'),
            (ReachabilityFlags::CONNECTION_ON_TRAFFIC, 'C'),
            (ReachabilityFlags::INTERVENTION_REQUIRED, 'i'),
            (ReachabilityFlags::CONNECTION_ON_DEMAND, 'D'),
            (ReachabilityFlags::IS_LOCAL_ADDRESS, 'l'),
            (ReachabilityFlags::IS_DIRECT, 'd'),
        ];
        for (flag, letter) in LETTERS {
            let c = if self.contains(flag) { letter } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// How the network can currently reach a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    /// No usable route to the target.
    #[default]
    NotReachable,
    /// Reachable through a local link (WiFi-class; wired links count too).
    ReachableViaWiFi,
    /// Reachable only through a wide-area (cellular-class) link.
    ReachableViaWWAN,
}

impl NetworkStatus {
    /// Collapse `flags` into a status.
    ///
    /// When both transports are usable the local link wins, so
    /// `ReachableViaWWAN` means the cellular path is the only one.
    pub fn classify(flags: ReachabilityFlags) -> Self {
        if flags.via_local_wireless() {
            Self::ReachableViaWiFi
        } else if flags.via_wide_area() {
            Self::ReachableViaWWAN
        } else {
            Self::NotReachable
        }
    }

    /// Whether this status allows traffic.
    pub fn is_reachable(self) -> bool {
        self != Self::NotReachable
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReachable => write!(f, "Not Reachable"),
            Self::ReachableViaWiFi => write!(f, "Reachable via WiFi"),
            Self::ReachableViaWWAN => write!(f, "Reachable via WWAN"),
        }
    }
}
