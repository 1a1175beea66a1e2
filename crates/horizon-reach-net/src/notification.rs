//! Process-wide reachability notifications.
//!
//! Every [`ReachabilityMonitor`] publishes a [`StatusChange`] when its
//! classified status changes. Observers subscribe to a [`NotificationBus`],
//! usually the process-wide one returned by [`NotificationBus::global`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_reach_net::notification::{NotificationBus, StatusChange};
//!
//! struct Banner;
//!
//! impl Banner {
//!     fn on_status(&self, change: &StatusChange) {
//!         println!("{} is now {}", change.monitor.target(), change.status);
//!     }
//! }
//!
//! let banner = Arc::new(Banner);
//! let handle = NotificationBus::global().subscribe(&banner, Banner::on_status);
//!
//! // Dropping `banner` is enough to stop delivery; unsubscribing is explicit.
//! NotificationBus::global().unsubscribe(handle);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use horizon_reach_core::logging::targets;
use horizon_reach_core::{ConnectionId, EmitOutcome, Signal};

use crate::reachability::{NetworkStatus, ReachabilityFlags, ReachabilityMonitor};

/// Name of the event published on every status change.
pub const STATUS_CHANGED: &str = "horizon_reach.reachability.status_changed";

static GLOBAL: OnceLock<Arc<NotificationBus>> = OnceLock::new();

/// Payload of a [`STATUS_CHANGED`] event.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// The monitor whose status changed.
    pub monitor: ReachabilityMonitor,
    /// The new classified status.
    pub status: NetworkStatus,
    /// The status before the change.
    pub previous: NetworkStatus,
    /// The raw flags that produced `status`.
    pub flags: ReachabilityFlags,
}

impl StatusChange {
    /// The event name, always [`STATUS_CHANGED`].
    pub fn name(&self) -> &'static str {
        STATUS_CHANGED
    }
}

/// Identifies one subscription on a [`NotificationBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(ConnectionId);

/// Publish/subscribe channel for [`StatusChange`] events.
///
/// Delivery is synchronous on the publishing thread, in subscription order.
/// The subscriber list is snapshotted before delivery, so a subscriber may
/// subscribe or unsubscribe from inside its callback. A panicking subscriber
/// is logged and skipped; the others still receive the event.
pub struct NotificationBus {
    status_changed: Signal<StatusChange>,
}

impl NotificationBus {
    /// Create an independent bus.
    ///
    /// Useful for tests and for components that want their own channel. Pass
    /// it to [`MonitorBuilder::bus`](crate::reachability::MonitorBuilder::bus)
    /// to route a monitor's events there instead of the global bus.
    pub fn new() -> Self {
        Self {
            status_changed: Signal::new(),
        }
    }

    /// The process-wide bus, created on first use and never torn down.
    pub fn global() -> Arc<NotificationBus> {
        Arc::clone(GLOBAL.get_or_init(|| {
            tracing::debug!(target: targets::NOTIFICATION, event = STATUS_CHANGED, "creating global notification bus");
            Arc::new(NotificationBus::new())
        }))
    }

    /// The process-wide bus if anything has created it yet.
    ///
    /// Monitors publish through this, so nothing is allocated for processes
    /// that never subscribe.
    pub fn try_global() -> Option<Arc<NotificationBus>> {
        GLOBAL.get().cloned()
    }

    /// Subscribe `subscriber` to status changes.
    ///
    /// The bus holds `subscriber` weakly: once the last `Arc` to it is
    /// dropped, it stops receiving events and its subscription is pruned on
    /// the next publish.
    pub fn subscribe<S, F>(&self, subscriber: &Arc<S>, callback: F) -> SubscriptionHandle
    where
        S: Send + Sync + 'static,
        F: Fn(&S, &StatusChange) + Send + Sync + 'static,
    {
        let id = self.status_changed.connect_weak(subscriber, callback);
        tracing::trace!(target: targets::NOTIFICATION, subscription = ?id, "subscriber added");
        SubscriptionHandle(id)
    }

    /// Subscribe a free-standing closure. It is held until unsubscribed.
    pub fn subscribe_fn<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&StatusChange) + Send + Sync + 'static,
    {
        let id = self.status_changed.connect(callback);
        tracing::trace!(target: targets::NOTIFICATION, subscription = ?id, "closure subscriber added");
        SubscriptionHandle(id)
    }

    /// Remove one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.status_changed.disconnect(handle.0)
    }

    /// Remove every subscription made with [`subscribe`](Self::subscribe) for
    /// `subscriber`. Returns how many were removed.
    pub fn unsubscribe_all<S>(&self, subscriber: &Arc<S>) -> usize {
        self.status_changed.disconnect_receiver(subscriber)
    }

    /// Number of live subscriptions (dead weak ones count until pruned).
    pub fn subscriber_count(&self) -> usize {
        self.status_changed.connection_count()
    }

    /// Deliver `change` to every subscriber.
    pub fn publish(&self, change: StatusChange) -> EmitOutcome {
        tracing::trace!(
            target: targets::NOTIFICATION,
            event = STATUS_CHANGED,
            monitor = change.monitor.id(),
            status = %change.status,
            "publishing"
        );
        self.status_changed.emit(change)
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
