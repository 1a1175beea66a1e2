//! Reachability monitoring for a single target.

use std::cell::RefCell;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use horizon_reach_core::logging::targets;
use horizon_reach_core::runtime;
use horizon_reach_core::signal::call_isolated;
use parking_lot::{Mutex, ReentrantMutex};

use super::flags::{NetworkStatus, ReachabilityFlags};
use super::provider::{FlagsCallback, ReachabilityProvider, Registration};
use super::system::SystemProvider;
use super::target::Target;
use crate::dns::AddressResolver;
use crate::error::{MonitorError, ProviderError, Result};
use crate::notification::{NotificationBus, StatusChange};

static NEXT_MONITOR_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Gates being dispatched on this thread, innermost last.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Per-monitor change callback, invoked with the monitor and its new status.
pub type ChangeHandler = Arc<dyn Fn(&ReachabilityMonitor, NetworkStatus) + Send + Sync>;

/// Lifecycle of a [`ReachabilityMonitor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MonitorState {
    /// Constructed, never started.
    #[default]
    Created,
    /// Registered with the provider and receiving changes.
    Running,
    /// Stopped; may be started again.
    Stopped,
    /// The last start could not register; may be started again.
    Failed,
}

/// Serialises deliveries for one registration and lets `stop` wait them out.
///
/// The lock is reentrant so a change handler may stop its own monitor from
/// the dispatching thread.
struct DispatchGate {
    lock: ReentrantMutex<()>,
    open: AtomicBool,
}

impl DispatchGate {
    fn new() -> Self {
        Self {
            lock: ReentrantMutex::new(()),
            open: AtomicBool::new(true),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Close the gate and wait for any in-flight dispatch on another thread.
    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        drop(self.lock.lock());
    }
}

/// Marks the current thread as dispatching for one gate.
struct DispatchScope {
    key: usize,
}

impl DispatchScope {
    fn key(gate: &DispatchGate) -> usize {
        gate as *const DispatchGate as usize
    }

    fn enter(gate: &DispatchGate) -> Self {
        let key = Self::key(gate);
        DISPATCHING.with(|gates| gates.borrow_mut().push(key));
        Self { key }
    }

    /// Whether this thread is inside a dispatch for `gate`.
    fn is_dispatching(gate: &DispatchGate) -> bool {
        let key = Self::key(gate);
        DISPATCHING.with(|gates| gates.borrow().contains(&key))
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        DISPATCHING.with(|gates| {
            let mut gates = gates.borrow_mut();
            if let Some(pos) = gates.iter().rposition(|&key| key == self.key) {
                gates.remove(pos);
            }
        });
    }
}

#[derive(Default)]
struct Lifecycle {
    state: MonitorState,
    registration: Option<Registration>,
    gate: Option<Arc<DispatchGate>>,
    /// A `start` is registering with the provider outside the lock.
    starting: bool,
}

#[derive(Default, Clone, Copy)]
struct Cached {
    flags: ReachabilityFlags,
    status: NetworkStatus,
}

struct MonitorInner {
    id: u64,
    target: Target,
    provider: Arc<dyn ReachabilityProvider>,
    bus: Option<Arc<NotificationBus>>,
    cache: Mutex<Cached>,
    handler: Mutex<Option<ChangeHandler>>,
    lifecycle: Mutex<Lifecycle>,
}

impl MonitorInner {
    /// Store `flags`, returning the previous status if the status changed.
    fn apply(&self, flags: ReachabilityFlags) -> Option<NetworkStatus> {
        let status = NetworkStatus::classify(flags);
        let mut cache = self.cache.lock();
        let previous = cache.status;
        *cache = Cached { flags, status };
        (previous != status).then_some(previous)
    }
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut();
        if lifecycle.state == MonitorState::Running {
            lifecycle.state = MonitorState::Stopped;
            release(self.id, lifecycle.registration.take(), lifecycle.gate.take());
            tracing::debug!(target: targets::REACHABILITY, monitor = self.id, "monitor dropped while running");
        }
    }
}

/// Close `gate` and deregister.
///
/// Dropping a registration from inside one of its own callbacks could wait
/// on the very thread that is delivering, so in that case the registration
/// is released on a blocking worker instead. Other registrations are dropped
/// in place.
fn release(id: u64, registration: Option<Registration>, gate: Option<Arc<DispatchGate>>) {
    let own_dispatch = gate.as_deref().is_some_and(DispatchScope::is_dispatching);
    if let Some(gate) = gate {
        gate.close();
    }
    let Some(registration) = registration else {
        return;
    };
    if !own_dispatch {
        drop(registration);
        return;
    }

    tracing::trace!(target: targets::REACHABILITY, monitor = id, "releasing registration off the dispatching thread");
    let work = move || drop(registration);
    match runtime::get() {
        Ok(rt) => {
            rt.spawn_blocking(work);
        }
        Err(err) => {
            tracing::warn!(target: targets::REACHABILITY, error = %err, "runtime unavailable, releasing on a dedicated thread");
            std::thread::spawn(work);
        }
    }
}

/// Watches one target and reports how the network can reach it.
///
/// A monitor caches the flags last reported by its
/// [`ReachabilityProvider`] and classifies them into a [`NetworkStatus`].
/// When the status changes (not merely the raw flags) it notifies once, in
/// this order:
///
/// 1. the monitor's change handler, if set;
/// 2. the [`NotificationBus`] configured with
///    [`MonitorBuilder::bus`], or else the global bus if one exists.
///
/// Clones share the same monitor. When the last clone is dropped a running
/// monitor is stopped.
///
/// # Lifecycle
///
/// [`start`](Self::start) and [`stop`](Self::stop) are idempotent. A stopped
/// or failed monitor can be started again; each start registers afresh.
/// Once `stop` returns, no change handler call or bus publication happens
/// for this monitor until it is started again, even if the provider is
/// delivering concurrently.
///
/// # Example
///
/// ```ignore
/// use horizon_reach_net::reachability::ReachabilityMonitor;
///
/// let monitor = ReachabilityMonitor::for_host_name("api.example.com")?;
/// monitor.set_change_handler(|monitor, status| {
///     println!("{} -> {}", monitor.target(), status);
/// });
/// monitor.start()?;
///
/// if monitor.is_reachable_via_wifi() {
///     println!("on a local link");
/// }
/// ```
#[derive(Clone)]
pub struct ReachabilityMonitor {
    inner: Arc<MonitorInner>,
}

impl ReachabilityMonitor {
    /// Monitor a socket address.
    pub fn for_address(address: SocketAddr) -> Self {
        Self::builder(Target::address(address)).assemble()
    }

    /// Monitor a host name. The name is checked syntactically, not resolved.
    pub fn for_host_name(host_name: &str) -> Result<Self> {
        Self::builder_for_host(host_name)?.build()
    }

    /// Monitor the host of a URL.
    pub fn for_url(url: &str) -> Result<Self> {
        Self::builder(Target::parse_url(url)?).build()
    }

    /// Monitor general internet reachability (the unspecified address).
    pub fn internet() -> Self {
        Self::builder(Target::any()).assemble()
    }

    /// Start configuring a monitor for `target`.
    pub fn builder(target: Target) -> MonitorBuilder {
        MonitorBuilder::new(target)
    }

    /// Start configuring a monitor for a host name.
    pub fn builder_for_host(host_name: &str) -> Result<MonitorBuilder> {
        Ok(MonitorBuilder::new(Target::host_name(host_name)?))
    }

    /// Process-unique identifier of this monitor.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The monitored target.
    pub fn target(&self) -> &Target {
        &self.inner.target
    }

    /// The monitored host name, for name and URL targets.
    pub fn host(&self) -> Option<&str> {
        self.inner.target.host()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.inner.lifecycle.lock().state
    }

    /// Whether the monitor is registered and receiving changes.
    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Register with the provider and begin tracking changes.
    ///
    /// Takes an initial flags snapshot before returning; the snapshot updates
    /// the cache without notifying. Calling `start` on a running monitor, or
    /// while another `start` is registering, does nothing.
    ///
    /// The provider may deliver callbacks before registration completes.
    /// They are dispatched normally, and the monitor reports the state it had
    /// before `start` until registration completes.
    ///
    /// # Errors
    ///
    /// [`MonitorError::RegistrationFailed`] if the provider refuses the
    /// registration. The monitor is then [`MonitorState::Failed`] and `start`
    /// may be called again.
    pub fn start(&self) -> Result<()> {
        let inner = &self.inner;
        let gate = {
            let mut lifecycle = inner.lifecycle.lock();
            if lifecycle.state == MonitorState::Running || lifecycle.starting {
                return Ok(());
            }
            let gate = Arc::new(DispatchGate::new());
            lifecycle.starting = true;
            lifecycle.gate = Some(Arc::clone(&gate));
            gate
        };

        let flags = inner.provider.query_flags(&inner.target).unwrap_or_else(|err| {
            tracing::warn!(
                target: targets::REACHABILITY,
                monitor = inner.id,
                target_addr = %inner.target,
                error = %err,
                "initial flags query failed, assuming not reachable"
            );
            ReachabilityFlags::empty()
        });
        inner.apply(flags);

        let callback: FlagsCallback = {
            let weak = Arc::downgrade(inner);
            let gate = Arc::clone(&gate);
            Arc::new(move |result| dispatch(&weak, &gate, result))
        };
        let registered = inner.provider.register(&inner.target, callback);

        let mut lifecycle = inner.lifecycle.lock();
        // `stop` during registration clears `starting`; a newer `start` swaps the gate.
        let current = lifecycle.starting
            && lifecycle
                .gate
                .as_ref()
                .is_some_and(|pending| Arc::ptr_eq(pending, &gate));
        if current {
            lifecycle.starting = false;
        }

        match registered {
            Ok(registration) if current => {
                lifecycle.registration = Some(registration);
                lifecycle.state = MonitorState::Running;
                drop(lifecycle);
                tracing::debug!(
                    target: targets::REACHABILITY,
                    monitor = inner.id,
                    target_addr = %inner.target,
                    %flags,
                    status = %NetworkStatus::classify(flags),
                    "monitor started"
                );
                Ok(())
            }
            Ok(registration) => {
                drop(lifecycle);
                release(inner.id, Some(registration), Some(gate));
                tracing::debug!(target: targets::REACHABILITY, monitor = inner.id, "monitor stopped while starting");
                Ok(())
            }
            Err(err) => {
                if current {
                    lifecycle.state = MonitorState::Failed;
                    lifecycle.gate = None;
                }
                drop(lifecycle);
                gate.close();
                tracing::warn!(
                    target: targets::REACHABILITY,
                    monitor = inner.id,
                    target_addr = %inner.target,
                    error = %err,
                    "reachability registration failed"
                );
                Err(MonitorError::RegistrationFailed(err.to_string()))
            }
        }
    }

    /// Deregister from the provider.
    ///
    /// Waits for any callback being delivered on another thread to finish.
    /// May be called from inside the change handler, including one that runs
    /// while `start` is still registering. Calling `stop` on a monitor that
    /// is not running does nothing.
    pub fn stop(&self) -> Result<()> {
        let (registration, gate) = {
            let mut lifecycle = self.inner.lifecycle.lock();
            if lifecycle.starting {
                // The pending start sees this and releases its registration.
                lifecycle.starting = false;
            } else if lifecycle.state != MonitorState::Running {
                return Ok(());
            }
            lifecycle.state = MonitorState::Stopped;
            (lifecycle.registration.take(), lifecycle.gate.take())
        };

        release(self.inner.id, registration, gate);
        tracing::debug!(target: targets::REACHABILITY, monitor = self.inner.id, "monitor stopped");
        Ok(())
    }

    /// The last cached classification; `NotReachable` before the first start.
    pub fn status(&self) -> NetworkStatus {
        self.inner.cache.lock().status
    }

    /// The last cached raw flags.
    pub fn flags(&self) -> ReachabilityFlags {
        self.inner.cache.lock().flags
    }

    /// Whether the target is currently reachable by any transport.
    pub fn is_reachable(&self) -> bool {
        self.status().is_reachable()
    }

    /// Whether the target is reachable through a local link.
    pub fn is_reachable_via_wifi(&self) -> bool {
        self.status() == NetworkStatus::ReachableViaWiFi
    }

    /// Whether the target is reachable only through a wide-area link.
    pub fn is_reachable_via_wwan(&self) -> bool {
        self.status() == NetworkStatus::ReachableViaWWAN
    }

    /// Whether the target is currently unreachable.
    pub fn is_unreachable(&self) -> bool {
        !self.is_reachable()
    }

    /// Replace the change handler.
    pub fn set_change_handler<F>(&self, handler: F)
    where
        F: Fn(&ReachabilityMonitor, NetworkStatus) + Send + Sync + 'static,
    {
        *self.inner.handler.lock() = Some(Arc::new(handler));
    }

    /// Remove the change handler.
    pub fn clear_change_handler(&self) {
        *self.inner.handler.lock() = None;
    }

    /// Run the handler, then publish, re-checking the gate before each.
    fn notify(&self, gate: &DispatchGate, change: StatusChange) {
        let handler = self.inner.handler.lock().clone();
        if let Some(handler) = handler.filter(|_| gate.is_open()) {
            if let Err(panic) = call_isolated(|| handler(self, change.status)) {
                tracing::error!(
                    target: targets::REACHABILITY,
                    monitor = self.inner.id,
                    %panic,
                    "change handler panicked"
                );
            }
        }

        if !gate.is_open() {
            tracing::trace!(target: targets::REACHABILITY, monitor = self.inner.id, "stopped during dispatch, not publishing");
            return;
        }

        let bus = self.inner.bus.clone().or_else(NotificationBus::try_global);
        if let Some(bus) = bus {
            bus.publish(change);
        }
    }
}

/// Deliver one provider callback to the monitor behind `weak`.
fn dispatch(
    weak: &Weak<MonitorInner>,
    gate: &DispatchGate,
    result: std::result::Result<ReachabilityFlags, ProviderError>,
) {
    let _serial = gate.lock.lock();
    if !gate.is_open() {
        tracing::trace!(target: targets::REACHABILITY, "late callback after stop, ignored");
        return;
    }
    // Declared before the monitor so the scope outlives a final drop of it.
    let _scope = DispatchScope::enter(gate);
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let monitor = ReachabilityMonitor { inner };

    let flags = result.unwrap_or_else(|err| {
        tracing::warn!(
            target: targets::REACHABILITY,
            monitor = monitor.id(),
            error = %err,
            "provider reported a failure, treating target as not reachable"
        );
        ReachabilityFlags::empty()
    });

    let Some(previous) = monitor.inner.apply(flags) else {
        tracing::trace!(target: targets::REACHABILITY, monitor = monitor.id(), %flags, "flags changed, status unchanged");
        return;
    };

    let status = NetworkStatus::classify(flags);
    tracing::info!(
        target: targets::REACHABILITY,
        monitor = monitor.id(),
        target_addr = %monitor.target(),
        %previous,
        %status,
        %flags,
        "reachability changed"
    );

    let change = StatusChange {
        monitor: monitor.clone(),
        status,
        previous,
        flags,
    };
    monitor.notify(gate, change);
}

impl fmt::Debug for ReachabilityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReachabilityMonitor")
            .field("id", &self.inner.id)
            .field("target", &self.inner.target)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl PartialEq for ReachabilityMonitor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ReachabilityMonitor {}

/// Configures a [`ReachabilityMonitor`].
pub struct MonitorBuilder {
    target: Target,
    provider: Option<Arc<dyn ReachabilityProvider>>,
    bus: Option<Arc<NotificationBus>>,
    handler: Option<ChangeHandler>,
    resolver: Option<AddressResolver>,
}

impl MonitorBuilder {
    fn new(target: Target) -> Self {
        Self {
            target,
            provider: None,
            bus: None,
            handler: None,
            resolver: None,
        }
    }

    /// Use `provider` instead of the [`SystemProvider`].
    pub fn provider(mut self, provider: impl ReachabilityProvider) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Publish to `bus` instead of the global bus.
    pub fn bus(mut self, bus: Arc<NotificationBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Set the change handler.
    pub fn change_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ReachabilityMonitor, NetworkStatus) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Resolve the target's host with `resolver` when building, and reject
    /// the target if it does not resolve. Address targets are unaffected.
    pub fn resolve_eagerly(mut self, resolver: AddressResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the monitor. It is not started.
    pub fn build(self) -> Result<ReachabilityMonitor> {
        if let (Some(resolver), Some(host)) = (&self.resolver, self.target.host()) {
            let addresses = resolver
                .resolve_sync(host, resolver.config().timeout)
                .map_err(|err| MonitorError::InvalidTarget(format!("{host}: {err}")))?;
            tracing::debug!(
                target: targets::REACHABILITY,
                host,
                addresses = addresses.len(),
                "target resolved eagerly"
            );
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> ReachabilityMonitor {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(SystemProvider::new()));
        ReachabilityMonitor {
            inner: Arc::new(MonitorInner {
                id: NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed),
                target: self.target,
                provider,
                bus: self.bus,
                cache: Mutex::new(Cached::default()),
                handler: Mutex::new(self.handler),
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }
}

impl fmt::Debug for MonitorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorBuilder")
            .field("target", &self.target)
            .field("custom_provider", &self.provider.is_some())
            .field("resolve_eagerly", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reachability::SimulatedProvider;
    use std::sync::atomic::AtomicUsize;

    fn wifi() -> ReachabilityFlags {
        ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_LOCAL_WIRELESS
    }

    fn wwan() -> ReachabilityFlags {
        ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN
    }

    fn monitor(provider: &SimulatedProvider) -> ReachabilityMonitor {
        ReachabilityMonitor::builder(Target::any())
            .provider(provider.clone())
            .bus(Arc::new(NotificationBus::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_before_start() {
        let provider = SimulatedProvider::with_flags(wifi());
        let monitor = monitor(&provider);
        assert_eq!(monitor.state(), MonitorState::Created);
        assert_eq!(monitor.status(), NetworkStatus::NotReachable);
        assert!(monitor.is_unreachable());
        assert_eq!(provider.query_count(), 0);
    }

    #[test]
    fn test_start_seeds_without_notifying() {
        let provider = SimulatedProvider::with_flags(wifi());
        let monitor = monitor(&provider);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        monitor.set_change_handler(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert!(monitor.is_reachable_via_wifi());
        assert_eq!(monitor.flags(), wifi());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_initial_query_is_not_reachable() {
        let provider = SimulatedProvider::with_flags(wifi());
        provider.fail_queries(true);
        let monitor = monitor(&provider);
        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.status(), NetworkStatus::NotReachable);
    }

    #[test]
    fn test_handler_sees_new_status() {
        let provider = SimulatedProvider::with_flags(wifi());
        let monitor = monitor(&provider);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        monitor.set_change_handler(move |m, status| {
            assert_eq!(m.status(), status);
            sink.lock().push(status);
        });
        monitor.start().unwrap();

        provider.fire(wwan());
        provider.fire(wwan() | ReachabilityFlags::IS_DIRECT);
        monitor.clear_change_handler();
        provider.fire(wifi());

        assert_eq!(*seen.lock(), vec![NetworkStatus::ReachableViaWWAN]);
        assert_eq!(monitor.status(), NetworkStatus::ReachableViaWiFi);
    }

    #[test]
    fn test_panicking_handler_still_publishes() {
        let provider = SimulatedProvider::with_flags(wifi());
        let bus = Arc::new(NotificationBus::new());
        let published = Arc::new(AtomicUsize::new(0));
        let counter = published.clone();
        bus.subscribe_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let monitor = ReachabilityMonitor::builder(Target::any())
            .provider(provider.clone())
            .bus(bus)
            .change_handler(|_, _| panic!("handler failure"))
            .build()
            .unwrap();
        monitor.start().unwrap();
        provider.fire(ReachabilityFlags::empty());

        assert_eq!(published.load(Ordering::SeqCst), 1);
        assert!(monitor.is_unreachable());
    }

    #[test]
    fn test_stop_from_handler() {
        let provider = SimulatedProvider::with_flags(wifi());
        let bus = Arc::new(NotificationBus::new());
        let published = Arc::new(AtomicUsize::new(0));
        let counter = published.clone();
        bus.subscribe_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let monitor = ReachabilityMonitor::builder(Target::any())
            .provider(provider.clone())
            .bus(bus)
            .change_handler(|m, _| m.stop().unwrap())
            .build()
            .unwrap();
        monitor.start().unwrap();
        provider.fire(wwan());

        assert_eq!(monitor.state(), MonitorState::Stopped);
        // Stopped inside the handler, so the bus never sees the change.
        assert_eq!(published.load(Ordering::SeqCst), 0);

        // The registration is released on a worker; wait for it.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while provider.active_registrations() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(provider.active_registrations(), 0);
    }

    #[test]
    fn test_stopping_another_monitor_releases_in_place() {
        let provider = SimulatedProvider::with_flags(wifi());
        let a = monitor(&provider);
        let b = monitor(&provider);
        a.start().unwrap();
        b.start().unwrap();

        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let other = b.clone();
        let registrations = provider.clone();
        a.set_change_handler(move |_, _| {
            other.stop().unwrap();
            *sink.lock() = Some(registrations.active_registrations());
        });

        provider.fire(wwan());

        // Only the dispatching monitor's own registration is deferred.
        assert_eq!(*seen.lock(), Some(1));
        assert_eq!(b.state(), MonitorState::Stopped);
        assert!(a.is_running());
        assert_eq!(b.status(), NetworkStatus::ReachableViaWiFi);
    }

    #[test]
    fn test_drop_releases_registration() {
        let provider = SimulatedProvider::with_flags(wifi());
        let monitor = monitor(&provider);
        monitor.start().unwrap();
        let clone = monitor.clone();
        drop(monitor);
        assert_eq!(provider.active_registrations(), 1);
        drop(clone);
        assert_eq!(provider.active_registrations(), 0);
    }

    #[test]
    fn test_clones_are_equal() {
        let provider = SimulatedProvider::new();
        let a = monitor(&provider);
        let b = a.clone();
        let c = monitor(&provider);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_constructors() {
        assert!(ReachabilityMonitor::for_host_name("bad host").is_err());
        let monitor = ReachabilityMonitor::for_url("https://api.example.com/v1").unwrap();
        assert_eq!(monitor.host(), Some("api.example.com"));
        let monitor = ReachabilityMonitor::internet();
        assert_eq!(monitor.target(), &Target::any());
        assert_eq!(monitor.host(), None);
    }
}
