//! A scriptable provider for tests and demos.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::flags::ReachabilityFlags;
use super::provider::{FlagsCallback, ReachabilityProvider, Registration};
use super::target::Target;
use crate::error::ProviderError;

/// A [`ReachabilityProvider`] driven by the caller instead of the OS.
///
/// Every target sees the same simulated network. [`fire`](Self::fire)
/// delivers new flags to every live registration synchronously on the
/// calling thread, so tests control exactly when callbacks run and on which
/// thread.
///
/// Clones share state.
///
/// # Example
///
/// ```
/// use horizon_reach_net::reachability::{
///     NetworkStatus, ReachabilityFlags, ReachabilityMonitor, SimulatedProvider,
/// };
///
/// let provider = SimulatedProvider::with_flags(ReachabilityFlags::REACHABLE);
/// let monitor = ReachabilityMonitor::builder_for_host("api.example.com")?
///     .provider(provider.clone())
///     .build()?;
///
/// monitor.start()?;
/// assert_eq!(monitor.status(), NetworkStatus::ReachableViaWiFi);
///
/// provider.fire(ReachabilityFlags::empty());
/// assert_eq!(monitor.status(), NetworkStatus::NotReachable);
/// # Ok::<(), horizon_reach_net::MonitorError>(())
/// ```
#[derive(Clone, Default)]
pub struct SimulatedProvider {
    inner: Arc<SimulatedInner>,
}

#[derive(Default)]
struct SimulatedInner {
    flags: Mutex<ReachabilityFlags>,
    registrations: Mutex<BTreeMap<u64, FlagsCallback>>,
    next_id: AtomicU64,
    fail_registration: AtomicBool,
    fail_queries: AtomicBool,
    registration_count: AtomicUsize,
    query_count: AtomicUsize,
}

impl SimulatedProvider {
    /// Create a provider reporting no reachability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider reporting `flags`.
    pub fn with_flags(flags: ReachabilityFlags) -> Self {
        let provider = Self::new();
        provider.set_flags(flags);
        provider
    }

    /// Change the reported flags without notifying anyone.
    pub fn set_flags(&self, flags: ReachabilityFlags) {
        *self.inner.flags.lock() = flags;
    }

    /// The flags currently reported.
    pub fn flags(&self) -> ReachabilityFlags {
        *self.inner.flags.lock()
    }

    /// Change the reported flags and deliver them to every registration.
    ///
    /// Returns the number of callbacks invoked.
    pub fn fire(&self, flags: ReachabilityFlags) -> usize {
        self.set_flags(flags);
        self.deliver(|| Ok(flags))
    }

    /// Deliver a provider failure to every registration.
    pub fn fire_error(&self, error: ProviderError) -> usize {
        self.deliver(|| Err(error.clone()))
    }

    fn deliver(&self, result: impl Fn() -> Result<ReachabilityFlags, ProviderError>) -> usize {
        let callbacks: Vec<FlagsCallback> =
            self.inner.registrations.lock().values().cloned().collect();
        for callback in &callbacks {
            callback(result());
        }
        callbacks.len()
    }

    /// Make subsequent [`register`](ReachabilityProvider::register) calls fail.
    pub fn fail_registration(&self, fail: bool) {
        self.inner.fail_registration.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent [`query_flags`](ReachabilityProvider::query_flags) calls fail.
    pub fn fail_queries(&self, fail: bool) {
        self.inner.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Total successful registrations ever made.
    pub fn registration_count(&self) -> usize {
        self.inner.registration_count.load(Ordering::SeqCst)
    }

    /// Registrations that have not been released.
    pub fn active_registrations(&self) -> usize {
        self.inner.registrations.lock().len()
    }

    /// Total flag queries made.
    pub fn query_count(&self) -> usize {
        self.inner.query_count.load(Ordering::SeqCst)
    }
}

impl ReachabilityProvider for SimulatedProvider {
    fn query_flags(&self, _target: &Target) -> Result<ReachabilityFlags, ProviderError> {
        self.inner.query_count.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_queries.load(Ordering::SeqCst) {
            return Err(ProviderError::Io("simulated query failure".to_string()));
        }
        Ok(self.flags())
    }

    fn register(&self, _target: &Target, callback: FlagsCallback) -> Result<Registration, ProviderError> {
        if self.inner.fail_registration.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "simulated registration failure".to_string(),
            ));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.registrations.lock().insert(id, callback);
        self.inner.registration_count.fetch_add(1, Ordering::SeqCst);

        let inner = Arc::downgrade(&self.inner);
        Ok(Registration::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.registrations.lock().remove(&id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_reaches_live_registrations_only() {
        let provider = SimulatedProvider::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let registration = provider
            .register(
                &Target::any(),
                Arc::new(move |result| sink.lock().push(result)),
            )
            .unwrap();

        assert_eq!(provider.fire(ReachabilityFlags::REACHABLE), 1);
        drop(registration);
        assert_eq!(provider.fire(ReachabilityFlags::empty()), 0);

        assert_eq!(*seen.lock(), vec![Ok(ReachabilityFlags::REACHABLE)]);
        assert_eq!(provider.registration_count(), 1);
        assert_eq!(provider.active_registrations(), 0);
    }

    #[test]
    fn test_failure_switches() {
        let provider = SimulatedProvider::with_flags(ReachabilityFlags::REACHABLE);
        provider.fail_queries(true);
        assert!(provider.query_flags(&Target::any()).is_err());
        provider.fail_queries(false);
        assert_eq!(provider.query_flags(&Target::any()), Ok(ReachabilityFlags::REACHABLE));
        assert_eq!(provider.query_count(), 2);

        provider.fail_registration(true);
        assert!(provider.register(&Target::any(), Arc::new(|_| {})).is_err());
        assert_eq!(provider.registration_count(), 0);
    }
}
