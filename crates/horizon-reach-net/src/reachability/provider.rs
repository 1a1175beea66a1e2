//! The reachability-flags primitive.

use std::fmt;
use std::sync::Arc;

use super::flags::ReachabilityFlags;
use super::target::Target;
use crate::error::ProviderError;

/// Callback armed by [`ReachabilityProvider::register`].
///
/// Invoked with fresh flags whenever the provider sees a change that may
/// affect the target, or with an error if the provider lost track of the
/// network. Providers deliver serially per registration.
pub type FlagsCallback = Arc<dyn Fn(Result<ReachabilityFlags, ProviderError>) + Send + Sync>;

/// A platform source of reachability flags and change callbacks.
///
/// The monitor owns every [`Registration`] it obtains and never shares it.
pub trait ReachabilityProvider: Send + Sync + 'static {
    /// Read the current flags for `target` synchronously.
    fn query_flags(&self, target: &Target) -> Result<ReachabilityFlags, ProviderError>;

    /// Arm `callback` for changes affecting `target`.
    ///
    /// Dropping the returned registration must stop further deliveries.
    fn register(&self, target: &Target, callback: FlagsCallback) -> Result<Registration, ProviderError>;
}

/// A live callback registration.
///
/// Deregisters exactly once, when dropped or when [`cancel`](Self::cancel) is
/// called.
pub struct Registration {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Registration {
    /// Create a registration that runs `release` to deregister.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Wrap a platform handle whose `Drop` deregisters.
    pub fn from_handle<H: Send + 'static>(handle: H) -> Self {
        Self::new(move || drop(handle))
    }

    /// Deregister now.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.release.is_some())
            .finish()
    }
}
