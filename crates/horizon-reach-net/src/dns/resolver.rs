//! Address resolver implementation.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use horizon_reach_core::logging::targets;
use horizon_reach_core::runtime;
use horizon_reach_core::signal::call_isolated;

use crate::dns::config::ResolverConfig;
use crate::dns::lookup::{NameLookup, SystemLookup};
use crate::error::ResolveError;

/// Resolves host names to addresses with a hard deadline.
///
/// The resolver wraps a [`NameLookup`] primitive (the OS resolver by default)
/// and offers three ways to call it:
///
/// - [`resolve_sync`](Self::resolve_sync) blocks the caller for at most the
///   given timeout.
/// - [`resolve_async`](Self::resolve_async) returns immediately and invokes a
///   completion exactly once on a background thread.
/// - [`resolve`](Self::resolve) is the `async` form for tokio callers.
///
/// None of them can be cancelled mid-flight. When the deadline passes the
/// caller gets [`ResolveError::Timeout`] while the primitive finishes in the
/// background and its answer is discarded.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use horizon_reach_net::dns::AddressResolver;
///
/// let resolver = AddressResolver::system();
///
/// // Blocking, bounded by the timeout
/// let addresses = resolver.resolve_sync("example.com", Duration::from_secs(1))?;
///
/// // Background, completion runs on a worker thread
/// resolver.resolve_async("example.com", |result| match result {
///     Ok(addresses) => println!("Resolved: {:?}", addresses),
///     Err(e) => eprintln!("Failed: {}", e),
/// });
/// ```
#[derive(Clone)]
pub struct AddressResolver {
    config: ResolverConfig,
    lookup: Arc<dyn NameLookup>,
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::system()
    }
}

impl AddressResolver {
    /// Create a resolver backed by the OS resolver.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_lookup(config, SystemLookup)
    }

    /// Create a resolver with default configuration backed by the OS resolver.
    pub fn system() -> Self {
        Self::new(ResolverConfig::system())
    }

    /// Create a resolver backed by a custom primitive.
    pub fn with_lookup(config: ResolverConfig, lookup: impl NameLookup) -> Self {
        Self {
            config,
            lookup: Arc::new(lookup),
        }
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `host_name`, blocking for at most `timeout`.
    ///
    /// An empty host name fails with [`ResolveError::InvalidArgument`]
    /// without invoking the primitive.
    pub fn resolve_sync(&self, host_name: &str, timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
        validate_host_name(host_name)?;

        let (tx, rx) = crossbeam_channel::bounded(1);
        let lookup = Arc::clone(&self.lookup);
        let host = host_name.to_string();
        let started = Instant::now();

        runtime::spawn_blocking(move || {
            // The receiver is gone when the caller already timed out.
            let _ = tx.send(isolated_lookup(&*lookup, &host, timeout));
        })?;

        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result.map(|addresses| self.config.ip_strategy.apply(addresses)),
            Err(RecvTimeoutError::Timeout) => Err(ResolveError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ResolveError::NotFound(format!(
                "{host_name}: lookup aborted"
            ))),
        };

        log_outcome(host_name, started, &result);
        result
    }

    /// Resolve `host_name` on a background thread using the configured timeout.
    ///
    /// `completion` is invoked exactly once with either the addresses or the
    /// error, always on a thread other than the caller's, even for errors
    /// that are detected up front.
    pub fn resolve_async<F>(&self, host_name: &str, completion: F)
    where
        F: FnOnce(Result<Vec<IpAddr>, ResolveError>) + Send + 'static,
    {
        let resolver = self.clone();
        let host = host_name.to_string();
        let timeout = self.config.timeout;

        match runtime::get() {
            Ok(rt) => {
                // One blocking task for the lookup; the deadline is a timer on
                // the async task, so a busy pool never turns into a timeout.
                rt.spawn(async move {
                    let result = resolver.resolve_within(&host, timeout).await;
                    if let Err(join_error) = tokio::task::spawn_blocking(move || completion(result)).await {
                        tracing::error!(target: targets::DNS, host = %host, error = %join_error, "resolve completion panicked");
                    }
                });
            }
            Err(err) => {
                // resolve_sync would report the same runtime failure.
                tracing::warn!(target: targets::DNS, error = %err, "runtime unavailable, resolving on a dedicated thread");
                std::thread::spawn(move || completion(resolver.resolve_sync(&host, timeout)));
            }
        }
    }

    /// Resolve `host_name` from async code using the configured timeout.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn resolve(&self, host_name: &str) -> Result<Vec<IpAddr>, ResolveError> {
        self.resolve_within(host_name, self.config.timeout).await
    }

    async fn resolve_within(&self, host_name: &str, timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
        validate_host_name(host_name)?;

        let lookup = Arc::clone(&self.lookup);
        let host = host_name.to_string();
        let started = Instant::now();

        let task = tokio::task::spawn_blocking(move || isolated_lookup(&*lookup, &host, timeout));
        let result = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result.map(|addresses| self.config.ip_strategy.apply(addresses)),
            Ok(Err(join_error)) => Err(ResolveError::NotFound(format!(
                "{host_name}: lookup aborted ({join_error})"
            ))),
            Err(_) => Err(ResolveError::Timeout(timeout)),
        };

        log_outcome(host_name, started, &result);
        result
    }
}

/// Run the primitive, turning a panic into a lookup failure.
fn isolated_lookup(lookup: &dyn NameLookup, host: &str, timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
    call_isolated(|| lookup.lookup(host, timeout)).unwrap_or_else(|panic| {
        tracing::error!(target: targets::DNS, host = %host, panic = %panic, "name lookup panicked");
        Err(ResolveError::NotFound(format!("{host}: lookup aborted")))
    })
}

/// Reject host names the resolver must never be asked about.
pub(crate) fn validate_host_name(host_name: &str) -> Result<(), ResolveError> {
    if host_name.trim().is_empty() {
        return Err(ResolveError::InvalidArgument("host name is empty".to_string()));
    }
    if host_name.contains('\0') {
        return Err(ResolveError::InvalidArgument(
            "host name contains a NUL byte".to_string(),
        ));
    }
    Ok(())
}

fn log_outcome(host_name: &str, started: Instant, result: &Result<Vec<IpAddr>, ResolveError>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(addresses) => tracing::debug!(
            target: targets::DNS,
            host = host_name,
            count = addresses.len(),
            elapsed_ms,
            "resolved"
        ),
        Err(err) => tracing::debug!(
            target: targets::DNS,
            host = host_name,
            error = %err,
            elapsed_ms,
            "resolution failed"
        ),
    }
}
