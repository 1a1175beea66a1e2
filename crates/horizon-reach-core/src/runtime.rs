//! Shared async runtime for Horizon Reach.
//!
//! Background work (name resolution, asynchronous completions) runs on one
//! lazily created, process-wide tokio runtime. The runtime lives until the
//! process exits; there is no teardown.
//!
//! This module requires the `tokio` feature:
//!
//! ```toml
//! [dependencies]
//! horizon-reach-core = { version = "1", features = ["tokio"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use horizon_reach_core::runtime::{self, RuntimeConfig};
//!
//! // Optional: configure before first use.
//! runtime::init(RuntimeConfig::default().worker_threads(2))?;
//!
//! let handle = runtime::spawn_blocking(|| 40 + 2)?;
//! # Ok::<(), horizon_reach_core::CoreError>(())
//! ```

use std::sync::OnceLock;

use parking_lot::{const_mutex, Mutex};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::error::{CoreError, Result};
use crate::logging::targets;

/// Global runtime instance.
static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Serializes runtime construction so a losing racer never builds (and then
/// drops) a second runtime.
static INIT_LOCK: Mutex<()> = const_mutex(());

/// Configuration for the shared runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of async worker threads.
    pub worker_threads: usize,
    /// Upper bound on threads in the blocking pool.
    pub max_blocking_threads: usize,
    /// Name prefix for runtime threads.
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            max_blocking_threads: 64,
            thread_name: "horizon-reach".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Set the number of async worker threads.
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count.max(1);
        self
    }

    /// Set the maximum number of blocking-pool threads.
    pub fn max_blocking_threads(mut self, count: usize) -> Self {
        self.max_blocking_threads = count.max(1);
        self
    }

    /// Set the thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Initialize the shared runtime with `config`.
///
/// If the runtime already exists the existing instance is returned and
/// `config` is ignored.
pub fn init(config: RuntimeConfig) -> Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let _guard = INIT_LOCK.lock();
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .max_blocking_threads(config.max_blocking_threads)
        .thread_name(config.thread_name.clone())
        .enable_all()
        .build()
        .map_err(CoreError::RuntimeCreation)?;

    tracing::debug!(
        target: targets::RUNTIME,
        worker_threads = config.worker_threads,
        thread_name = %config.thread_name,
        "shared runtime created"
    );

    Ok(RUNTIME.get_or_init(|| runtime))
}

/// Get the shared runtime, creating it with default settings on first use.
pub fn get() -> Result<&'static Runtime> {
    init(RuntimeConfig::default())
}

/// Run a blocking closure on the shared runtime's blocking pool.
pub fn spawn_blocking<F, R>(f: F) -> Result<JoinHandle<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    Ok(get()?.spawn_blocking(f))
}

/// Spawn a future on the shared runtime.
pub fn spawn<F>(future: F) -> Result<JoinHandle<F::Output>>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    Ok(get()?.spawn(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_is_shared() {
        let first = get().expect("runtime");
        let second = init(RuntimeConfig::default().worker_threads(8)).expect("runtime");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_spawn_blocking_runs_off_thread() {
        let caller = std::thread::current().id();
        let handle = spawn_blocking(move || std::thread::current().id() != caller).expect("spawn");
        let ran_elsewhere = get().expect("runtime").block_on(handle).expect("join");
        assert!(ran_elsewhere);
    }

    #[test]
    fn test_config_builder_clamps() {
        let config = RuntimeConfig::default()
            .worker_threads(0)
            .max_blocking_threads(0)
            .thread_name("reach-test");
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.max_blocking_threads, 1);
        assert_eq!(config.thread_name, "reach-test");
    }
}
