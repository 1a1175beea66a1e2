//! Core systems for Horizon Reach.
//!
//! This crate provides the foundational pieces shared by the networking crate:
//!
//! - **Signal/Slot System**: Ordered, panic-isolated fan-out to connected slots
//! - **Logging**: `tracing` targets for filtering by subsystem
//! - **Runtime**: A lazily created, process-wide tokio runtime (`tokio` feature)
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_reach_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! let outcome = value_changed.emit(42);
//! assert_eq!(outcome.delivered, 1);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Weak Receivers
//!
//! ```
//! use std::sync::Arc;
//! use horizon_reach_core::Signal;
//!
//! struct Logger;
//!
//! let signal = Signal::<String>::new();
//! let logger = Arc::new(Logger);
//! signal.connect_weak(&logger, |_logger, line| println!("{line}"));
//!
//! // Dropping the receiver retires its connection on the next emit.
//! drop(logger);
//! let outcome = signal.emit("gone".to_string());
//! assert_eq!(outcome.pruned, 1);
//! ```

mod error;
pub mod logging;
#[cfg(feature = "tokio")]
pub mod runtime;
pub mod signal;

pub use error::{CoreError, Result};
pub use signal::{ConnectionId, EmitOutcome, Signal};
