//! Signal/slot system for Horizon Reach.
//!
//! This module provides a type-safe signal/slot mechanism for fanning a value
//! out to any number of observers. Signals are emitted when state changes, and
//! connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`EmitOutcome`] - What happened during one emission
//!
//! # Delivery Guarantees
//!
//! - Slots run synchronously on the emitting thread, in connection order.
//! - The connection list is snapshotted before any slot runs, so a slot may
//!   connect or disconnect (even itself) without deadlocking.
//! - A panicking slot is caught and logged; later slots still run.
//! - Receivers connected with [`Signal::connect_weak`] are held weakly and
//!   their connections are pruned once the receiver is gone.
//!
//! # Example
//!
//! ```
//! use horizon_reach_core::Signal;
//!
//! // Create a signal that passes a string argument
//! let text_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! // Emit the signal
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Disconnect when no longer needed
//! text_changed.disconnect(conn_id);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::{panic_message, targets};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// Keys are generational, so a stale ID never removes a newer connection
    /// that happens to reuse the same slot.
    pub struct ConnectionId;
}

/// Result of invoking one slot.
enum SlotState {
    /// The slot ran.
    Delivered,
    /// The slot's receiver has been dropped; the connection should go.
    Gone,
}

type Slot<Args> = Arc<dyn Fn(&Args) -> SlotState + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    /// Monotonic sequence number; emission runs slots in this order.
    seq: u64,
    /// Identity of the receiver for weak connections.
    owner: Option<usize>,
    /// The slot function to invoke.
    slot: Slot<Args>,
}

/// Summary of a single [`Signal::emit`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOutcome {
    /// Slots that ran to completion.
    pub delivered: usize,
    /// Slots that panicked. The panic was caught and logged.
    pub panicked: usize,
    /// Weak connections removed because their receiver was dropped.
    pub pruned: usize,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a reference
/// to the provided arguments.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync` and can be shared between threads. The
/// connection list is guarded by a mutex that is only held while the list is
/// mutated or snapshotted, never while a slot runs.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Source of connection sequence numbers.
    next_seq: AtomicU64,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// The signal holds the closure strongly until [`disconnect`](Self::disconnect)
    /// is called. Returns a `ConnectionId` that can be used to disconnect the
    /// slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_reach_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(
            None,
            Arc::new(move |args: &Args| {
                slot(args);
                SlotState::Delivered
            }),
        )
    }

    /// Connect a slot on behalf of a receiver that is held weakly.
    ///
    /// The slot is called with the upgraded receiver as long as it is alive.
    /// Once every strong reference to `receiver` is gone, the connection is
    /// retired on the next emission. The receiver's identity (its allocation)
    /// also keys the connection for [`disconnect_receiver`](Self::disconnect_receiver).
    pub fn connect_weak<T, F>(&self, receiver: &Arc<T>, slot: F) -> ConnectionId
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Args) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(receiver);
        self.insert(
            Some(receiver_key(receiver)),
            Arc::new(move |args: &Args| match weak.upgrade() {
                Some(receiver) => {
                    slot(&receiver, args);
                    SlotState::Delivered
                }
                None => SlotState::Gone,
            }),
        )
    }

    fn insert(&self, owner: Option<usize>, slot: Slot<Args>) -> ConnectionId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.connections
            .lock()
            .insert(Connection { seq, owner, slot })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    /// An emission already in progress on another thread may still invoke the
    /// slot once.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect every connection made through [`connect_weak`](Self::connect_weak)
    /// for `receiver`. Returns the number of connections removed.
    pub fn disconnect_receiver<T>(&self, receiver: &Arc<T>) -> usize {
        let key = receiver_key(receiver);
        let mut connections = self.connections.lock();
        let before = connections.len();
        connections.retain(|_, conn| conn.owner != Some(key));
        before - connections.len()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    ///
    /// Weak connections whose receiver is gone are counted until the next
    /// emission prunes them.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// The connection list is copied under the lock and the lock is released
    /// before the first slot runs. Each slot runs inside its own unwind
    /// boundary: a panic is logged at `error` level and counted in the
    /// returned [`EmitOutcome`], and delivery continues with the next slot.
    #[tracing::instrument(skip_all, target = "horizon_reach_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> EmitOutcome {
        let snapshot = self.snapshot();
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        let mut outcome = EmitOutcome::default();
        let mut gone = Vec::new();

        for (id, slot) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| slot(&args))) {
                Ok(SlotState::Delivered) => outcome.delivered += 1,
                Ok(SlotState::Gone) => gone.push(id),
                Err(payload) => {
                    outcome.panicked += 1;
                    tracing::error!(
                        target: targets::SIGNAL,
                        connection = ?id,
                        panic = %panic_message(payload.as_ref()),
                        "slot panicked, continuing delivery"
                    );
                }
            }
        }

        if !gone.is_empty() {
            let mut connections = self.connections.lock();
            for id in gone {
                if connections.remove(id).is_some() {
                    outcome.pruned += 1;
                }
            }
            tracing::trace!(target: targets::SIGNAL, pruned = outcome.pruned, "pruned dead receivers");
        }

        outcome
    }

    /// Copy out the current slots, ordered by connection sequence.
    fn snapshot(&self) -> Vec<(ConnectionId, Slot<Args>)> {
        let connections = self.connections.lock();
        let mut entries: Vec<_> = connections
            .iter()
            .map(|(id, conn)| (conn.seq, id, Arc::clone(&conn.slot)))
            .collect();
        drop(connections);

        entries.sort_unstable_by_key(|(seq, _, _)| *seq);
        entries.into_iter().map(|(_, id, slot)| (id, slot)).collect()
    }
}

/// Run `f` inside an unwind boundary, returning the panic message on failure.
///
/// This is the same isolation [`Signal::emit`] applies to each slot, exposed
/// for single-callback hooks that sit next to a signal.
pub fn call_isolated<R>(f: impl FnOnce() -> R) -> std::result::Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn receiver_key<T>(receiver: &Arc<T>) -> usize {
    Arc::as_ptr(receiver) as *const () as usize
}
