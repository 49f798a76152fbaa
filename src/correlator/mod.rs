// src/correlator/mod.rs
//! Request/response correlation.
//!
//! The [`Correlator`] binds each sent request to the single response type it
//! declares and routes every inbound message either to the call waiting for
//! it or to the event sink.
//!
//! # Matching
//!
//! Pending calls are keyed by the response kind they expect. Within a kind,
//! a response carrying a correlation token (a pong's echoed `value`) resolves
//! the call with that token; otherwise the oldest call of that kind wins.
//! Nothing is ordered across kinds.
//!
//! # Concurrency
//!
//! The pending table is the only shared mutable state. It sits behind one
//! mutex and every insert/resolve/remove takes it, so a send registering a call
//! and a receive resolving one cannot interleave. Resolution happens after the
//! call has been removed under the lock, so a call is resolved at most once.
//!
//! # Timing
//!
//! The correlator never decides when a call has waited long enough. Callers
//! (see [`Session`](crate::Session)) own deadlines and report them through
//! [`Correlator::expire`], [`Correlator::cancel`] or [`Correlator::fail`].

mod events;
mod handle;
mod pending;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::protocol::{self, CallId, CallIds, Request, ResponseBody};
use crate::{log_debug, log_trace, log_warn, OrthoError};

use pending::{PendingCall, PendingCalls, TypedSlot};

pub use events::{EventStream, InboundEvent};
pub use handle::ResponseHandle;

/// Acquire a mutex guard, intentionally ignoring poisoning.
///
/// The table has no invariants spanning more than one entry; the worst outcome
/// of a poisoned lock is one unmatched response.
pub(crate) fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // ---
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Default bound of the event queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// It resolved the pending call with this id.
    Resolved(CallId),
    /// It was decoded but matched no pending call; sent to the event sink.
    Unsolicited,
    /// It failed to decode; reported to the event sink.
    Malformed,
}

/// Pending-call table plus event sink.
///
/// Cheap to clone (internally `Arc`-backed).
#[derive(Clone)]
pub struct Correlator {
    inner: Arc<Inner>,
}

struct Inner {
    // ---
    pending: Mutex<PendingCalls>,
    ids: CallIds,
    events: mpsc::Sender<InboundEvent>,
}

impl Inner {
    // ---
    fn withdraw(&self, id: CallId) -> Option<PendingCall> {
        // ---
        let call = lock_ignore_poison(&self.pending).remove(id);
        if call.is_some() {
            log_debug!("{id}: withdrawn");
        }
        call
    }

    fn emit(&self, event: InboundEvent) {
        // ---
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_event)) => {
                log_warn!("event stream full, discarding {_event:?}");
            }
            Err(TrySendError::Closed(_)) => {
                log_debug!("event stream dropped, discarding inbound event");
            }
        }
    }
}

impl Correlator {
    // ---

    /// Create a correlator and the event stream it reports to, holding up to
    /// [`DEFAULT_EVENT_CAPACITY`] unread events.
    pub fn new() -> (Self, EventStream) {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Like [`new`](Self::new) with an explicit event queue bound.
    ///
    /// Once `capacity` events are waiting unread, further unsolicited or
    /// malformed messages are logged and discarded.
    pub fn with_event_capacity(capacity: usize) -> (Self, EventStream) {
        // ---
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let correlator = Self {
            inner: Arc::new(Inner {
                pending: Mutex::new(PendingCalls::new()),
                ids: CallIds::default(),
                events: tx,
            }),
        };

        (correlator, EventStream::new(rx))
    }

    /// Register a pending call for `request`.
    ///
    /// The returned handle resolves to `Q::Response` and nothing else. Register
    /// before handing the encoded request to the transport so that a fast reply
    /// cannot overtake the registration.
    pub fn register<Q: Request>(&self, request: &Q) -> ResponseHandle<Q::Response> {
        // ---
        let id = self.inner.ids.next();
        let token = request.correlation_token();
        let (slot, rx) = TypedSlot::<Q::Response>::new();

        lock_ignore_poison(&self.inner.pending).register(PendingCall {
            id,
            expected: Q::Response::KIND,
            token,
            slot: Box::new(slot),
        });

        log_debug!(
            "{id}: `{}` awaits `{}` (token {token:?})",
            Q::KIND,
            Q::Response::KIND
        );

        ResponseHandle::new(id, rx, Arc::downgrade(&self.inner))
    }

    /// Feed one inbound message.
    ///
    /// Never fails: undecodable text and unmatched responses are both reported
    /// to the event stream, and the next message is processed normally.
    pub fn receive(&self, raw: &str) -> Delivery {
        // ---
        log_trace!("inbound: {raw}");

        let response = match protocol::decode(raw) {
            Ok(response) => response,
            Err(err) => {
                log_warn!("dropping inbound message: {err}");
                self.inner.emit(InboundEvent::Malformed(err));
                return Delivery::Malformed;
            }
        };

        let call = lock_ignore_poison(&self.inner.pending)
            .take_match(response.kind(), response.correlation_token());

        let response = match call {
            Some(call) => {
                let id = call.id;
                match call.slot.resolve(response) {
                    Ok(()) => {
                        log_debug!("{id}: resolved");
                        return Delivery::Resolved(id);
                    }
                    Err(response) => response,
                }
            }
            None => response,
        };

        log_debug!("unsolicited `{}`", response.kind());
        self.inner.emit(InboundEvent::Unsolicited(response));
        Delivery::Unsolicited
    }

    /// Resolve a pending call with a failure.
    ///
    /// Returns `false` if the call was already resolved, withdrawn or failed.
    pub fn fail(&self, id: CallId, error: OrthoError) -> bool {
        // ---
        match self.inner.withdraw(id) {
            Some(call) => {
                log_debug!("{id}: failed: {error}");
                call.slot.fail(error);
                true
            }
            None => false,
        }
    }

    /// Fail a pending call with [`OrthoError::CorrelationTimeout`].
    pub fn expire(&self, id: CallId) -> bool {
        // ---
        match self.inner.withdraw(id) {
            Some(call) => {
                log_debug!("{id}: deadline elapsed");
                call.slot.fail(OrthoError::CorrelationTimeout {
                    expected: call.expected.as_str(),
                });
                true
            }
            None => false,
        }
    }

    /// Fail a pending call with [`OrthoError::Cancelled`].
    pub fn cancel(&self, id: CallId) -> bool {
        // ---
        match self.inner.withdraw(id) {
            Some(call) => {
                call.slot.fail(OrthoError::Cancelled {
                    expected: call.expected.as_str(),
                });
                true
            }
            None => false,
        }
    }

    /// Fail every pending call with `error` (transport teardown).
    ///
    /// Returns how many calls were failed.
    pub fn fail_all(&self, error: OrthoError) -> usize {
        // ---
        let calls = lock_ignore_poison(&self.inner.pending).drain();
        let count = calls.len();

        for call in calls {
            call.slot.fail(error.clone());
        }

        if count > 0 {
            log_debug!("failed {count} pending call(s): {error}");
        }
        count
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        // ---
        lock_ignore_poison(&self.inner.pending).len()
    }
}
