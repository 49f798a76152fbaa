use tokio::sync::mpsc;

use crate::protocol::{DecodeError, Response};

/// An inbound message that did not resolve any pending call.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A well-formed response nobody was waiting for (device push, late reply,
    /// reply to a cancelled call).
    Unsolicited(Response),

    /// Text that could not be decoded. Reported here instead of interrupting
    /// the receive path.
    Malformed(DecodeError),
}

/// Receiving half of the event sink.
///
/// Each unsolicited or malformed message is delivered at most once. The queue
/// is bounded; events arriving while it is full are discarded.
#[derive(Debug)]
pub struct EventStream {
    // ---
    rx: mpsc::Receiver<InboundEvent>,
}

impl EventStream {
    // ---
    pub(super) fn new(rx: mpsc::Receiver<InboundEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. `None` once the correlator is gone.
    pub async fn next(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<InboundEvent> {
        self.rx.try_recv().ok()
    }
}
