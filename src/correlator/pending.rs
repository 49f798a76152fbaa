use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

use crate::protocol::{CallId, CorrelationToken, Response, ResponseBody, ResponseKind};
use crate::{OrthoError, Result};

/// Typed completion slot of one pending call.
///
/// The slot is created with the request's associated response type, so the
/// table itself can stay untyped while each handle only ever sees its own
/// response shape.
pub(super) trait PendingSlot: Send {
    /// Deliver a response. Returns it unchanged if nobody is waiting anymore.
    fn resolve(self: Box<Self>, response: Response) -> std::result::Result<(), Response>;

    /// Deliver a failure. A no-op if nobody is waiting anymore.
    fn fail(self: Box<Self>, error: OrthoError);
}

pub(super) struct TypedSlot<R> {
    tx: oneshot::Sender<Result<R>>,
}

impl<R: ResponseBody> TypedSlot<R> {
    // ---
    pub fn new() -> (Self, oneshot::Receiver<Result<R>>) {
        // ---
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }
}

impl<R: ResponseBody> PendingSlot for TypedSlot<R> {
    // ---
    fn resolve(self: Box<Self>, response: Response) -> std::result::Result<(), Response> {
        // ---
        if self.tx.is_closed() {
            return Err(response);
        }

        let outcome = R::try_from(response).map_err(|other| OrthoError::UnexpectedResponse {
            expected: R::KIND.as_str(),
            received: other.kind().as_str(),
        });

        // Receiver may be dropped concurrently; the call is gone either way.
        let _ = self.tx.send(outcome);
        Ok(())
    }

    fn fail(self: Box<Self>, error: OrthoError) {
        // ---
        let _ = self.tx.send(Err(error));
    }
}

/// One outstanding request awaiting its response.
pub(super) struct PendingCall {
    pub id: CallId,
    pub expected: ResponseKind,
    pub token: Option<CorrelationToken>,
    pub slot: Box<dyn PendingSlot>,
}

/// Tracks pending calls waiting for responses
///
/// Calls are grouped by the response kind they expect and kept in send order
/// within each group. Lookup prefers an exact correlation-token match and
/// falls back to the oldest call of that kind.
pub(super) struct PendingCalls {
    // ---
    calls: HashMap<ResponseKind, VecDeque<PendingCall>>,
}

impl PendingCalls {
    // ---

    /// Create a new empty pending call table
    pub fn new() -> Self {
        // ---
        Self {
            calls: HashMap::new(),
        }
    }

    /// Register a new pending call at the back of its kind's queue
    pub fn register(&mut self, call: PendingCall) {
        // ---
        self.calls.entry(call.expected).or_default().push_back(call);
    }

    /// Remove and return the call an inbound response of `kind` should resolve
    ///
    /// - a response carrying a token matches the oldest call with that token,
    ///   otherwise the oldest call that carries no token;
    /// - a response without a token matches the oldest call of its kind.
    pub fn take_match(
        &mut self,
        kind: ResponseKind,
        token: Option<CorrelationToken>,
    ) -> Option<PendingCall> {
        // ---
        let queue = self.calls.get_mut(&kind)?;

        let position = match token {
            Some(token) => queue
                .iter()
                .position(|call| call.token == Some(token))
                .or_else(|| queue.iter().position(|call| call.token.is_none())),
            None => (!queue.is_empty()).then_some(0),
        }?;

        let call = queue.remove(position);
        if queue.is_empty() {
            self.calls.remove(&kind);
        }
        call
    }

    /// Remove a pending call without delivering anything
    ///
    /// Used for cancellation, timeouts and dropped handles.
    pub fn remove(&mut self, id: CallId) -> Option<PendingCall> {
        // ---
        let (kind, position) = self.calls.iter().find_map(|(kind, queue)| {
            queue
                .iter()
                .position(|call| call.id == id)
                .map(|position| (*kind, position))
        })?;

        let queue = self.calls.get_mut(&kind)?;
        let call = queue.remove(position);
        if queue.is_empty() {
            self.calls.remove(&kind);
        }
        call
    }

    /// Remove every pending call, oldest first within each kind
    pub fn drain(&mut self) -> Vec<PendingCall> {
        // ---
        self.calls.drain().flat_map(|(_, queue)| queue).collect()
    }

    /// Get the number of pending calls
    pub fn len(&self) -> usize {
        // ---
        self.calls.values().map(VecDeque::len).sum()
    }
}
