//! In-memory transport implementation.
//!
//! This module provides a pure in-process implementation of the domain-level
//! `Transport` trait: a link whose far end is a [`MemoryPeer`] standing in
//! for the speaker. It is intended for tests, demos and as the reference for
//! transport semantics.
//!
//! ## Reference Semantics
//!
//! - Once `subscribe()` returns, every frame the peer pushes afterwards is
//!   delivered to the returned inbox, in push order.
//! - Frames sent by the session reach the peer in send order.
//! - Closing either end ends every inbox and makes later sends fail.
//!
//! ## Non-Goals
//!
//! This transport does not emulate websocket framing, reconnects or partial
//! writes. It exists to provide a deterministic baseline against which the
//! correlation layer can be validated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::protocol::{decode_action, encode_response, AnyAction, Response};
use crate::{
    // ---
    log_debug,
    Inbox,
    OrthoError,
    Result,
    Transport,
    TransportBase,
    TransportConfig,
    TransportPtr,
};

/// State shared by both ends of one in-memory link.
struct MemoryLink {
    // ---
    transport_id: String,
    subscribers: RwLock<Vec<mpsc::Sender<String>>>,
    closed: AtomicBool,
}

impl MemoryLink {
    // ---
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn closed_error(&self) -> OrthoError {
        OrthoError::Transport(format!("{}: link closed", self.transport_id))
    }

    /// Deliver one frame to every subscriber.
    async fn deliver(&self, frame: String) -> Result<()> {
        // ---
        if self.is_closed() {
            return Err(self.closed_error());
        }

        let subs = self.subscribers.read().await;
        for sender in subs.iter() {
            // A closed channel means the inbox was dropped.
            if sender.send(frame.clone()).await.is_err() {
                log_debug!("{}: inbox dropped, frame discarded", self.transport_id);
            }
        }

        Ok(())
    }

    async fn subscribe(&self, capacity: usize) -> Result<Inbox> {
        // ---
        if self.is_closed() {
            return Err(self.closed_error());
        }

        log_debug!("{}: subscribe", self.transport_id);

        let (tx, rx) = mpsc::channel(capacity);
        self.subscribers.write().await.push(tx);

        Ok(Inbox { frames: rx })
    }

    async fn close(&self) {
        // ---
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        log_debug!("{}: closing link...", self.transport_id);
        self.subscribers.write().await.clear();
    }
}

/// Session side of an in-memory link.
struct MemoryTransport {
    // ---
    base: TransportBase,
    link: Arc<MemoryLink>,
    outbound: RwLock<Option<mpsc::Sender<String>>>,
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    // ---
    fn base(&self) -> &TransportBase {
        &self.base
    }

    async fn send(&self, frame: String) -> Result<()> {
        // ---
        if self.link.is_closed() {
            return Err(self.link.closed_error());
        }

        let outbound = self
            .outbound
            .read()
            .await
            .clone()
            .ok_or_else(|| self.link.closed_error())?;

        outbound.send(frame).await.map_err(|_| {
            OrthoError::Transport(format!("{}: peer dropped", self.transport_id()))
        })
    }

    async fn subscribe(&self) -> Result<Inbox> {
        self.link.subscribe(self.base.inbox_capacity).await
    }

    /// Close the link.
    ///
    /// Ends every inbox and lets the peer observe end of stream once it has
    /// drained the frames already sent.
    async fn close(&self) -> Result<()> {
        // ---
        self.outbound.write().await.take();
        self.link.close().await;
        Ok(())
    }
}

/// Device end of an in-memory link.
///
/// Reads what the session sends and pushes responses back, the way a speaker
/// would over its websocket.
pub struct MemoryPeer {
    // ---
    link: Arc<MemoryLink>,
    inbound: mpsc::Receiver<String>,
}

impl MemoryPeer {
    // ---

    /// Next raw frame sent by the session. `None` once the session side closed
    /// and every queued frame has been read.
    pub async fn recv_raw(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Next frame sent by the session, decoded as an action.
    ///
    /// # Errors
    ///
    /// - `OrthoError::Transport` if the session side closed the link
    /// - `OrthoError::Decoding` if the frame is not a known action
    pub async fn next_action(&mut self) -> Result<AnyAction> {
        // ---
        let raw = self
            .recv_raw()
            .await
            .ok_or_else(|| self.link.closed_error())?;

        Ok(decode_action(&raw)?)
    }

    /// Push a raw text frame to the session, verbatim.
    pub async fn push(&self, frame: impl Into<String>) -> Result<()> {
        self.link.deliver(frame.into()).await
    }

    /// Encode and push a response to the session.
    pub async fn push_response(&self, response: impl Into<Response>) -> Result<()> {
        // ---
        let frame = encode_response(&response.into())?;
        self.push(frame).await
    }

    /// Close the link from the device end.
    pub async fn close(&self) {
        self.link.close().await;
    }

    /// Whether either end has closed the link.
    pub fn is_closed(&self) -> bool {
        self.link.is_closed()
    }
}

/// Create a connected in-memory link.
///
/// Returns the session side as a [`TransportPtr`] and the device side as a
/// [`MemoryPeer`].
///
/// # Errors
///
/// Currently infallible; always returns `Ok`.
pub fn create_memory_transport(config: TransportConfig) -> Result<(TransportPtr, MemoryPeer)> {
    // ---
    log_debug!("{}: create memory transport", config.transport_id);

    let base = TransportBase::from(&config);
    let (tx, rx) = mpsc::channel(base.inbox_capacity);

    let link = Arc::new(MemoryLink {
        transport_id: config.transport_id,
        subscribers: RwLock::new(Vec::new()),
        closed: AtomicBool::new(false),
    });

    let transport = MemoryTransport {
        base,
        link: link.clone(),
        outbound: RwLock::new(Some(tx)),
    };

    let peer = MemoryPeer { link, inbound: rx };

    Ok((Arc::new(transport), peer))
}
