// src/domain/transport.rs

//! Transport domain abstractions.
//!
//! A speaker link is a single bidirectional stream of text frames (a
//! websocket in practice). Each frame carries exactly one JSON object: an
//! action on the way out, a response on the way in.
//!
//! The transport layer is responsible only for moving those frames. It does
//! not parse them; correlation, decoding and deadlines are handled by
//! [`Session`](crate::Session) and [`Correlator`](crate::Correlator).
//!
//! Concrete implementations of this interface live under `src/transport/`.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::Result;

/// Default capacity of an inbound frame queue.
pub const DEFAULT_INBOX_CAPACITY: usize = 16;

/// Shared base state for all transport implementations.
///
/// Each concrete transport embeds this as a field named `base`:
///
/// ```ignore
/// struct WebSocketTransport {
///     base: TransportBase,
///     // ... socket specific fields
/// }
///
/// impl Transport for WebSocketTransport {
///     fn base(&self) -> &TransportBase { &self.base }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TransportBase {
    /// Identifier of this link, used for logging.
    pub transport_id: String,
    /// Capacity of each inbound frame queue handed out by `subscribe()`.
    pub inbox_capacity: usize,
}

impl TransportBase {
    /// Create a new TransportBase.
    pub fn new(transport_id: impl Into<String>, inbox_capacity: usize) -> Self {
        Self {
            transport_id: transport_id.into(),
            inbox_capacity: inbox_capacity.max(1),
        }
    }
}

impl From<&TransportConfig> for TransportBase {
    fn from(config: &TransportConfig) -> Self {
        // ---
        Self::new(config.transport_id.clone(), config.inbox_capacity)
    }
}

/// Configuration for creating a transport instance.
///
/// Passed to transport factory functions (`create_*_transport()`).
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Identifier of this link, used for logging.
    pub transport_id: String,
    /// Capacity of each inbound frame queue. Clamped to at least 1.
    pub inbox_capacity: usize,
}

impl TransportConfig {
    /// Configuration with the default inbox capacity.
    pub fn new(transport_id: impl Into<String>) -> Self {
        Self {
            transport_id: transport_id.into(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }

    /// Set the inbound queue capacity.
    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity;
        self
    }
}

/// Receiving side of a link, returned from a successful `subscribe()`.
///
/// `frames` yields `None` once the link is closed from either end.
pub struct Inbox {
    // ---
    /// Inbound text frames in arrival order.
    pub frames: mpsc::Receiver<String>,
}

/// Transport abstraction.
///
/// Implementations must ensure that:
/// - Once `subscribe()` returns, every frame received afterwards is delivered
///   to the returned inbox, in arrival order.
/// - `send()` fails with [`OrthoError::Transport`](crate::OrthoError::Transport)
///   once the link is closed.
/// - Closing the link ends every inbox handed out by `subscribe()`.
///
/// The in-memory transport serves as the reference implementation of these
/// semantics.
///
/// # Notes
///
/// This trait uses `async_trait`; the expanded documentation may show explicit
/// lifetimes and a boxed `Future`. Consumers should treat the methods as normal
/// `async fn`s.
#[async_trait]
pub trait Transport: Send + Sync {
    // ---
    /// Returns a reference to the shared base state.
    fn base(&self) -> &TransportBase;

    /// Returns the transport_id of the transport.
    ///
    /// Default implementation delegates to `base()`.
    fn transport_id(&self) -> &str {
        &self.base().transport_id
    }

    /// Send one text frame to the device.
    async fn send(&self, frame: String) -> Result<()>;

    /// Start receiving inbound frames.
    async fn subscribe(&self) -> Result<Inbox>;

    /// Close the link and release any associated resources.
    async fn close(&self) -> Result<()>;
}

/// Shared transport pointer.
///
/// `.clone()` only increments a reference count; all clones share one link.
pub type TransportPtr = Arc<dyn Transport>;
