//! Public, transport-agnostic session configuration.
//!
//! This type contains no transport-specific concepts. Transport factories take
//! their own [`TransportConfig`](crate::TransportConfig).

use std::time::Duration;

use crate::protocol::ProtocolVersion;
use crate::DEFAULT_EVENT_CAPACITY;

/// Default deadline for [`Session::call`](crate::Session::call).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Session parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    // ---
    /// Identifier of this session, used for logging.
    pub session_id: String,

    /// How long [`Session::call`](crate::Session::call) waits for the bound
    /// response before failing with a correlation timeout.
    ///
    /// Default: 5 seconds
    pub request_timeout: Duration,

    /// Version announced by [`Session::join`](crate::Session::join).
    ///
    /// Default: 0.4
    pub protocol_version: ProtocolVersion,

    /// How many unsolicited or malformed messages are kept for
    /// [`Session::events`](crate::Session::events) before newer ones are
    /// discarded. Bounds memory when nobody reads the stream.
    ///
    /// Default: [`DEFAULT_EVENT_CAPACITY`]
    pub event_capacity: usize,
}

impl SessionConfig {
    /// Create a config with default timeout and protocol version.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            protocol_version: ProtocolVersion::CURRENT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Set the per-call response deadline.
    ///
    /// # Example
    ///
    /// ```
    /// use orthoplay::SessionConfig;
    /// use std::time::Duration;
    ///
    /// let config = SessionConfig::new("living-room")
    ///     .with_request_timeout(Duration::from_secs(2));
    /// assert_eq!(config.request_timeout, Duration::from_secs(2));
    /// ```
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the event queue bound. Clamped to at least 1.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the protocol version announced on join.
    pub fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version;
        self
    }
}
