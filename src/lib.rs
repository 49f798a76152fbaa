//! Typed control protocol for OD-11 style networked speakers
//!
//! This library models the speaker's JSON action/response vocabulary as Rust
//! types, binds every request to the single response type it expects, and
//! correlates inbound responses with the calls waiting for them. Anything the
//! speaker pushes on its own is surfaced as an event.
//!
//! ```no_run
//! # async fn example() -> orthoplay::Result<()> {
//! use orthoplay::{create_memory_transport, Session, SessionConfig, TransportConfig};
//! use orthoplay::protocol::SetVolume;
//!
//! let (transport, _speaker) = create_memory_transport(TransportConfig::new("od11"))?;
//! let session = Session::with_transport(transport, SessionConfig::new("living-room")).await?;
//!
//! let joined = session.join().await?;
//! println!("joined {} ({} colours)", joined.mac, joined.palette.len());
//!
//! session.send(&SetVolume::new(42)).await?;
//! # Ok(())
//! # }
//! ```

mod macros;
pub(crate) use macros::{log_debug, log_trace, log_warn};

// Import all sub modules once...
mod correlator;
mod domain;
mod error;
mod session;
mod session_config;
mod transport;

pub mod protocol;

// Re-export main types
pub use correlator::{
    // ---
    Correlator,
    Delivery,
    EventStream,
    InboundEvent,
    ResponseHandle,
    DEFAULT_EVENT_CAPACITY,
};
pub use error::{OrthoError, Result};
pub use session::Session;
pub use session_config::{SessionConfig, DEFAULT_REQUEST_TIMEOUT};

pub use protocol::{
    // ---
    Action,
    ActionKind,
    AnyAction,
    CallId,
    DecodeError,
    DecodeFailure,
    ProtocolVersion,
    Request,
    Response,
    ResponseBody,
    ResponseKind,
};

pub use transport::{create_memory_transport, MemoryPeer};

// --- public re-exports
pub use domain::{
    //
    Inbox,
    Transport,
    TransportBase,
    TransportConfig,
    TransportPtr,
    DEFAULT_INBOX_CAPACITY,
};
