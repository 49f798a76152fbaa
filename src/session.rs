// src/session.rs
//! Speaker session.
//!
//! A [`Session`] owns one transport link and the [`Correlator`] for it. It
//! encodes actions onto the link, and runs a background receive loop that
//! feeds every inbound frame to the correlator.
//!
//! # Deadlines
//!
//! The correlator never times calls out by itself. [`Session::call`] applies
//! the configured `request_timeout`; [`Session::request`] hands back the raw
//! [`ResponseHandle`] for callers that manage their own deadlines.
//!
//! # Teardown
//!
//! When the link ends, from either side, every call still pending is failed
//! with [`OrthoError::Transport`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::correlator::lock_ignore_poison;
use crate::protocol::{encode, Action, GlobalJoin, GlobalJoined, Request, SpeakerPing};
use crate::{
    // ---
    log_debug,
    log_warn,
    Correlator,
    EventStream,
    OrthoError,
    ResponseHandle,
    Result,
    SessionConfig,
    TransportPtr,
};

/// Running session with one speaker.
///
/// Cheap to clone (internally `Arc`-backed).
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    // ---
    transport: TransportPtr,
    correlator: Correlator,
    config: SessionConfig,
    events: Mutex<Option<EventStream>>,
    last_ping: AtomicI64,

    /// Receive loop handle, kept so the task is owned by the session.
    _rx_task: JoinHandle<()>,
}

impl Session {
    // ---
    /// Create a session over an already connected transport.
    ///
    /// # Errors
    ///
    /// Returns `OrthoError::Transport` if the transport refuses the inbound
    /// subscription.
    pub async fn with_transport(transport: TransportPtr, config: SessionConfig) -> Result<Self> {
        // ---
        let mut inbox = transport.subscribe().await?;
        let (correlator, events) = Correlator::with_event_capacity(config.event_capacity);

        let rx_correlator = correlator.clone();
        let session_id = config.session_id.clone();

        let rx_task = tokio::spawn(async move {
            // ---
            while let Some(frame) = inbox.frames.recv().await {
                rx_correlator.receive(&frame);
            }

            log_debug!("{session_id}: link closed, receive loop exiting");
            rx_correlator.fail_all(OrthoError::Transport(format!(
                "{session_id}: link closed"
            )));
        });

        log_debug!(
            "{}: session started on transport `{}`",
            config.session_id,
            transport.transport_id()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                correlator,
                config,
                events: Mutex::new(Some(events)),
                last_ping: AtomicI64::new(0),
                _rx_task: rx_task,
            }),
        })
    }

    /// Send an action that expects no particular response.
    ///
    /// # Errors
    ///
    /// - `OrthoError::Encoding` if the action cannot be encoded
    /// - `OrthoError::Transport` if the link refuses the frame
    pub async fn send<A: Action>(&self, action: &A) -> Result<()> {
        // ---
        let frame = encode(action)?;
        log_debug!("{}: send `{}`", self.session_id(), A::KIND);
        self.inner.transport.send(frame).await
    }

    /// Send a request and return the handle for its bound response.
    ///
    /// The pending call is registered before the frame leaves, so even an
    /// immediate reply is matched. No deadline is applied.
    ///
    /// # Errors
    ///
    /// - `OrthoError::Encoding` if the request cannot be encoded
    /// - `OrthoError::Transport` if the link refuses the frame; the pending
    ///   call is withdrawn in that case
    pub async fn request<Q: Request>(&self, request: &Q) -> Result<ResponseHandle<Q::Response>> {
        // ---
        let frame = encode(request)?;
        let handle = self.inner.correlator.register(request);

        // Dropping `handle` on failure withdraws the call.
        self.inner.transport.send(frame).await?;
        Ok(handle)
    }

    /// Send a request and wait for its bound response, up to the configured
    /// `request_timeout`.
    ///
    /// # Errors
    ///
    /// - `OrthoError::CorrelationTimeout` if nothing matched in time
    /// - `OrthoError::Transport` if the send failed or the link closed while
    ///   waiting
    /// - `OrthoError::Encoding` if the request cannot be encoded
    pub async fn call<Q: Request>(&self, request: &Q) -> Result<Q::Response> {
        self.call_with_timeout(request, self.inner.config.request_timeout)
            .await
    }

    /// Like [`call`](Self::call) with an explicit deadline.
    pub async fn call_with_timeout<Q: Request>(
        &self,
        request: &Q,
        timeout: Duration,
    ) -> Result<Q::Response> {
        // ---
        let mut handle = self.request(request).await?;

        match time::timeout(timeout, &mut handle).await {
            Ok(outcome) => outcome,
            Err(_) => {
                // A response that slipped in before the call was expired
                // still wins; otherwise the handle yields the timeout.
                self.inner.correlator.expire(handle.id());
                handle.await
            }
        }
    }

    /// Announce this client and wait for the speaker's `global_joined`.
    pub async fn join(&self) -> Result<GlobalJoined> {
        // ---
        let version = self.inner.config.protocol_version;
        let joined = self.call(&GlobalJoin::new(version)).await?;

        let speaker_version = (joined.protocol_major_version, joined.protocol_minor_version);
        if speaker_version != (version.major, version.minor) {
            log_warn!(
                "{}: speaker speaks protocol {}.{}, announced {version}",
                self.session_id(),
                speaker_version.0,
                speaker_version.1
            );
        }

        log_debug!("{}: joined speaker {}", self.session_id(), joined.mac);
        Ok(joined)
    }

    /// Round-trip a `speaker_ping` and return the measured latency.
    ///
    /// Each ping carries a fresh value, so concurrent pings are matched to
    /// their own pongs.
    pub async fn ping(&self) -> Result<Duration> {
        // ---
        let value = self.inner.last_ping.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();

        let pong = self.call(&SpeakerPing::new(value)).await?;
        debug_assert_eq!(pong.value, value);

        Ok(started.elapsed())
    }

    /// Take the stream of unsolicited and malformed inbound messages.
    ///
    /// Until taken and read, at most `event_capacity` events are held; later
    /// ones are discarded. Returns `None` after the first call.
    pub fn events(&self) -> Option<EventStream> {
        lock_ignore_poison(&self.inner.events).take()
    }

    /// The correlator serving this session.
    pub fn correlator(&self) -> &Correlator {
        &self.inner.correlator
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.inner.correlator.pending_count()
    }

    pub fn session_id(&self) -> &str {
        &self.inner.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Close the link and fail every pending call.
    pub async fn close(&self) -> Result<()> {
        // ---
        log_debug!("{}: closing session", self.session_id());

        let closed = self.inner.transport.close().await;
        self.inner.correlator.fail_all(OrthoError::Transport(format!(
            "{}: session closed",
            self.session_id()
        )));
        closed
    }
}
