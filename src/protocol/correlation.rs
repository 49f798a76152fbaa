use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Application-supplied value echoed by the device in its reply.
///
/// Only `speaker_ping` / `speaker_pong` carry one today (the ping `value`).
/// It lets two outstanding calls of the same kind be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(pub i64);

impl fmt::Display for CorrelationToken {
    // ---

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CorrelationToken {
    // ---

    fn from(value: i64) -> Self {
        // ---
        Self(value)
    }
}

/// Local identity of a pending call.
///
/// Never sent on the wire; used to cancel or fail one specific call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u64);

impl CallId {
    // ---

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    // ---

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        write!(f, "call-{}", self.0)
    }
}

/// Monotonic source of [`CallId`]s, one per correlator.
#[derive(Debug, Default)]
pub(crate) struct CallIds(AtomicU64);

impl CallIds {
    // ---

    pub fn next(&self) -> CallId {
        // ---
        CallId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
