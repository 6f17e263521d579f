//! Debugging session identity.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StackExplorerError;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one debugging session, used as the registry key.
///
/// Identities are unique within a process and render as `session-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate a fresh identity.
    pub fn new() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an identity assigned by the host.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = StackExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("session-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(SessionId)
            .ok_or_else(|| StackExplorerError::InvalidSessionId(s.into()))
    }
}
