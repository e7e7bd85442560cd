//! Latest-request-wins tokens.

use std::fmt;

/// Identifies one issued request. Tokens from the same guard increase
/// monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and remembers the most recent one.
#[derive(Debug, Default, Clone)]
pub struct RequestGuard {
    latest: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, superseding every earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

/// What happened to a completed round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was applied to the session.
    Applied,
    /// A newer request (or a state change) made the result stale; it was
    /// dropped.
    Superseded,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}
