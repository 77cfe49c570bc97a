use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Native meeting identifier, e.g. `abc-defg-hij` for Google Meet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingId(String);

impl MeetingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extracts the meeting code from a meeting page URL.
    ///
    /// Accepts anything containing `meet.google.com/<code>`; the code
    /// runs until the first character outside `[a-z0-9-]`.
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url.split("meet.google.com/").nth(1)?;
        let code: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if code.is_empty() {
            None
        } else {
            Some(Self(code.to_ascii_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-session context shared between the poll loop and its spawned
/// fetch tasks.
///
/// The generation counter is the staleness token: a fetch captures it
/// at dispatch, and its response is discarded if the counter moved
/// (session reset, language change) while the request was in flight.
#[derive(Debug)]
pub struct SessionContext {
    meeting_id: MeetingId,
    generation: AtomicU64,
}

impl SessionContext {
    pub fn new(meeting_id: MeetingId) -> Self {
        Self {
            meeting_id,
            generation: AtomicU64::new(0),
        }
    }

    pub fn meeting_id(&self) -> &MeetingId {
        &self.meeting_id
    }

    /// Current generation token.
    pub fn token(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Invalidates every in-flight fetch dispatched before this call.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}
