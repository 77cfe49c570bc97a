use tokio::time::{Duration, Instant};

/// Gate in front of the transcript poll loop.
///
/// The tick loop runs at a fixed rate; this decides, per tick, whether
/// a fetch may be dispatched: only while active, and never more often
/// than the minimum interval. It deliberately does not track a fetch
/// in flight — a slow response may overlap the next dispatch, which
/// the merge engine's dedup makes idempotent.
#[derive(Debug)]
pub struct FetchScheduler {
    minimum_interval: Duration,
    last_fetch_at: Option<Instant>,
    active: bool,
}

impl FetchScheduler {
    pub fn new(minimum_interval: Duration) -> Self {
        Self {
            minimum_interval,
            last_fetch_at: None,
            active: false,
        }
    }

    /// Activates the scheduler and clears the spacing guard so the next
    /// tick fetches immediately.
    pub fn start(&mut self) {
        self.active = true;
        self.last_fetch_at = None;
    }

    /// Halts future dispatches. Retained transcript state is untouched;
    /// a later `start` resumes against the same session.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Per-tick guard. Returns true when a fetch should be dispatched
    /// now, and records the dispatch time.
    pub fn should_fetch(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        if let Some(last) = self.last_fetch_at {
            if now.duration_since(last) < self.minimum_interval {
                return false;
            }
        }
        self.last_fetch_at = Some(now);
        true
    }
}
