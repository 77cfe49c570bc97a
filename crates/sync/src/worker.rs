use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::SourceError;
use crate::host::{HostChannel, TranscriptSource};
use crate::merge::reconcile;
use crate::scheduler::FetchScheduler;
use crate::segment::Segment;
use crate::session::{MeetingId, SessionContext};
use crate::sink::RenderSink;
use crate::state::TranscriptState;
use crate::supervisor::LivenessSupervisor;
use crate::TranscriptUpdate;

/// Per-meeting synchronization worker.
///
/// Runs a fixed-rate tick loop; each due tick spawns a fetch task so a
/// slow response never delays the next tick. Overlapping responses are
/// merged idempotently; responses from before a session reset are
/// discarded via the session generation token. The render sink only
/// ever sees fully reconciled snapshots because merge and notification
/// happen under the state lock.
pub struct SyncWorker {
    session: SessionContext,
    config: SyncConfig,
    source: Arc<dyn TranscriptSource>,
    sink: Arc<dyn RenderSink>,
    scheduler: Mutex<FetchScheduler>,
    state: Mutex<TranscriptState>,
    supervisor: LivenessSupervisor,
}

impl SyncWorker {
    pub fn new(
        meeting_id: MeetingId,
        source: Arc<dyn TranscriptSource>,
        channel: Arc<dyn HostChannel>,
        sink: Arc<dyn RenderSink>,
        config: SyncConfig,
    ) -> Arc<Self> {
        let spacing = Duration::from_millis(config.min_fetch_spacing_ms);
        let max_retained = config.max_retained_segments;
        Arc::new(Self {
            session: SessionContext::new(meeting_id),
            config,
            source,
            sink,
            scheduler: Mutex::new(FetchScheduler::new(spacing)),
            state: Mutex::new(TranscriptState::new(max_retained)),
            supervisor: LivenessSupervisor::new(channel),
        })
    }

    pub fn meeting_id(&self) -> &MeetingId {
        self.session.meeting_id()
    }

    pub fn supervisor(&self) -> &LivenessSupervisor {
        &self.supervisor
    }

    /// Runs the tick loop until the owning task is aborted.
    ///
    /// Starts with an immediate fetch, then ticks at the configured
    /// period. While paused (scheduler stopped or host unreachable)
    /// ticks are no-ops, so `resume` can pick the loop back up without
    /// respawning it.
    pub async fn run(self: Arc<Self>) {
        info!(
            meeting_id = %self.meeting_id(),
            interval_ms = self.config.poll_interval_ms,
            "Transcript sync worker started"
        );

        self.resume().await;

        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; the immediate
        // fetch already happened in resume().
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.tick(Instant::now()).await;
        }
    }

    /// One scheduling decision. Dispatches a fetch when the worker is
    /// live, active, and past the minimum spacing.
    pub async fn tick(self: &Arc<Self>, now: Instant) {
        if !self.supervisor.is_alive().await {
            return;
        }
        let due = self.scheduler.lock().await.should_fetch(now);
        if due {
            self.spawn_fetch();
        }
    }

    /// (Re)activates polling and dispatches one immediate fetch,
    /// keeping whatever transcript state is already retained.
    pub async fn resume(self: &Arc<Self>) {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.start();
        let due = scheduler.should_fetch(Instant::now());
        drop(scheduler);
        if due {
            self.spawn_fetch();
        }
    }

    /// Halts fetch dispatches. Retained state survives for a later
    /// `resume` against the same session.
    pub async fn pause(&self) {
        self.scheduler.lock().await.stop();
        debug!(meeting_id = %self.meeting_id(), "Transcript sync paused");
    }

    pub async fn is_polling(&self) -> bool {
        self.scheduler.lock().await.is_active()
    }

    /// Full session reset: clears retained transcript state and
    /// invalidates every fetch still in flight.
    pub async fn reset(&self) {
        self.session.invalidate();
        self.state.lock().await.reset();
        debug!(meeting_id = %self.meeting_id(), "Transcript state reset");
    }

    /// Current ordered snapshot, for the popup and for tests.
    pub async fn snapshot(&self) -> Vec<Segment> {
        self.state.lock().await.segments().to_vec()
    }

    pub async fn since(&self) -> Option<String> {
        self.state.lock().await.since()
    }

    fn spawn_fetch(self: &Arc<Self>) {
        let worker = Arc::clone(self);
        tokio::spawn(async move {
            worker.fetch_once().await;
        });
    }

    /// One fetch/merge cycle. All failure modes are contained here:
    /// rejected requests skip the cycle, channel failures pause the
    /// worker via the supervisor, stale responses are dropped.
    pub async fn fetch_once(&self) {
        let token = self.session.token();
        let since = self.since().await;
        let meeting_id = self.meeting_id().to_string();

        match self
            .source
            .fetch_segments(&meeting_id, since.as_deref())
            .await
        {
            Ok(batch) => {
                let mut state = self.state.lock().await;
                // Re-check under the lock: a reset may have raced the
                // response in.
                if self.session.token() != token {
                    debug!(%meeting_id, "Discarding transcript response from a stale session");
                    return;
                }

                let fetched = batch.len();
                let outcome = reconcile(&mut state, batch);
                if outcome.changed {
                    debug!(
                        %meeting_id,
                        fetched,
                        added = outcome.newly_added.len(),
                        retained = state.len(),
                        "Transcript segments merged"
                    );
                    let update = TranscriptUpdate {
                        meeting_id,
                        ordered: state.segments().to_vec(),
                        newly_added: outcome.newly_added,
                    };
                    self.sink.segments_updated(&update);
                }
            }
            Err(SourceError::Channel(e)) => {
                warn!(%meeting_id, error = %e, "Host channel failed during fetch");
                self.supervisor.mark_unreachable().await;
                self.scheduler.lock().await.stop();
            }
            Err(e) => {
                warn!(%meeting_id, error = %e, "Transcript fetch failed, skipping cycle");
            }
        }
    }
}
