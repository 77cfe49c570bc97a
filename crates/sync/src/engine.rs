use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::host::{ChannelTranscriptSource, HostChannel, HostRequest, TranscriptSource};
use crate::session::MeetingId;
use crate::sink::RenderSink;
use crate::supervisor::Liveness;
use crate::worker::SyncWorker;

/// Manages one sync worker per active meeting.
///
/// Created once by the overlay host and shared via `Arc`. Entry points
/// map to host events: overlay injected (`start_sync`), overlay
/// dismissed (`end_session`), language selector (`change_language`),
/// tab became visible (`host_visible`), page unload (`end_all`).
pub struct SyncEngine {
    channel: Arc<dyn HostChannel>,
    source: Arc<dyn TranscriptSource>,
    sink: Arc<dyn RenderSink>,
    config: SyncConfig,
    /// Active sessions, keyed by meeting id.
    sessions: DashMap<String, SessionHandle>,
}

struct SessionHandle {
    worker: Arc<SyncWorker>,
    abort_handle: tokio::task::AbortHandle,
    language: String,
}

impl SyncEngine {
    /// Engine whose transcript fetches are delegated through the host
    /// channel, as the overlay does in production.
    pub fn new(
        channel: Arc<dyn HostChannel>,
        sink: Arc<dyn RenderSink>,
        config: SyncConfig,
    ) -> Arc<Self> {
        let source = Arc::new(ChannelTranscriptSource::new(Arc::clone(&channel)));
        Self::with_source(channel, source, sink, config)
    }

    /// Engine with an explicit transcript source.
    pub fn with_source(
        channel: Arc<dyn HostChannel>,
        source: Arc<dyn TranscriptSource>,
        sink: Arc<dyn RenderSink>,
        config: SyncConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            channel,
            source,
            sink,
            config,
            sessions: DashMap::new(),
        })
    }

    /// Starts or resumes synchronization for a meeting.
    ///
    /// A known meeting resumes with its retained transcript; a known
    /// meeting with a different language is reset first (the source
    /// regenerates translations from scratch). Unknown meetings get a
    /// fresh worker.
    pub async fn start_sync(self: &Arc<Self>, meeting_id: MeetingId, language: Option<String>) {
        let key = meeting_id.as_str().to_string();
        let language = language.unwrap_or_else(|| self.config.default_language.clone());

        let existing = self.sessions.get_mut(&key).map(|mut entry| {
            let language_changed = entry.language != language;
            if language_changed {
                entry.language = language.clone();
            }
            (Arc::clone(&entry.worker), language_changed)
        });

        if let Some((worker, language_changed)) = existing {
            if language_changed {
                info!(meeting_id = %key, %language, "Restarting transcript sync with new language");
                worker.reset().await;
            } else {
                info!(meeting_id = %key, "Resuming transcript sync");
            }
            worker.resume().await;
            return;
        }

        info!(meeting_id = %key, %language, "Starting transcript sync");
        let worker = SyncWorker::new(
            meeting_id,
            Arc::clone(&self.source),
            Arc::clone(&self.channel),
            Arc::clone(&self.sink),
            self.config.clone(),
        );

        let task = tokio::spawn(Arc::clone(&worker).run());
        self.sessions.insert(
            key,
            SessionHandle {
                worker,
                abort_handle: task.abort_handle(),
                language,
            },
        );
    }

    /// Pauses polling for a meeting; retained transcript survives so a
    /// later `start_sync` resumes where it left off.
    pub async fn stop_sync(&self, meeting_id: &str) {
        let worker = self
            .sessions
            .get(meeting_id)
            .map(|entry| Arc::clone(&entry.worker));
        if let Some(worker) = worker {
            worker.pause().await;
        }
    }

    /// Ends a session: aborts its worker and drops all retained state.
    pub fn end_session(&self, meeting_id: &str) {
        if let Some((_, handle)) = self.sessions.remove(meeting_id) {
            handle.abort_handle.abort();
            info!(%meeting_id, "Transcript sync session ended");
        }
    }

    /// Page unload: ends every session.
    pub fn end_all(&self) {
        let keys: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.end_session(&key);
        }
    }

    /// Changes the translation language for a meeting.
    ///
    /// Retained transcript is cleared first in either case — the bot
    /// regenerates translated text from scratch, so the old history is
    /// wrong even if the config update then fails.
    pub async fn change_language(&self, meeting_id: &str, language: &str) -> Result<(), SyncError> {
        let worker = {
            let mut entry = self
                .sessions
                .get_mut(meeting_id)
                .ok_or_else(|| SyncError::UnknownSession(meeting_id.to_string()))?;
            if entry.language == language {
                return Ok(());
            }
            entry.language = language.to_string();
            Arc::clone(&entry.worker)
        };

        worker.reset().await;

        let request = HostRequest::UpdateBotConfig {
            meeting_id: meeting_id.to_string(),
            language: language.to_string(),
        };
        match self.channel.request(request).await {
            Ok(response) if response.success => {
                info!(%meeting_id, %language, "Translation language updated");
                Ok(())
            }
            Ok(response) => {
                let reason = response
                    .error
                    .unwrap_or_else(|| "unspecified host error".to_string());
                warn!(%meeting_id, %language, %reason, "Language update rejected");
                Err(SyncError::ConfigRejected(reason))
            }
            Err(e) => {
                warn!(%meeting_id, error = %e, "Host channel failed during language update");
                worker.supervisor().mark_unreachable().await;
                worker.pause().await;
                Err(SyncError::Channel(e))
            }
        }
    }

    /// Tab became visible: re-probe any unreachable session and resume
    /// it with history intact when the channel answers again.
    pub async fn host_visible(&self) {
        let workers: Vec<Arc<SyncWorker>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(&entry.worker))
            .collect();

        for worker in workers {
            if worker.supervisor().is_alive().await {
                continue;
            }
            debug!(meeting_id = %worker.meeting_id(), "Re-probing host channel");
            if worker.supervisor().probe().await == Liveness::Alive {
                worker.resume().await;
            }
        }
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Worker handle for a meeting, when one exists.
    pub fn worker(&self, meeting_id: &str) -> Option<Arc<SyncWorker>> {
        self.sessions
            .get(meeting_id)
            .map(|entry| Arc::clone(&entry.worker))
    }
}
