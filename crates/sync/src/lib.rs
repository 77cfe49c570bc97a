pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod ingest;
pub mod merge;
pub mod scheduler;
pub mod segment;
pub mod session;
pub mod sink;
pub mod state;
pub mod supervisor;
pub mod worker;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{ChannelError, SourceError, SyncError};
pub use host::{ChannelTranscriptSource, HostChannel, HostRequest, HostResponse, TranscriptSource};
pub use merge::{reconcile, Reconciliation};
pub use segment::{Cursor, Segment};
pub use session::MeetingId;
pub use sink::{NullSink, RenderSink};
pub use state::TranscriptState;
pub use supervisor::{Liveness, LivenessSupervisor};
pub use worker::SyncWorker;

use serde::{Deserialize, Serialize};

/// A transcript snapshot pushed to the render sink after a reconcile
/// that changed retained state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    pub meeting_id: String,
    /// Full ordered view: deduplicated, sorted by effective start time,
    /// bounded to the configured retention limit.
    pub ordered: Vec<Segment>,
    /// Segments that became visible with this reconcile (post-eviction).
    pub newly_added: Vec<Segment>,
}
