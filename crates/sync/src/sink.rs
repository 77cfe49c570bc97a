use tracing::trace;

use crate::TranscriptUpdate;

/// Consumer of reconciled transcript snapshots.
///
/// Called once per reconcile that changed retained state, always with
/// the fully merged, sorted, deduplicated sequence — never a partially
/// applied batch. Implementations must not block.
pub trait RenderSink: Send + Sync {
    fn segments_updated(&self, update: &TranscriptUpdate);
}

/// Sink used while no overlay is mounted. Dropping updates is safe:
/// the next reconcile after a real sink attaches carries the full
/// ordered view anyway.
pub struct NullSink;

impl RenderSink for NullSink {
    fn segments_updated(&self, update: &TranscriptUpdate) {
        trace!(
            meeting_id = %update.meeting_id,
            segments = update.ordered.len(),
            "Dropping transcript update, no sink mounted"
        );
    }
}
