use std::collections::HashSet;

use tracing::trace;

use crate::segment::{Cursor, Segment};
use crate::state::TranscriptState;

/// Outcome of one reconcile.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Segments that became visible with this batch, post-eviction.
    pub newly_added: Vec<Segment>,
    /// Whether the ordered view differs from before the batch.
    pub changed: bool,
}

/// Merges a fetched batch into retained state.
///
/// Never fails: an empty batch is a no-op. Duplicates are rejected by
/// identity, or by identical text for segments without a source id
/// (that fallback can merge two distinct utterances that share text —
/// kept as-is, the source gives us nothing better to go on). The
/// cursor advances to the latest timestamp observed across retained
/// and incoming segments, including rejected duplicates, so a source
/// that re-serves known segments with refreshed timestamps still moves
/// the `since` boundary forward.
pub fn reconcile(state: &mut TranscriptState, batch: Vec<Segment>) -> Reconciliation {
    if batch.is_empty() {
        return Reconciliation::default();
    }

    let mut newly_added = Vec::new();
    for segment in batch {
        state.advance_cursor(Cursor::from_segment(&segment));

        let identity = segment.identity();
        if state.contains(&identity) {
            trace!(%identity, "Skipping already-known segment");
            continue;
        }
        if segment.id.is_none() && state.has_text(&segment.text) {
            trace!(%identity, "Skipping id-less segment with duplicate text");
            continue;
        }

        newly_added.push(segment.clone());
        state.insert(identity, segment);
    }

    let evicted = state.evict_over_bound();
    if !evicted.is_empty() {
        let gone: HashSet<String> = evicted.iter().map(Segment::identity).collect();
        newly_added.retain(|s| !gone.contains(&s.identity()));
    }

    // Post-eviction: an insertion swallowed whole by the bound leaves
    // the ordered view exactly as it was, so it is not a change.
    let changed = !newly_added.is_empty();

    Reconciliation {
        newly_added,
        changed,
    }
}
