use serde::{Deserialize, Serialize};

/// Configuration for the transcript synchronization core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed tick period of the poll loop, in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum spacing between two fetch dispatches, in milliseconds.
    pub min_fetch_spacing_ms: u64,
    /// Maximum number of segments retained per meeting; oldest are
    /// evicted beyond this.
    pub max_retained_segments: usize,
    /// Translation language requested when none is given explicitly.
    pub default_language: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            min_fetch_spacing_ms: 1000,
            max_retained_segments: 100,
            default_language: "en".to_string(),
        }
    }
}
