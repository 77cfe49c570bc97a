use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of leading text characters that feed the synthesized identity.
const IDENTITY_TEXT_PREFIX: usize = 20;

/// One transcript fragment.
///
/// Fields mirror what the gateway emits; everything except `text` is
/// optional on the wire, so all accessors are total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Source-provided identifier, when the gateway supplies one.
    pub id: Option<String>,
    /// Seconds relative to meeting start.
    pub start: f64,
    pub end: f64,
    /// Wall-clock start, when the gateway supplies one. Wins over
    /// `start` for ordering whenever both sides of a comparison have it.
    pub absolute_start_time: Option<DateTime<Utc>>,
    pub speaker: Option<String>,
    pub text: String,
}

impl Segment {
    /// Stable identity of this segment.
    ///
    /// Uses the source-provided id when present; otherwise synthesizes
    /// one from `(start, end, first 20 chars of text)` with whitespace
    /// runs collapsed to a single `-`. Two segments with the same
    /// identity are the same segment regardless of other fields.
    pub fn identity(&self) -> String {
        if let Some(id) = &self.id {
            if !id.is_empty() {
                return id.clone();
            }
        }
        let prefix: String = self.text.chars().take(IDENTITY_TEXT_PREFIX).collect();
        let raw = format!("{}-{}-{}", self.start, self.end, prefix);
        raw.split_whitespace().collect::<Vec<_>>().join("-")
    }

    /// Chronological comparison of two segments.
    ///
    /// Absolute time is compared when both segments carry it; any mixed
    /// or relative-only pair falls back to the relative offsets. The
    /// mixed case is an approximation, not a total order — accepted.
    pub fn compare_start(&self, other: &Self) -> Ordering {
        match (self.absolute_start_time, other.absolute_start_time) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self
                .start
                .partial_cmp(&other.start)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Speaker display name, with the placeholder the overlay shows
    /// when the gateway did not attribute the utterance.
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or("Speaker")
    }
}

/// The timestamp boundary used as the `since` argument of the next
/// fetch, bounding payload size to segments the source produced later.
///
/// Carries both time representations of the segment it came from so it
/// compares against future segments the same way segments compare
/// against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub absolute: Option<DateTime<Utc>>,
    pub relative: f64,
}

impl Cursor {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            absolute: segment.absolute_start_time,
            relative: segment.start,
        }
    }

    /// Same ordering policy as [`Segment::compare_start`].
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.absolute, other.absolute) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self
                .relative
                .partial_cmp(&other.relative)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Wire form: RFC 3339 for wall-clock cursors, plain seconds for
    /// relative ones.
    pub fn as_since(&self) -> String {
        match self.absolute {
            Some(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => format!("{}", self.relative),
        }
    }
}
