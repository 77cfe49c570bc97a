use std::cmp::Ordering;
use std::collections::HashSet;

use crate::segment::{Cursor, Segment};

/// Retained transcript state for one meeting session.
///
/// Owned exclusively by that session's worker; the merge engine is the
/// only mutator. `segments` stays ascending by effective start time and
/// `known` mirrors it for O(1) duplicate rejection.
#[derive(Debug)]
pub struct TranscriptState {
    segments: Vec<Segment>,
    known: HashSet<String>,
    cursor: Option<Cursor>,
    max_retained: usize,
}

impl TranscriptState {
    pub fn new(max_retained: usize) -> Self {
        Self {
            segments: Vec::new(),
            known: HashSet::new(),
            cursor: None,
            max_retained,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// The `since` argument for the next fetch.
    pub fn since(&self) -> Option<String> {
        self.cursor.as_ref().map(Cursor::as_since)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.known.contains(identity)
    }

    /// Whether any retained segment carries exactly this text. Used as
    /// the duplicate fallback for segments without a source id.
    pub fn has_text(&self, text: &str) -> bool {
        self.segments.iter().any(|s| s.text == text)
    }

    /// Clears everything. New session id, explicit reset, or language
    /// change — the source regenerates translated text from scratch, so
    /// history is invalid.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.known.clear();
        self.cursor = None;
    }

    /// Inserts a segment keeping the ascending sort, after any segments
    /// that compare equal so arrival order breaks ties.
    pub(crate) fn insert(&mut self, identity: String, segment: Segment) {
        let idx = self
            .segments
            .iter()
            .position(|s| s.compare_start(&segment) == Ordering::Greater)
            .unwrap_or(self.segments.len());
        self.segments.insert(idx, segment);
        self.known.insert(identity);
    }

    /// Moves the cursor forward if the candidate is later; never back.
    pub(crate) fn advance_cursor(&mut self, candidate: Cursor) {
        let later = match &self.cursor {
            Some(current) => candidate.compare(current) == Ordering::Greater,
            None => true,
        };
        if later {
            self.cursor = Some(candidate);
        }
    }

    /// Enforces the retention bound, evicting oldest first. Identity
    /// set and segment list shrink together.
    pub(crate) fn evict_over_bound(&mut self) -> Vec<Segment> {
        if self.segments.len() <= self.max_retained {
            return Vec::new();
        }
        let excess = self.segments.len() - self.max_retained;
        let evicted: Vec<Segment> = self.segments.drain(..excess).collect();
        for segment in &evicted {
            self.known.remove(&segment.identity());
        }
        evicted
    }
}
