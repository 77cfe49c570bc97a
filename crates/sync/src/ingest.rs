use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::segment::Segment;

/// The two transcript payload shapes the gateway has shipped: the
/// current wrapped object and the legacy bare array. Resolved once
/// here; nothing downstream branches on the wire shape again.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptPayload {
    Wrapped { segments: Vec<Value> },
    Bare(Vec<Value>),
}

/// One segment as it appears on the wire. Every field is optional and
/// the gateway has drifted on names, hence the aliases.
#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "start_time")]
    start: Option<f64>,
    #[serde(default, alias = "end_time")]
    end: Option<f64>,
    #[serde(default)]
    absolute_start_time: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, alias = "speaker_name")]
    speaker: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Normalizes a transcript payload into segments.
///
/// Malformed payloads come back as an empty batch, and a record that
/// fails to deserialize is dropped without aborting the rest.
pub fn normalize_payload(payload: &Value) -> Vec<Segment> {
    let records = match TranscriptPayload::deserialize(payload) {
        Ok(TranscriptPayload::Wrapped { segments }) => segments,
        Ok(TranscriptPayload::Bare(segments)) => segments,
        Err(_) => {
            debug!("Transcript payload has no recognizable segment list");
            return Vec::new();
        }
    };

    let total = records.len();
    let segments: Vec<Segment> = records.into_iter().filter_map(into_segment).collect();
    if segments.len() < total {
        debug!(
            dropped = total - segments.len(),
            kept = segments.len(),
            "Dropped unparseable transcript records"
        );
    }
    segments
}

fn into_segment(record: Value) -> Option<Segment> {
    let raw = RawSegment::deserialize(record).ok()?;
    let absolute = raw
        .absolute_start_time
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| raw.created_at.as_deref().and_then(parse_timestamp));

    Some(Segment {
        id: raw.id.filter(|id| !id.is_empty()),
        start: raw.start.unwrap_or(0.0),
        end: raw.end.unwrap_or(0.0),
        absolute_start_time: absolute,
        speaker: raw.speaker,
        text: raw.text.unwrap_or_default(),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
