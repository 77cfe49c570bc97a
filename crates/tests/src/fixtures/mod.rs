pub mod fakes;

use chrono::{TimeZone, Utc};
use translay_sync::Segment;

/// Segment with a source id and relative timestamps.
pub fn seg(id: &str, start: f64, text: &str) -> Segment {
    Segment {
        id: Some(id.to_string()),
        start,
        end: start + 2.0,
        absolute_start_time: None,
        speaker: Some("Ann".to_string()),
        text: text.to_string(),
    }
}

/// Segment without a source id.
pub fn anon_seg(start: f64, text: &str) -> Segment {
    Segment {
        id: None,
        start,
        end: start + 2.0,
        absolute_start_time: None,
        speaker: None,
        text: text.to_string(),
    }
}

/// Segment with a wall-clock start time, `secs` past 10:00 UTC.
pub fn abs_seg(id: &str, start: f64, secs: u32, text: &str) -> Segment {
    let mut segment = seg(id, start, text);
    segment.absolute_start_time = Some(Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, secs).unwrap());
    segment
}
