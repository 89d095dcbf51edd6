pub mod loader;
pub mod sessionize;
pub mod summary;

use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::SpindeckError;

/// One contiguous listening period.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Session {
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "session_duration")]
    pub duration_seconds: Option<f64>,
    pub total_playtime_minutes: Option<f64>,
    /// Artist names in the order they were first heard
    pub unique_artists: Vec<String>,
    pub track_count: u32,
    pub tracks: Vec<String>,
    /// Album art URLs, one per track that had any
    pub images: Vec<String>,
}

/// Session record as it appears on the wire. Every field is optional so a
/// record missing some of them still decodes; [`Session::try_from_wire`]
/// decides what is acceptable.
///
/// Each accepted spelling of a field has its own slot, so a producer that
/// writes both an old and a new name still decodes. The first spelling
/// present wins.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct WireSession {
    start_time: Option<String>,
    #[serde(rename = "startTime")]
    start_time_camel: Option<String>,
    session_start_utc: Option<String>,

    end_time: Option<String>,
    #[serde(rename = "endTime")]
    end_time_camel: Option<String>,
    session_end_utc: Option<String>,

    session_duration: Option<f64>,
    #[serde(rename = "sessionDuration")]
    session_duration_camel: Option<f64>,
    duration_seconds: Option<f64>,

    total_playtime_minutes: Option<f64>,
    #[serde(rename = "totalPlaytimeMinutes")]
    total_playtime_minutes_camel: Option<f64>,

    unique_artists: Option<Vec<String>>,
    #[serde(rename = "uniqueArtists")]
    unique_artists_camel: Option<Vec<String>>,

    track_count: Option<i64>,
    #[serde(rename = "trackCount")]
    track_count_camel: Option<i64>,

    tracks: Option<Vec<String>>,
    images: Option<Vec<String>>,
}

impl Session {
    fn try_from_wire(index: usize, wire: WireSession) -> Result<Self, SpindeckError> {
        let invalid = |reason: String| SpindeckError::InvalidSessionRecord { index, reason };

        let start_time = wire
            .start_time
            .or(wire.start_time_camel)
            .or(wire.session_start_utc);
        let end_time = wire.end_time.or(wire.end_time_camel).or(wire.session_end_utc);
        let duration_seconds = wire
            .session_duration
            .or(wire.session_duration_camel)
            .or(wire.duration_seconds);
        let total_playtime_minutes = wire
            .total_playtime_minutes
            .or(wire.total_playtime_minutes_camel);

        let start_time = parse_timestamp(start_time.as_deref())
            .map_err(|e| invalid(format!("start_time: {e}")))?;
        let end_time = parse_timestamp(end_time.as_deref())
            .map_err(|e| invalid(format!("end_time: {e}")))?;

        if let Some(duration) = duration_seconds
            && duration < 0.0
        {
            return Err(invalid(format!("negative session duration {duration}")));
        }
        if let Some(minutes) = total_playtime_minutes
            && minutes < 0.0
        {
            return Err(invalid(format!("negative playtime {minutes}")));
        }

        let tracks = wire.tracks.unwrap_or_default();
        let track_count = match wire.track_count.or(wire.track_count_camel) {
            Some(count) => u32::try_from(count)
                .map_err(|_| invalid(format!("track count {count} out of range")))?,
            None => tracks.len() as u32,
        };
        if track_count as usize != tracks.len() {
            debug!(
                "Session #{} reports {} tracks but lists {}",
                index,
                track_count,
                tracks.len()
            );
        }

        Ok(Self {
            start_time,
            end_time,
            duration_seconds,
            total_playtime_minutes,
            unique_artists: wire
                .unique_artists
                .or(wire.unique_artists_camel)
                .unwrap_or_default(),
            track_count,
            tracks,
            images: wire.images.unwrap_or_default(),
        })
    }
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<FixedOffset>>, chrono::ParseError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim()).map(Some),
    }
}

/// Decodes a session document: a JSON array of session records, kept in
/// document order.
pub fn decode_sessions(bytes: &[u8]) -> Result<Vec<Session>, SpindeckError> {
    let wire: Vec<WireSession> =
        serde_json::from_slice(bytes).map_err(|e| SpindeckError::SessionDecode { source: e })?;

    wire.into_iter()
        .enumerate()
        .map(|(index, record)| Session::try_from_wire(index, record))
        .collect()
}
