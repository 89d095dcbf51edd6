// Groups a recently-played history into listening sessions

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use log::info;
use serde::Deserialize;

use super::Session;
use crate::{SpindeckError, writer};

/// Silence longer than this ends a session
pub const DEFAULT_BREAK_HOURS: f64 = 1.0;

#[derive(Deserialize)]
#[serde(untagged)]
enum WireHistory {
    Plays(Vec<WirePlay>),
    Page { items: Vec<WirePlay> },
}

#[derive(Deserialize)]
struct WirePlay {
    played_at: String,
    track: WireTrack,
}

#[derive(Deserialize)]
struct WireTrack {
    name: String,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    artists: Vec<WireArtist>,
    #[serde(default)]
    album: Option<WireAlbum>,
}

#[derive(Deserialize)]
struct WireAlbum {
    #[serde(default)]
    images: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
    url: String,
}

#[derive(Deserialize)]
struct WireArtist {
    name: String,
}

/// A single played track.
#[derive(Clone, Debug, PartialEq)]
pub struct Play {
    pub played_at: DateTime<FixedOffset>,
    pub title: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
    /// Smallest album art URL, if the track carried any
    pub image: Option<String>,
}

impl Play {
    /// "Artist - Title", using the first credited artist.
    pub fn label(&self) -> String {
        match self.artists.first() {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

/// Accepts either a bare array of plays or a recently-played page with an
/// `items` array.
pub fn decode_plays(bytes: &[u8]) -> Result<Vec<Play>, SpindeckError> {
    let history: WireHistory = serde_json::from_slice(bytes)
        .map_err(|e| SpindeckError::PlayHistoryDecode { source: e })?;
    let plays = match history {
        WireHistory::Plays(plays) | WireHistory::Page { items: plays } => plays,
    };

    plays
        .into_iter()
        .enumerate()
        .map(|(index, play)| {
            let played_at = DateTime::parse_from_rfc3339(play.played_at.trim()).map_err(|e| {
                SpindeckError::InvalidPlayRecord {
                    index,
                    reason: format!("played_at: {e}"),
                }
            })?;
            Ok(Play {
                played_at,
                title: play.track.name,
                artists: play.track.artists.into_iter().map(|a| a.name).collect(),
                duration_ms: play.track.duration_ms.unwrap_or(0),
                // images are listed widest first
                image: play
                    .track
                    .album
                    .and_then(|album| album.images.into_iter().last())
                    .map(|image| image.url),
            })
        })
        .collect()
}

/// Sorts plays chronologically and cuts them wherever the gap between two
/// consecutive plays is longer than `break_hours`.
pub fn split_sessions(mut plays: Vec<Play>, break_hours: f64) -> Vec<Vec<Play>> {
    plays.sort_by_key(|play| play.played_at);
    let break_ms = (break_hours * 3_600_000.0) as i64;

    let mut sessions: Vec<Vec<Play>> = Vec::new();
    let mut current: Vec<Play> = Vec::new();
    for play in plays {
        if let Some(last) = current.last()
            && (play.played_at - last.played_at).num_milliseconds() > break_ms
        {
            sessions.push(std::mem::take(&mut current));
        }
        current.push(play);
    }
    if !current.is_empty() {
        sessions.push(current);
    }
    sessions
}

/// Builds the session record for a non-empty, chronologically sorted run of plays.
pub fn summarize(plays: &[Play]) -> Session {
    let start = plays.first().map(|p| p.played_at);
    let end = plays.last().map(|p| p.played_at);
    let duration_seconds = match (start, end) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
        _ => None,
    };

    let mut unique_artists: Vec<String> = Vec::new();
    for artist in plays.iter().flat_map(|p| p.artists.iter()) {
        if !unique_artists.contains(artist) {
            unique_artists.push(artist.clone());
        }
    }

    Session {
        start_time: start,
        end_time: end,
        duration_seconds,
        total_playtime_minutes: Some(
            plays.iter().map(|p| p.duration_ms).sum::<u64>() as f64 / 60_000.0,
        ),
        unique_artists,
        track_count: plays.len() as u32,
        tracks: plays.iter().map(Play::label).collect(),
        images: plays.iter().filter_map(|p| p.image.clone()).collect(),
    }
}

pub fn sessionize(plays: Vec<Play>, break_hours: f64) -> Vec<Session> {
    split_sessions(plays, break_hours)
        .iter()
        .map(|plays| summarize(plays))
        .collect()
}

/// Reads a play history file and writes the session document. Returns the
/// number of sessions written.
pub fn sessionize_file(input: &Path, output: &Path, break_hours: f64) -> Result<usize, SpindeckError> {
    let bytes = std::fs::read(input).map_err(|e| SpindeckError::PlayHistoryRead {
        path: input.display().to_string(),
        source: e,
    })?;
    let plays = decode_plays(&bytes)?;
    let play_count = plays.len();
    let sessions = sessionize(plays, break_hours);
    writer::write_sessions(output, &sessions)?;
    info!(
        "Grouped {} plays into {} sessions, saved to {:?}",
        play_count,
        sessions.len(),
        output
    );
    Ok(sessions.len())
}
