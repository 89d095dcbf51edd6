use std::fmt;

use chrono::{DateTime, FixedOffset, Local, Locale, TimeZone};
use itertools::Itertools;

use super::Session;
use super::loader::LoadState;

pub const LOADING_MESSAGE: &str = "Loading listening sessions...";
pub const EMPTY_MESSAGE: &str =
    "No listening sessions found yet. Run `spindeck sessionize` or go listen to some music!";
/// Shown in place of a field the session record did not carry
pub const PLACEHOLDER: &str = "-";

/// Used when the viewer's locale is unknown to chrono
const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Locale's own date representation, then a 24-hour clock
const LOCALIZED_START_TIME_FORMAT: &str = "%x %H:%M";
const ARTIST_SEPARATOR: &str = ", ";

/// Display fields derived from one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRow {
    /// 1-based position in the document
    pub index: usize,
    pub started: String,
    pub duration: String,
    pub artists: String,
    pub track_count: u32,
}

impl fmt::Display for SessionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}. {:<16}  {:>7}  {:>3} tracks  {}",
            self.index, self.started, self.duration, self.track_count, self.artists
        )
    }
}

/// Whole minutes, halves rounded up.
pub fn duration_minutes(seconds: f64) -> i64 {
    (seconds / 60.0 + 0.5).floor() as i64
}

pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(seconds) => format!("{} min", duration_minutes(seconds)),
        None => PLACEHOLDER.to_string(),
    }
}

/// The viewer's locale, from the operating system setting.
pub fn viewer_locale() -> Option<Locale> {
    sys_locale::get_locale().and_then(|tag| parse_locale(&tag))
}

/// Reads a BCP 47 or POSIX locale tag such as `de-DE`, `fr_FR.UTF-8` or
/// `zh-Hans-CN`. A bare language maps to its home region (`de` to `de_DE`).
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let base = tag.split(['.', '@']).next()?.trim().replace('-', "_");
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    if let Ok(locale) = Locale::try_from(base.as_str()) {
        return Some(locale);
    }

    let mut parts = base.split('_');
    let language = parts.next()?.to_lowercase();
    let region = match parts.last() {
        Some(region) => region.to_uppercase(),
        None => language.to_uppercase(),
    };
    Locale::try_from(format!("{language}_{region}").as_str()).ok()
}

pub fn format_start_time<Tz>(
    start: Option<&DateTime<FixedOffset>>,
    tz: &Tz,
    locale: Option<Locale>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(start) = start else {
        return PLACEHOLDER.to_string();
    };
    let local = start.with_timezone(tz);
    match locale {
        Some(locale) => local
            .format_localized(LOCALIZED_START_TIME_FORMAT, locale)
            .to_string(),
        None => local.format(START_TIME_FORMAT).to_string(),
    }
}

pub fn session_rows<Tz>(sessions: &[Session], tz: &Tz, locale: Option<Locale>) -> Vec<SessionRow>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    sessions
        .iter()
        .enumerate()
        .map(|(i, session)| SessionRow {
            index: i + 1,
            started: format_start_time(session.start_time.as_ref(), tz, locale),
            duration: format_duration(session.duration_seconds),
            artists: session.unique_artists.iter().join(ARTIST_SEPARATOR),
            track_count: session.track_count,
        })
        .collect()
}

/// What the summary panel shows for a given load state.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryView {
    Loading,
    Error(String),
    Empty,
    Rows(Vec<SessionRow>),
}

impl SummaryView {
    pub fn from_state<Tz>(state: &LoadState, tz: &Tz, locale: Option<Locale>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match state {
            LoadState::Loading => SummaryView::Loading,
            LoadState::Error { message } => SummaryView::Error(message.clone()),
            LoadState::Loaded { sessions } if sessions.is_empty() => SummaryView::Empty,
            LoadState::Loaded { sessions } => {
                SummaryView::Rows(session_rows(sessions, tz, locale))
            }
        }
    }

    /// Uses the viewer's local timezone and locale.
    pub fn local(state: &LoadState) -> Self {
        Self::from_state(state, &Local, viewer_locale())
    }

    /// Rebuilds the view only when `state` has moved into or out of Loading
    /// since the view was built. Returns whether it was rebuilt.
    pub fn refresh<Tz>(&mut self, state: &LoadState, tz: &Tz, locale: Option<Locale>) -> bool
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let stale = matches!(self, SummaryView::Loading) != state.is_loading();
        if stale {
            *self = Self::from_state(state, tz, locale);
        }
        stale
    }
}
