// Error types for spindeck

use snafu::Snafu;
use std::io;
use std::time::Duration;

#[derive(Debug, Snafu)]
pub enum SpindeckError {
    // Errors while fetching session data
    #[snafu(display("Unable to read session file {path}: {source}"))]
    SessionFileRead { path: String, source: io::Error },
    #[snafu(display("Request for session data failed: {source}"))]
    SessionRequest { source: reqwest::Error },
    #[snafu(display("Timed out after {limit:?} waiting for session data"))]
    FetchTimeout { limit: Duration },
    #[snafu(display("Session data fetch was cancelled"))]
    FetchCancelled,
    #[snafu(display("Session loader stopped before delivering any data"))]
    LoaderStopped,
    #[snafu(display("Could not start the session loader: {source}"))]
    LoaderRuntime { source: io::Error },

    // Errors while decoding session data
    #[snafu(display("Malformed session data: {source}"))]
    SessionDecode { source: serde_json::Error },
    #[snafu(display("Invalid session record #{index}: {reason}"))]
    InvalidSessionRecord { index: usize, reason: String },

    // Errors while generating session data
    #[snafu(display("Unable to read play history {path}: {source}"))]
    PlayHistoryRead { path: String, source: io::Error },
    #[snafu(display("Malformed play history: {source}"))]
    PlayHistoryDecode { source: serde_json::Error },
    #[snafu(display("Invalid play record #{index}: {reason}"))]
    InvalidPlayRecord { index: usize, reason: String },
    #[snafu(display("Error writing sessions file: {source}"))]
    SessionWrite { source: io::Error },
    #[snafu(display("Error serializing sessions: {source}"))]
    SessionSerialize { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error accessing config file: {source}"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file: {source}"))]
    ConfigSerializeError { source: serde_json::Error },
}
