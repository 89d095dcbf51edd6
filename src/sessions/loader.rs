use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use log::{error, info};
use tokio_util::sync::CancellationToken;

use super::{Session, decode_sessions};
use crate::SpindeckError;

/// Where the session document lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSource {
    File(PathBuf),
    Url(String),
}

impl From<&str> for SessionSource {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            SessionSource::Url(trimmed.to_string())
        } else {
            SessionSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for SessionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionSource::File(path) => write!(f, "{}", path.display()),
            SessionSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Reads the raw session document. Non-success HTTP statuses are errors.
pub async fn fetch_bytes(source: &SessionSource) -> Result<Vec<u8>, SpindeckError> {
    match source {
        SessionSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|e| SpindeckError::SessionFileRead {
                    path: path.display().to_string(),
                    source: e,
                })
        }
        SessionSource::Url(url) => {
            let response = reqwest::get(url)
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| SpindeckError::SessionRequest { source: e })?;
            let body = response
                .bytes()
                .await
                .map_err(|e| SpindeckError::SessionRequest { source: e })?;
            Ok(body.to_vec())
        }
    }
}

#[derive(Clone, Debug)]
pub enum LoadState {
    Loading,
    Error { message: String },
    Loaded { sessions: Arc<[Session]> },
}

impl LoadState {
    /// Terminal state for a finished fetch of `source`.
    pub fn from_fetch(result: Result<Vec<Session>, SpindeckError>, source: &str) -> Self {
        match result {
            Ok(sessions) => {
                info!("Loaded {} listening sessions from {}", sessions.len(), source);
                LoadState::Loaded {
                    sessions: sessions.into(),
                }
            }
            Err(e) => {
                error!("Error loading sessions from {}: {}", source, e);
                LoadState::Error {
                    message: format!(
                        "Failed to load listening session data: {e}. Make sure the session generator has written {source} (run `spindeck sessionize`)."
                    ),
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// One-shot fetch of the session document.
///
/// The fetch runs on its own thread and is started exactly once, when the
/// loader is created. The UI thread picks up the result in [`poll`], which
/// swaps in the whole terminal state at once. Dropping the loader cancels a
/// fetch that is still in flight.
///
/// [`poll`]: SessionLoader::poll
pub struct SessionLoader {
    source: String,
    state: LoadState,
    receiver: Receiver<Result<Vec<Session>, SpindeckError>>,
    cancel_token: CancellationToken,
}

impl SessionLoader {
    pub fn spawn(source: SessionSource, timeout: Option<Duration>) -> Self {
        let label = source.to_string();
        Self::spawn_with(label, timeout, async move { fetch_bytes(&source).await })
    }

    pub fn spawn_with<F>(source: impl Into<String>, timeout: Option<Duration>, fetch: F) -> Self
    where
        F: Future<Output = Result<Vec<u8>, SpindeckError>> + Send + 'static,
    {
        let source = source.into();
        let (sender, receiver) = mpsc::channel();
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let spawned = thread::Builder::new()
            .name("session-loader".to_string())
            .spawn(move || {
                let result = run_fetch(fetch, timeout, task_token);
                // the loader may have been dropped already
                let _ = sender.send(result);
            });

        let state = match spawned {
            Ok(_) => LoadState::Loading,
            Err(e) => LoadState::from_fetch(Err(SpindeckError::LoaderRuntime { source: e }), &source),
        };

        Self {
            source,
            state,
            receiver,
            cancel_token,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Applies the fetch result if it has arrived. Never blocks.
    pub fn poll(&mut self) -> &LoadState {
        if self.state.is_loading() {
            match self.receiver.try_recv() {
                Ok(result) => self.state = LoadState::from_fetch(result, &self.source),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.state = LoadState::from_fetch(Err(SpindeckError::LoaderStopped), &self.source)
                }
            }
        }
        &self.state
    }

    /// Blocks until the fetch has finished.
    pub fn wait(&mut self) -> &LoadState {
        if self.state.is_loading() {
            let result = self
                .receiver
                .recv()
                .unwrap_or(Err(SpindeckError::LoaderStopped));
            self.state = LoadState::from_fetch(result, &self.source);
        }
        &self.state
    }
}

impl Drop for SessionLoader {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn run_fetch<F>(
    fetch: F,
    timeout: Option<Duration>,
    cancel_token: CancellationToken,
) -> Result<Vec<Session>, SpindeckError>
where
    F: Future<Output = Result<Vec<u8>, SpindeckError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SpindeckError::LoaderRuntime { source: e })?;

    let bytes = runtime.block_on(async {
        tokio::select! {
            _ = cancel_token.cancelled() => Err(SpindeckError::FetchCancelled),
            result = with_timeout(fetch, timeout) => result,
        }
    })?;
    decode_sessions(&bytes)
}

async fn with_timeout<F>(fetch: F, timeout: Option<Duration>) -> Result<Vec<u8>, SpindeckError>
where
    F: Future<Output = Result<Vec<u8>, SpindeckError>>,
{
    match timeout {
        None => fetch.await,
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| SpindeckError::FetchTimeout { limit })?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers a single HTTP request with `status` and `body`, returning the URL to fetch.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 2048];
                let _ = stream.read(&mut request);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{address}/data/listening_sessions.json")
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            SessionSource::from("https://example.com/data/listening_sessions.json"),
            SessionSource::Url("https://example.com/data/listening_sessions.json".to_string())
        );
        assert_eq!(
            SessionSource::from(" data/listening_sessions.json "),
            SessionSource::File(PathBuf::from("data/listening_sessions.json"))
        );
    }

    #[test]
    fn test_rejected_fetch_becomes_error() {
        let mut loader = SessionLoader::spawn_with("sessions.json", None, async {
            Err(SpindeckError::FetchCancelled)
        });
        match loader.wait() {
            LoadState::Error { message } => {
                assert!(!message.is_empty());
                assert!(message.contains("sessionize"));
                assert!(message.contains("sessions.json"));
            }
            other => panic!("Expected Error state, got {:?}", other),
        }
        assert!(!loader.state().is_loading());
    }

    #[test]
    fn test_empty_document_is_loaded_not_error() {
        let mut loader =
            SessionLoader::spawn_with("sessions.json", None, async { Ok(b"[]".to_vec()) });
        match loader.wait() {
            LoadState::Loaded { sessions } => assert!(sessions.is_empty()),
            other => panic!("Expected Loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_document_is_treated_like_transport_error() {
        let mut loader =
            SessionLoader::spawn_with("sessions.json", None, async { Ok(b"<html>".to_vec()) });
        assert!(matches!(loader.wait(), LoadState::Error { .. }));
    }

    #[test]
    fn test_hung_fetch_times_out() {
        let mut loader = SessionLoader::spawn_with(
            "sessions.json",
            Some(Duration::from_millis(20)),
            std::future::pending(),
        );
        match loader.wait() {
            LoadState::Error { message } => assert!(message.contains("Timed out")),
            other => panic!("Expected Error state, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_runs_once_and_state_is_terminal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut loader = SessionLoader::spawn_with("sessions.json", None, async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(br#"[{"track_count": 1}]"#.to_vec())
        });

        loader.wait();
        for _ in 0..5 {
            assert!(matches!(loader.poll(), LoadState::Loaded { sessions } if sessions.len() == 1));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_http_error_status_becomes_error() {
        let url = serve_once("404 Not Found", "");
        let mut loader = SessionLoader::spawn(
            SessionSource::from(url.as_str()),
            Some(Duration::from_secs(10)),
        );
        match loader.wait() {
            LoadState::Error { message } => {
                assert!(message.contains("404"), "{message}");
                assert!(message.contains("sessionize"), "{message}");
                assert!(message.contains(&url), "{message}");
            }
            other => panic!("Expected Error state, got {:?}", other),
        }
    }

    #[test]
    fn test_http_empty_document_is_loaded() {
        let url = serve_once("200 OK", "[]");
        let mut loader = SessionLoader::spawn(
            SessionSource::from(url.as_str()),
            Some(Duration::from_secs(10)),
        );
        match loader.wait() {
            LoadState::Loaded { sessions } => assert!(sessions.is_empty()),
            other => panic!("Expected Loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_http_sessions_are_decoded() {
        let url = serve_once("200 OK", r#"[{"track_count": 2}, {"track_count": 7}]"#);
        let mut loader = SessionLoader::spawn(SessionSource::from(url.as_str()), None);
        match loader.wait() {
            LoadState::Loaded { sessions } => {
                let counts: Vec<u32> = sessions.iter().map(|s| s.track_count).collect();
                assert_eq!(counts, vec![2, 7]);
            }
            other => panic!("Expected Loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_poll_does_not_block_while_loading() {
        let mut loader = SessionLoader::spawn_with("sessions.json", None, std::future::pending());
        assert!(loader.poll().is_loading());
    }
}
