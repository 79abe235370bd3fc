//! Render pipeline – turns source Markdown into a displayable content block
//! via the external converter service.
//!
//! Guarantees:
//! - At most one "live" result: every submit mints a new request generation,
//!   and a response is applied only if its generation is still current.
//!   Stale results are dropped without touching display state.
//! - Results apply in last-issued-wins order, not completion order.
//! - Empty input short-circuits to a prompt state with no network call.
//! - While live mode is on, rapid edits coalesce to one request per 350 ms
//!   quiet period; manual renders bypass the debounce.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Quiet period before a live edit triggers a render.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(350);

/// Shown when there is no input at all.
pub const PROMPT_MSG: &str = "Paste Markdown to render.";
/// Shown when a successful conversion produced an empty fragment.
pub const EMPTY_RESULT_MSG: &str = "Nothing to preview yet.";
/// Fixed message for a payload-too-large response, independent of its body.
pub const TOO_LARGE_MSG: &str = "Markdown is too large.";
/// Generic conversion failure, used when the service gives no detail.
pub const RENDER_FAILED_MSG: &str = "Rendering failed. Check your input and try again.";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Request body sent to the converter service.
#[derive(Debug, Serialize)]
pub struct ConvertRequest<'a> {
    pub markdown: &'a str,
}

/// Converter response body. Error bodies reuse the same shape with `html`
/// absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversion {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Failure classification for one conversion attempt.
#[derive(Debug)]
pub enum ConvertError {
    /// HTTP 413: the source text exceeds the service's request cap.
    TooLarge,
    /// Any other non-success status, with the structured detail when the
    /// body carried one.
    Status { code: u16, detail: Option<String> },
    /// The request never completed.
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for ConvertError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge => write!(f, "payload too large"),
            Self::Status { code, detail } => match detail {
                Some(d) => write!(f, "conversion failed ({code}): {d}"),
                None => write!(f, "conversion failed ({code})"),
            },
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Boxed conversion future, so converters stay object-safe.
pub type ConvertFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Conversion, ConvertError>> + Send + 'a>>;

/// The external Markdown-to-HTML conversion boundary.
pub trait Convert: Send + Sync {
    fn convert(&self, markdown: String) -> ConvertFuture<'_>;
}

/// Converter client speaking JSON to the rendering service.
pub struct HttpConverter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpConverter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Convert for HttpConverter {
    fn convert(&self, markdown: String) -> ConvertFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&ConvertRequest {
                    markdown: &markdown,
                })
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
                return Err(ConvertError::TooLarge);
            }
            if !status.is_success() {
                // Error bodies may carry a structured `{ error }`.
                let detail = response
                    .json::<Conversion>()
                    .await
                    .ok()
                    .and_then(|body| body.error)
                    .filter(|msg| !msg.trim().is_empty());
                return Err(ConvertError::Status {
                    code: status.as_u16(),
                    detail,
                });
            }
            Ok(response.json::<Conversion>().await?)
        })
    }
}

// ---------------------------------------------------------------------------
// Display state
// ---------------------------------------------------------------------------

/// What the preview currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ContentState {
    /// No input yet; the prompt message is shown.
    #[default]
    Prompt,
    /// A successful conversion produced an empty fragment.
    Placeholder,
    /// The live rendered fragment.
    Content(String),
}

/// The single shared display record mutated only by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub content: ContentState,
    /// User-facing render error, if any. Never set for stale results.
    pub error: Option<String>,
    /// True while a current request is in flight.
    pub busy: bool,
    /// Bumped whenever `content` changes, so the session can repaginate.
    pub revision: u64,
}

impl DisplayState {
    /// The fragment to lay out; empty for prompt/placeholder states.
    pub fn fragment(&self) -> &str {
        match &self.content {
            ContentState::Content(html) => html,
            _ => "",
        }
    }

    /// Status line for the presentation layer.
    pub fn message(&self) -> Option<&str> {
        if let Some(error) = &self.error {
            return Some(error);
        }
        match self.content {
            ContentState::Prompt => Some(PROMPT_MSG),
            ContentState::Placeholder => Some(EMPTY_RESULT_MSG),
            ContentState::Content(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Owns the request generation counter and the shared display state.
///
/// Cheap to clone; clones share state, so a debounce task and the caller
/// observe the same record.
#[derive(Clone)]
pub struct RenderPipeline {
    converter: Arc<dyn Convert>,
    state: Arc<Mutex<DisplayState>>,
    generation: Arc<AtomicU64>,
}

impl RenderPipeline {
    pub fn new(converter: Arc<dyn Convert>) -> Self {
        Self {
            converter,
            state: Arc::new(Mutex::new(DisplayState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current display state.
    pub fn snapshot(&self) -> DisplayState {
        self.state().clone()
    }

    /// Render `text` through the converter and apply the result if it is
    /// still the freshest request by the time it resolves.
    pub async fn submit(&self, text: &str) {
        if text.trim().is_empty() {
            // Invalidate any in-flight request, then show the prompt without
            // touching the network.
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state();
            state.content = ContentState::Prompt;
            state.error = None;
            state.busy = false;
            state.revision += 1;
            return;
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().busy = true;

        let result = self.converter.convert(text.to_string()).await;

        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) != token {
            // Superseded while in flight: drop silently, no UI mutation.
            log::debug!("dropping stale render result (generation {token})");
            return;
        }
        match result {
            Ok(conversion) => {
                state.content = if conversion.html.trim().is_empty() {
                    ContentState::Placeholder
                } else {
                    ContentState::Content(conversion.html)
                };
                state.error = None;
                state.revision += 1;
            }
            Err(ConvertError::TooLarge) => {
                state.error = Some(TOO_LARGE_MSG.to_string());
            }
            Err(ConvertError::Status { detail, code }) => {
                log::warn!("converter returned status {code}");
                state.error = Some(detail.unwrap_or_else(|| RENDER_FAILED_MSG.to_string()));
            }
            Err(ConvertError::Transport(e)) => {
                log::warn!("converter unreachable: {e}");
                state.error = Some(RENDER_FAILED_MSG.to_string());
            }
        }
        state.busy = false;
    }
}

// ---------------------------------------------------------------------------
// Debounced live mode
// ---------------------------------------------------------------------------

/// Coalesces keystrokes into renders while live mode is on.
///
/// Owns at most one pending timer; every new edit replaces it, so only the
/// final text of a burst is submitted. Cancellation is cooperative: it only
/// stops the timer while it is still waiting. Once the quiet period elapses
/// and `submit` is dispatched, the request runs to completion so the busy
/// indicator is always cleared — superseding it is the generation counter's
/// job, not the timer's.
pub struct LiveDebouncer {
    pipeline: RenderPipeline,
    delay: Duration,
    live: bool,
    /// Cancels the pending quiet-period timer. Dropping the sender cancels
    /// too; a dispatched submit is unaffected either way.
    pending: Option<oneshot::Sender<()>>,
}

impl LiveDebouncer {
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self {
            pipeline,
            delay: DEBOUNCE_DELAY,
            live: false,
            pending: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Toggle live mode. Switching it on immediately renders the current
    /// text; switching it off cancels any pending timer.
    pub fn set_live(&mut self, live: bool, text: &str) {
        self.live = live;
        if live {
            self.render_now(text);
        } else {
            self.cancel_pending();
        }
    }

    /// Record an edit. Ignored unless live; otherwise restarts the quiet
    /// period so only the last text of a burst is rendered.
    pub fn edit(&mut self, text: &str) {
        if !self.live {
            return;
        }
        self.cancel_pending();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.pending = Some(cancel_tx);
        let pipeline = self.pipeline.clone();
        let text = text.to_string();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                // Cancelled (or the debouncer went away) during the quiet
                // period: no render.
                _ = cancel_rx => {}
                _ = tokio::time::sleep(delay) => {
                    pipeline.submit(&text).await;
                }
            }
        });
    }

    /// Explicit user-initiated render; bypasses the debounce entirely.
    pub fn render_now(&mut self, text: &str) {
        self.cancel_pending();
        let pipeline = self.pipeline.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            pipeline.submit(&text).await;
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(cancel) = self.pending.take() {
            let _ = cancel.send(());
        }
    }
}
