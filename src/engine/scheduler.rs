/// Per-input search scheduling: minimum length, debounce and supersession.
///
/// Each bound input owns one [`SearchController`]. A controller holds at most
/// one debounce timer; every keystroke cancels it before anything else happens,
/// so for remote sources only the last keystroke within `search_delay` turns
/// into a request.
///
/// Only the timer is cancelable. Once it fires, the request runs to completion
/// and its result is published even if the input has changed since. Consumers
/// that care can compare [`SearchOutcome::query`] against the current query.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::errors::SearchError;
use super::record::SearchOutcome;
use super::remote::RemoteFetch;
use super::report::Reporter;
use super::source::{RemoteEndpoint, Source, search_local, search_remote};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Identity of one bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "typeahead-{}", self.0)
    }
}

/// Search options consumed by the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// A query must be strictly longer than this to trigger a search.
    pub minimum_length: usize,
    /// Debounce window for remote sources.
    pub search_delay: Duration,
    /// Case-sensitive matching.
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            minimum_length: 3,
            search_delay: Duration::from_millis(500),
            case_sensitive: false,
        }
    }
}

/// Lifecycle of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing displayed, nothing scheduled.
    Idle,
    /// A debounce timer is armed.
    Pending,
    /// A search is running.
    Searching,
    /// Results for some query are displayed.
    Rendered,
}

/// What a keystroke did.
#[derive(Debug, Clone, PartialEq)]
pub enum Keystroke {
    /// Input is empty: results must be hidden.
    Hidden,
    /// Input is too short: nothing searched, previous results stay as they are.
    BelowMinimum,
    /// Local source: searched synchronously, ready to render.
    Rendered(SearchOutcome),
    /// Remote source: a debounced search was scheduled.
    Scheduled,
}

/// Completion of a debounced remote search.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Results are ready to render.
    Rendered {
        /// Input the search belongs to.
        instance: InstanceId,
        /// The matches.
        outcome: SearchOutcome,
    },
    /// The search failed closed; nothing should be rendered.
    Failed {
        /// Input the search belongs to.
        instance: InstanceId,
        /// Query that was searched.
        query: String,
        /// Classified failure.
        error: SearchError,
    },
}

/// A pending debounce timer. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer if it has not fired yet. A request already sent is not affected.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer task has finished (fired and completed, or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Scheduler for a single input instance.
pub struct SearchController {
    id: InstanceId,
    source: Arc<Source>,
    fetcher: Arc<dyn RemoteFetch>,
    options: SearchOptions,
    reporter: Reporter,
    query: String,
    timer: Option<TimerHandle>,
    state: Arc<watch::Sender<SearchState>>,
    // Whether a result set is on screen; written by fired timers too.
    shown: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl SearchController {
    /// Bind a new input instance. Remote completions are sent to `events`.
    #[must_use]
    pub fn new(
        source: Arc<Source>,
        fetcher: Arc<dyn RemoteFetch>,
        options: SearchOptions,
        reporter: Reporter,
        events: mpsc::UnboundedSender<SearchEvent>,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            id: InstanceId::next(),
            source,
            fetcher,
            options,
            reporter,
            query: String::new(),
            timer: None,
            state: Arc::new(state),
            shown: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    /// This instance's identity.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The most recent input value.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions, including those made by a fired timer.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Whether a debounce timer is armed and has not fired or been cancelled.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.state() == SearchState::Pending
            && self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Handle the input's new value after a keystroke.
    ///
    /// # Panics
    ///
    /// Scheduling a remote search spawns a task and panics outside a Tokio runtime.
    pub fn on_input(&mut self, value: &str) -> Keystroke {
        value.clone_into(&mut self.query);
        self.cancel();

        if value.is_empty() {
            self.shown.store(false, Ordering::Release);
            self.state.send_replace(SearchState::Idle);
            return Keystroke::Hidden;
        }

        if value.chars().count() <= self.options.minimum_length {
            return Keystroke::BelowMinimum;
        }

        match self.source.as_ref() {
            Source::Local(groups) => {
                self.state.send_replace(SearchState::Searching);
                let outcome =
                    search_local(groups, value, self.options.case_sensitive, &self.reporter);
                self.shown.store(true, Ordering::Release);
                self.state.send_replace(SearchState::Rendered);
                Keystroke::Rendered(outcome)
            }
            Source::Remote(endpoint) => {
                let endpoint = endpoint.clone();
                self.timer = Some(self.arm(endpoint, value.to_owned()));
                Keystroke::Scheduled
            }
        }
    }

    /// Cancel the pending timer, if any.
    ///
    /// A cancelled `Pending` falls back to `Rendered` when results are on
    /// screen (including results published while the timer was pending) and to
    /// `Idle` otherwise.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            let resume = if self.shown.load(Ordering::Acquire) {
                SearchState::Rendered
            } else {
                SearchState::Idle
            };
            self.state.send_if_modified(|s| {
                if *s == SearchState::Pending {
                    *s = resume;
                    true
                } else {
                    false
                }
            });
        }
    }

    fn arm(&self, endpoint: RemoteEndpoint, query: String) -> TimerHandle {
        self.state.send_replace(SearchState::Pending);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.options.search_delay;
        let case_sensitive = self.options.case_sensitive;
        let instance = self.id;
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let shown = Arc::clone(&self.shown);
        let events = self.events.clone();
        let reporter = self.reporter;

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }

            state.send_replace(SearchState::Searching);
            tracing::debug!(%instance, %query, url = %endpoint.url, "dispatching remote search");

            let event = match search_remote(fetcher.as_ref(), &endpoint, &query, case_sensitive)
                .await
            {
                Ok(outcome) => {
                    shown.store(true, Ordering::Release);
                    settle(&state, SearchState::Rendered);
                    SearchEvent::Rendered { instance, outcome }
                }
                Err(error) => {
                    reporter.report(&error);
                    shown.store(false, Ordering::Release);
                    settle(&state, SearchState::Idle);
                    SearchEvent::Failed {
                        instance,
                        query,
                        error,
                    }
                }
            };
            // The receiver may be gone if the input was unbound meanwhile.
            let _ = events.send(event);
        });

        TimerHandle { token, task }
    }
}

impl fmt::Debug for SearchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchController")
            .field("id", &self.id)
            .field("query", &self.query)
            .field("state", &self.state())
            .field("remote", &self.source.is_remote())
            .finish_non_exhaustive()
    }
}

/// Leave `Searching` for `next`; a newer timer's `Pending` is left alone.
fn settle(state: &watch::Sender<SearchState>, next: SearchState) {
    state.send_if_modified(|s| {
        if *s == SearchState::Searching {
            *s = next;
            true
        } else {
            false
        }
    });
}
