//! Debounced search suggestions
//!
//! [`SuggestionPipeline`] is the state machine for one search field:
//! `Idle -> Debouncing -> Fetching -> {Rendered, Failed}`. It performs no I/O;
//! [`SearchSession`] drives it on a tokio task with a resettable debounce timer
//! and spawned lookups.
//!
//! Every lookup carries a sequence number. A completion is applied only if it
//! belongs to the latest lookup and no newer input has arrived since.

use crate::error::GatewayError;
use crate::gateway::{BookFilters, BookGateway, GatewayResult};
use crate::route::Route;
use crate::types::Book;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Maximum number of suggestions shown
pub const SUGGESTION_LIMIT: usize = 5;

/// Pipeline state of one search field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Debouncing { query: String },
    Fetching { query: String, seq: u64 },
    Rendered { query: String },
    Failed { query: String },
}

/// Contents of the suggestion surface
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionView {
    /// Nothing to show
    None,

    /// Lookup in progress
    Searching { query: String },

    /// The lookup found nothing
    Empty { query: String },

    /// Up to [`SUGGESTION_LIMIT`] books followed by a "view all" action
    Results { query: String, books: Vec<Book> },
}

impl SuggestionView {
    /// Target of the trailing "view all results" action
    pub fn view_all(&self) -> Option<Route> {
        match self {
            SuggestionView::Results { query, .. } => Some(Route::SearchResults(query.clone())),
            _ => None,
        }
    }
}

/// What the driver must do with the debounce timer after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Restart,
    Cancel,
}

/// A lookup the driver must issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: String,
}

impl FetchRequest {
    pub fn filters(&self) -> BookFilters {
        BookFilters::new()
            .search(self.query.clone())
            .limit(SUGGESTION_LIMIT as u32)
    }
}

/// Point-in-time copy of a pipeline, for observers
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub state: PipelineState,
    pub view: SuggestionView,
    pub visible: bool,
}

/// Suggestion state machine for one input field
#[derive(Debug)]
pub struct SuggestionPipeline {
    state: PipelineState,
    raw_query: String,
    latest_seq: u64,
    view: SuggestionView,
    visible: bool,
}

impl Default for SuggestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionPipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            raw_query: String::new(),
            latest_seq: 0,
            view: SuggestionView::None,
            visible: false,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn view(&self) -> &SuggestionView {
        &self.view
    }

    /// Whether the suggestion surface is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            state: self.state.clone(),
            view: self.view.clone(),
            visible: self.visible,
        }
    }

    /// Handle a keystroke; `raw` is the full field value
    pub fn input(&mut self, raw: &str) -> TimerCommand {
        self.raw_query = raw.to_string();
        let query = raw.trim();

        if query.is_empty() {
            self.state = PipelineState::Idle;
            self.visible = false;
            return TimerCommand::Cancel;
        }

        self.state = PipelineState::Debouncing {
            query: query.to_string(),
        };
        TimerCommand::Restart
    }

    /// The debounce timer elapsed
    pub fn timer_fired(&mut self) -> Option<FetchRequest> {
        let PipelineState::Debouncing { query } = &self.state else {
            return None;
        };
        let query = query.clone();

        self.latest_seq += 1;
        let seq = self.latest_seq;
        self.state = PipelineState::Fetching {
            query: query.clone(),
            seq,
        };
        self.view = SuggestionView::Searching {
            query: query.clone(),
        };
        self.visible = true;

        tracing::debug!("Fetching suggestions #{} for {:?}", seq, query);
        Some(FetchRequest { seq, query })
    }

    /// A lookup finished; returns whether its result was applied
    pub fn fetch_completed(&mut self, seq: u64, result: GatewayResult<Vec<Book>>) -> bool {
        let query = match &self.state {
            PipelineState::Fetching { query, seq: current }
                if *current == seq && seq == self.latest_seq =>
            {
                query.clone()
            }
            _ => {
                tracing::debug!("Discarding stale suggestions #{}", seq);
                return false;
            }
        };

        match result {
            Ok(mut books) if !books.is_empty() => {
                books.truncate(SUGGESTION_LIMIT);
                self.view = SuggestionView::Results {
                    query: query.clone(),
                    books,
                };
                self.state = PipelineState::Rendered { query };
            }
            Ok(_) => {
                self.view = SuggestionView::Empty {
                    query: query.clone(),
                };
                self.state = PipelineState::Rendered { query };
            }
            Err(e) => {
                log_failure(&query, &e);
                self.view = SuggestionView::None;
                self.visible = false;
                self.state = PipelineState::Failed { query };
            }
        }
        true
    }

    /// Explicit submit (Enter or the search button)
    ///
    /// Always targets the full results view for the trimmed query, whatever the
    /// pipeline is doing; an empty query goes nowhere.
    pub fn submit(&self) -> Option<Route> {
        submit_route(&self.raw_query)
    }

    /// Click outside the field and its surface
    ///
    /// Hides the surface; an in-flight lookup still completes
    pub fn dismiss(&mut self) {
        self.visible = false;
    }
}

fn submit_route(raw: &str) -> Option<Route> {
    let query = raw.trim();
    (!query.is_empty()).then(|| Route::SearchResults(query.to_string()))
}

fn log_failure(query: &str, error: &GatewayError) {
    tracing::warn!("Suggestion lookup for {:?} failed: {}", query, error);
}

enum SearchEvent {
    Input(String),
    Dismiss,
}

/// A search field bound to a gateway
///
/// Created when the view mounts; dropping it stops the driver task. Lookups
/// already in flight are not cancelled, their results are discarded.
pub struct SearchSession {
    events: mpsc::UnboundedSender<SearchEvent>,
    snapshot: watch::Receiver<SearchSnapshot>,
    raw_query: String,
    task: JoinHandle<()>,
}

impl SearchSession {
    /// Start a session; must be called within a tokio runtime
    pub fn spawn(gateway: Arc<dyn BookGateway>, debounce: Duration) -> Self {
        let pipeline = SuggestionPipeline::new();
        let (snapshot_tx, snapshot) = watch::channel(pipeline.snapshot());
        let (events, events_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(pipeline, gateway, debounce, events_rx, snapshot_tx));

        Self {
            events,
            snapshot,
            raw_query: String::new(),
            task,
        }
    }

    /// The field value changed
    pub fn input(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.raw_query = raw.clone();
        let _ = self.events.send(SearchEvent::Input(raw));
    }

    /// Click outside the field
    pub fn dismiss(&self) {
        let _ = self.events.send(SearchEvent::Dismiss);
    }

    /// Enter or search button; see [`SuggestionPipeline::submit`]
    pub fn submit(&self) -> Option<Route> {
        submit_route(&self.raw_query)
    }

    /// Latest published state
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.clone()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive(
    mut pipeline: SuggestionPipeline,
    gateway: Arc<dyn BookGateway>,
    debounce: Duration,
    mut events: mpsc::UnboundedReceiver<SearchEvent>,
    snapshot: watch::Sender<SearchSnapshot>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(u64, GatewayResult<Vec<Book>>)>();
    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);
    let mut armed = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SearchEvent::Input(raw)) => match pipeline.input(&raw) {
                    TimerCommand::Restart => {
                        timer.as_mut().reset(Instant::now() + debounce);
                        armed = true;
                    }
                    TimerCommand::Cancel => armed = false,
                },
                Some(SearchEvent::Dismiss) => pipeline.dismiss(),
                None => break,
            },
            () = &mut timer, if armed => {
                armed = false;
                if let Some(request) = pipeline.timer_fired() {
                    let gateway = gateway.clone();
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        let result = gateway.list_books(&request.filters()).await;
                        let _ = done_tx.send((request.seq, result));
                    });
                }
            }
            Some((seq, result)) = done_rx.recv() => {
                pipeline.fetch_completed(seq, result);
            }
        }

        snapshot.send_replace(pipeline.snapshot());
    }
}
