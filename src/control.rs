//! Widget-facing control.
//!
//! `SuggestControl` is what the surrounding list/input widget talks to. It
//! owns the result cache, debounces keystrokes into searches, keeps at most
//! one live [`JoinToken`], and reports back through [`SuggestView`] and
//! [`FlyoutRenderer`].

use crate::config::SuggestConfig;
use crate::services::{
    url, FlyoutRenderer, JoinToken, ResourceJoiner, ResultCache, SuggestionFetcher, Transport,
};
use crate::types::{Candidate, CandidateList, NewTopic, QueryKey, ReadyEvent, Selection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Callbacks into the list widget.
pub trait SuggestView: Send + Sync {
    /// Candidates to render for the query that produced them.
    fn show_candidates(&self, key: &QueryKey, list: CandidateList);

    /// The query matched nothing. `suggest_new` carries the "create new"
    /// label when that affordance is enabled.
    fn show_no_match(&self, key: &QueryKey, suggest_new: Option<&str>);

    /// A candidate was chosen.
    fn selected(&self, selection: Selection);

    /// The "create new" affordance was chosen.
    fn suggest_new(&self, topic: NewTopic);
}

/// Predicate applied to every delivered candidate list.
pub type CandidateFilter = Arc<dyn Fn(&Candidate) -> bool + Send + Sync>;

/// The suggestion core for one widget.
pub struct SuggestControl<T> {
    fetcher: SuggestionFetcher<T>,
    joiner: ResourceJoiner<T>,
    cache: Arc<ResultCache>,
    config: Arc<SuggestConfig>,
    view: Arc<dyn SuggestView>,
    renderer: Arc<dyn FlyoutRenderer>,
    filter: Option<CandidateFilter>,
    /// Bumped on every query-text change; only the newest search is shown.
    generation: Arc<AtomicU64>,
    /// Bumped on every highlight change or hide; only the newest join is shown.
    highlight: Arc<AtomicU64>,
    current: Mutex<Option<JoinToken>>,
}

impl<T: Transport> SuggestControl<T> {
    #[must_use]
    pub fn new(
        transport: Arc<T>,
        config: SuggestConfig,
        view: Arc<dyn SuggestView>,
        renderer: Arc<dyn FlyoutRenderer>,
    ) -> Self {
        let cache = Arc::new(ResultCache::new());
        let config = Arc::new(config);
        Self {
            fetcher: SuggestionFetcher::new(
                Arc::clone(&transport),
                Arc::clone(&cache),
                Arc::clone(&config),
            ),
            joiner: ResourceJoiner::new(transport, Arc::clone(&cache), Arc::clone(&config)),
            cache,
            config,
            view,
            renderer,
            filter: None,
            generation: Arc::new(AtomicU64::new(0)),
            highlight: Arc::new(AtomicU64::new(0)),
            current: Mutex::new(None),
        }
    }

    /// Drops candidates for which `filter` returns false before they reach the view.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&Candidate) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// The input text changed.
    ///
    /// Waits out the configured delay, then searches unless a newer change
    /// arrived meanwhile. A result is shown only if it still answers the
    /// newest text when it lands. Returns `None` for empty text, which
    /// also discards any pending search.
    pub fn on_query_text_changed(&self, context: &str, text: &str) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if text.is_empty() {
            return None;
        }

        let fetcher = self.fetcher.clone();
        let latest = Arc::clone(&self.generation);
        let view = Arc::clone(&self.view);
        let filter = self.filter.clone();
        let delay = self.config.xhr_delay();
        let suggest_new = self.config.suggest_new.clone();
        let context = context.to_string();
        let text = text.to_string();

        Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }
            let Some(delivery) = fetcher.fetch(&context, &text) else {
                return;
            };
            let key = delivery.key().clone();

            let list = match delivery.await {
                Ok(list) => list,
                Err(e) => {
                    tracing::debug!("no suggestions for {}: {}", key, e.code());
                    return;
                }
            };
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!("dropping stale suggestions for {}", key);
                return;
            }

            let list = match &filter {
                Some(keep) => list.iter().filter(|c| keep(*c)).cloned().collect(),
                None => list,
            };
            if list.is_empty() {
                view.show_no_match(&key, suggest_new.as_deref());
            } else {
                view.show_candidates(&key, list);
            }
        }))
    }

    /// The highlighted candidate changed: cancel the previous join and
    /// start one for `candidate`.
    ///
    /// A join that already fired but whose flyout had not yet reached the
    /// renderer is also suppressed once the highlight has moved on.
    pub fn on_highlight_changed(&self, candidate: Candidate) -> JoinToken {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let highlight = self.highlight.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = current.take() {
            self.joiner.cancel(&previous);
        }
        let renderer = Arc::new(HighlightRenderer {
            highlight,
            latest: Arc::clone(&self.highlight),
            inner: Arc::clone(&self.renderer),
        });
        let token = self.joiner.begin(candidate, renderer);
        *current = Some(token.clone());
        token
    }

    /// The list or flyout was hidden: cancel the live join, if any.
    pub fn on_hidden(&self) {
        let previous = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            self.highlight.fetch_add(1, Ordering::SeqCst);
            current.take()
        };
        if let Some(previous) = previous {
            self.joiner.cancel(&previous);
        }
    }

    /// A candidate was chosen.
    pub fn select(&self, candidate: &Candidate) {
        self.on_hidden();
        tracing::info!("selected {} ({})", candidate.id, candidate.name);
        self.view.selected(Selection {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
        });
    }

    /// The "create new" affordance was chosen for `name`.
    pub fn suggest_new(&self, name: &str) {
        self.on_hidden();
        tracing::info!("suggest new topic {:?}", name);
        self.view.suggest_new(NewTopic {
            name: name.to_string(),
        });
    }

    /// Detaches the control: cancels pending work and drops cached results.
    /// Fetches still in flight finish without writing to the cache.
    pub fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.on_hidden();
        self.cache.close();
    }

    /// Canonical browse link for a candidate.
    #[must_use]
    pub fn browse_url(&self, candidate: &Candidate) -> String {
        url::browse_url(&self.config, &candidate.id)
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    #[must_use]
    pub fn fetcher(&self) -> &SuggestionFetcher<T> {
        &self.fetcher
    }

    #[must_use]
    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }
}

/// Forwards a ready event only while its highlight is still the newest.
struct HighlightRenderer {
    highlight: u64,
    latest: Arc<AtomicU64>,
    inner: Arc<dyn FlyoutRenderer>,
}

impl FlyoutRenderer for HighlightRenderer {
    fn show_flyout(&self, ready: ReadyEvent) {
        if self.latest.load(Ordering::SeqCst) != self.highlight {
            tracing::debug!("dropping flyout for {}: highlight moved", ready.candidate.id);
            return;
        }
        self.inner.show_flyout(ready);
    }
}

/// Everything a [`ChannelView`] was told, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Candidates(QueryKey, CandidateList),
    NoMatch(QueryKey, Option<String>),
    Selected(Selection),
    SuggestNew(NewTopic),
}

/// [`SuggestView`] that forwards every call as a message, for front-ends
/// that consume results from their own event loop.
pub struct ChannelView {
    tx: mpsc::UnboundedSender<ViewEvent>,
}

impl ChannelView {
    #[must_use]
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    fn send(&self, event: ViewEvent) {
        // Receiver gone means the front-end shut down; nothing to show.
        let _ = self.tx.send(event);
    }
}

impl SuggestView for ChannelView {
    fn show_candidates(&self, key: &QueryKey, list: CandidateList) {
        self.send(ViewEvent::Candidates(key.clone(), list));
    }

    fn show_no_match(&self, key: &QueryKey, suggest_new: Option<&str>) {
        self.send(ViewEvent::NoMatch(key.clone(), suggest_new.map(str::to_string)));
    }

    fn selected(&self, selection: Selection) {
        self.send(ViewEvent::Selected(selection));
    }

    fn suggest_new(&self, topic: NewTopic) {
        self.send(ViewEvent::SuggestNew(topic));
    }
}

/// [`FlyoutRenderer`] that forwards ready events as messages.
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<ReadyEvent>,
}

impl ChannelRenderer {
    #[must_use]
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ReadyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl FlyoutRenderer for ChannelRenderer {
    fn show_flyout(&self, ready: ReadyEvent) {
        let _ = self.tx.send(ready);
    }
}
