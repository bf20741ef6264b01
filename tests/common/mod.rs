//! Common test utilities for entity-suggest integration tests.
//!
//! Provides `TestEnv` for setting up a control wired to a scripted
//! transport, with channels capturing what the widget would be shown.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use entity_suggest::control::{ChannelRenderer, ChannelView, ViewEvent};
use entity_suggest::services::{ResourceJoiner, ResultCache, SuggestionFetcher};
use entity_suggest::test_utils::{next_within, ScriptedTransport};
use entity_suggest::{ReadyEvent, SuggestConfig, SuggestControl};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Generous upper bound for anything that is expected to arrive.
pub const WAIT: Duration = Duration::from_secs(2);

/// Short window used to assert that something does NOT arrive.
pub const QUIET: Duration = Duration::from_millis(100);

pub const SEARCH: &str = "/api/service/search";
pub const BLURB: &str = "/api/trans/blurb";
pub const THUMB: &str = "/api/trans/image_thumb";

/// Configuration pointing at a fake host, with no keystroke delay.
pub fn test_config() -> SuggestConfig {
    SuggestConfig {
        service_url: "http://suggest.test".to_string(),
        xhr_delay_ms: 0,
        ..SuggestConfig::default()
    }
}

/// A complete test environment with the control and its observers.
pub struct TestEnv {
    pub transport: Arc<ScriptedTransport>,
    pub control: SuggestControl<ScriptedTransport>,
    pub views: UnboundedReceiver<ViewEvent>,
    pub ready: UnboundedReceiver<ReadyEvent>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: SuggestConfig) -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let (view, views) = ChannelView::new();
        let (renderer, ready) = ChannelRenderer::new();
        let control = SuggestControl::new(Arc::clone(&transport), config, view, renderer);
        Self {
            transport,
            control,
            views,
            ready,
        }
    }

    pub async fn next_view(&mut self) -> Option<ViewEvent> {
        next_within(&mut self.views, WAIT).await
    }

    pub async fn next_ready(&mut self) -> Option<ReadyEvent> {
        next_within(&mut self.ready, WAIT).await
    }

    /// Asserts no ready event arrives within the quiet window.
    pub async fn assert_no_ready(&mut self) {
        let event = next_within(&mut self.ready, QUIET).await;
        assert!(event.is_none(), "unexpected ready event: {event:?}");
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Standalone fetcher + joiner sharing one cache, for component tests.
pub struct Components {
    pub transport: Arc<ScriptedTransport>,
    pub cache: Arc<ResultCache>,
    pub fetcher: SuggestionFetcher<ScriptedTransport>,
    pub joiner: ResourceJoiner<ScriptedTransport>,
}

pub fn components() -> Components {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = Arc::new(ResultCache::new());
    let config = Arc::new(test_config());
    Components {
        fetcher: SuggestionFetcher::new(
            Arc::clone(&transport),
            Arc::clone(&cache),
            Arc::clone(&config),
        ),
        joiner: ResourceJoiner::new(Arc::clone(&transport), Arc::clone(&cache), config),
        transport,
        cache,
    }
}

/// Search response envelope as the service returns it.
pub fn envelope(result: Value) -> Value {
    json!({
        "status": "200 OK",
        "code": "/api/status/ok",
        "result": result,
    })
}

/// Search response for "par".
pub fn paris_results() -> Value {
    envelope(json!([
        {
            "id": "/en/paris",
            "name": "Paris",
            "type": [{"id": "/location/citytown", "name": "City/Town"}],
            "article": {"id": "/en/paris"},
            "image": {"id": "/en/paris"}
        }
    ]))
}

/// Yields to the runtime until `cond` holds, panicking after `WAIT`.
pub async fn until(what: &str, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
