//! Two-resource join for the detail flyout.
//!
//! For a highlighted candidate the blurb text and the thumbnail are fetched
//! independently. Each completion writes one slot of a shared [`JoinToken`];
//! the write that fills the second slot fires the ready event. A disabled
//! token swallows all further writes, so a superseded selection can never
//! surface after a newer one.

use crate::config::SuggestConfig;
use crate::services::cache::ResultCache;
use crate::services::transport::Transport;
use crate::services::url;
use crate::types::{Candidate, ReadyEvent, ResourceEntry, ResourceKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Receives the joined detail data. Implemented by the popup layer.
pub trait FlyoutRenderer: Send + Sync {
    fn show_flyout(&self, ready: ReadyEvent);
}

#[derive(Debug, Default)]
struct JoinState {
    text: Option<String>,
    image: Option<String>,
    disabled: bool,
    fired: bool,
}

struct JoinInner {
    seq: u64,
    candidate: Candidate,
    state: Mutex<JoinState>,
    renderer: Arc<dyn FlyoutRenderer>,
}

/// Handle to one in-flight reveal attempt.
///
/// Cloning yields another handle to the same slots. The ready event fires
/// at most once per token, and never after [`disable`](Self::disable).
#[derive(Clone)]
pub struct JoinToken {
    inner: Arc<JoinInner>,
}

impl JoinToken {
    fn new(seq: u64, candidate: Candidate, renderer: Arc<dyn FlyoutRenderer>) -> Self {
        Self {
            inner: Arc::new(JoinInner {
                seq,
                candidate,
                state: Mutex::new(JoinState::default()),
                renderer,
            }),
        }
    }

    /// Sequence number, unique per joiner.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.inner.seq
    }

    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.inner.candidate
    }

    /// Stops this token from ever firing. Idempotent.
    pub fn disable(&self) {
        self.lock().disabled = true;
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.lock().disabled
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.lock().fired
    }

    /// Writes the text slot. Returns whether the write was accepted.
    pub fn write_text(&self, text: String) -> bool {
        self.write(ResourceKind::Text, text)
    }

    /// Writes the image slot. Returns whether the write was accepted.
    pub fn write_image(&self, image_url: String) -> bool {
        self.write(ResourceKind::Image, image_url)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JoinState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self, slot: ResourceKind, value: String) -> bool {
        let ready = {
            let mut state = self.lock();
            if state.disabled || state.fired {
                return false;
            }
            match slot {
                ResourceKind::Text => state.text = Some(value),
                ResourceKind::Image => state.image = Some(value),
            }
            if state.text.is_none() || state.image.is_none() {
                return true;
            }
            state.fired = true;
            ReadyEvent {
                candidate: self.inner.candidate.clone(),
                text: state.text.take().unwrap_or_default(),
                image_url: state.image.take().unwrap_or_default(),
            }
        };

        tracing::debug!("join #{} ready for {}", self.inner.seq, ready.candidate.id);
        // Renderer runs outside the lock so it may call back into the token.
        self.inner.renderer.show_flyout(ready);
        true
    }
}

impl std::fmt::Debug for JoinToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinToken")
            .field("seq", &self.inner.seq)
            .field("candidate", &self.inner.candidate.id)
            .field("state", &*self.lock())
            .finish()
    }
}

/// Starts text + image joins for highlighted candidates.
pub struct ResourceJoiner<T> {
    transport: Arc<T>,
    cache: Arc<ResultCache>,
    config: Arc<SuggestConfig>,
    next_seq: AtomicU64,
}

impl<T: Transport> ResourceJoiner<T> {
    #[must_use]
    pub fn new(transport: Arc<T>, cache: Arc<ResultCache>, config: Arc<SuggestConfig>) -> Self {
        Self {
            transport,
            cache,
            config,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Begins a join for `candidate`, delivering to `renderer` when ready.
    ///
    /// Candidates without an id, or with neither an article nor an image,
    /// get a token that never fires and no fetch is started. Must be called
    /// within a tokio runtime.
    pub fn begin(&self, candidate: Candidate, renderer: Arc<dyn FlyoutRenderer>) -> JoinToken {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = JoinToken::new(seq, candidate, renderer);

        let candidate = token.candidate();
        if !candidate.has_detail() {
            tracing::debug!("join #{} skipped: no detail for {:?}", seq, candidate.id);
            return token;
        }
        tracing::debug!("join #{} begins for {}", seq, candidate.id);

        match &candidate.article {
            Some(article) => self.spawn_text(token.clone(), article.id.clone()),
            None => {
                token.write_text(self.config.text_placeholder.clone());
            }
        }

        match &candidate.image {
            Some(image) => self.spawn_image(token.clone(), image.id.clone()),
            None => {
                token.write_image(self.config.no_image_url.clone());
            }
        }

        token
    }

    /// Cancels `token`. In-flight requests run to completion; their results
    /// still warm the cache but are not delivered.
    pub fn cancel(&self, token: &JoinToken) {
        if !token.has_fired() {
            tracing::debug!("join #{} cancelled", token.seq());
        }
        token.disable();
    }

    fn spawn_text(&self, token: JoinToken, id: String) {
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            if let Some(entry) = cache.get_resource(ResourceKind::Text, &id) {
                token.write_text(entry.into_string());
                return;
            }

            let url = url::text_url(&config, &id);
            match transport.get(&url).await {
                Ok(response) if response.is_success() => {
                    let text = response.text();
                    cache.put_resource(id, ResourceEntry::Text(text.clone()));
                    token.write_text(text);
                }
                Ok(response) => {
                    tracing::warn!("blurb for {} returned status {}", id, response.status);
                }
                Err(e) => {
                    tracing::warn!("blurb for {} failed: {}", id, e);
                }
            }
        });
    }

    fn spawn_image(&self, token: JoinToken, id: String) {
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            if let Some(entry) = cache.get_resource(ResourceKind::Image, &id) {
                token.write_image(entry.into_string());
                return;
            }

            let url = url::image_url(&config, &id);
            // A broken thumbnail is still a resolved thumbnail.
            match transport.get(&url).await {
                Ok(response) if !response.is_success() => {
                    tracing::debug!("thumbnail for {} returned status {}", id, response.status);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("thumbnail for {} failed: {}", id, e);
                }
            }
            cache.put_resource(id, ResourceEntry::ImageUrl(url.clone()));
            token.write_image(url);
        });
    }
}

#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JoinToken>();
};
