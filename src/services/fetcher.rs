//! Search request pipeline.
//!
//! One GET per uncached query; the result is cached on success and then
//! delivered. Cache hits are delivered through the same spawned-task path
//! so callers never see a result inside the call that asked for it.

use crate::config::SuggestConfig;
use crate::error::{SuggestError, SuggestResult};
use crate::services::cache::ResultCache;
use crate::services::transport::{Response, Transport};
use crate::services::url;
use crate::types::{Candidate, CandidateList, QueryKey};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// Envelope code the search service uses for a successful response.
const STATUS_OK_CODE: &str = "/api/status/ok";

/// A pending candidate-list delivery.
///
/// Resolves to the list, or to the error that prevented delivery.
pub struct Delivery {
    key: QueryKey,
    handle: JoinHandle<SuggestResult<CandidateList>>,
}

impl Delivery {
    /// The query this delivery answers.
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Whether the result is already available.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for Delivery {
    type Output = SuggestResult<CandidateList>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.map_err(SuggestError::from).and_then(|r| r))
    }
}

/// Issues search requests and deduplicates them through the cache.
pub struct SuggestionFetcher<T> {
    transport: Arc<T>,
    cache: Arc<ResultCache>,
    config: Arc<SuggestConfig>,
}

impl<T> Clone for SuggestionFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Transport> SuggestionFetcher<T> {
    #[must_use]
    pub fn new(transport: Arc<T>, cache: Arc<ResultCache>, config: Arc<SuggestConfig>) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    /// Fetches candidates for `query_text` typed into `context`.
    ///
    /// Returns `None` for empty query text: nothing is requested and
    /// nothing will be delivered. Must be called within a tokio runtime.
    pub fn fetch(&self, context: &str, query_text: &str) -> Option<Delivery> {
        if query_text.is_empty() {
            return None;
        }

        let key = QueryKey::new(context, query_text);

        if let Some(list) = self.cache.get_candidates(&key) {
            tracing::debug!("search cache hit for {}", key);
            let handle = tokio::spawn(async move { Ok(list) });
            return Some(Delivery { key, handle });
        }

        tracing::debug!("search cache miss for {}", key);
        let url = url::search_url(&self.config, query_text);
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = match transport.get(&url).await {
                Ok(response) => decode_candidates(&response),
                Err(e) => Err(SuggestError::from(e)),
            };
            match result {
                Ok(list) => {
                    cache.put_candidates(task_key, Arc::clone(&list));
                    Ok(list)
                }
                Err(e) => {
                    tracing::warn!("search for {} failed: {}", task_key, e);
                    Err(e)
                }
            }
        });

        Some(Delivery { key, handle })
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &Arc<SuggestConfig> {
        &self.config
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<Candidate>),
    Envelope {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        result: Option<Vec<Candidate>>,
    },
}

/// Decodes a search response body into a candidate list.
///
/// Accepts either a bare JSON array or the service envelope
/// `{"status", "code", "result"}`.
///
/// # Errors
///
/// `SuggestError::Service` for a non-success HTTP status or envelope code,
/// `SuggestError::Decode` for a body that is not a candidate list.
pub fn decode_candidates(response: &Response) -> SuggestResult<CandidateList> {
    if !response.is_success() {
        return Err(SuggestError::status(response.status));
    }

    match serde_json::from_slice::<SearchResponse>(&response.body)? {
        SearchResponse::Bare(list) => Ok(Arc::from(list)),
        SearchResponse::Envelope {
            status,
            code,
            result,
        } => match code {
            Some(code) if code != STATUS_OK_CODE => Err(SuggestError::Service {
                status: status.unwrap_or_default(),
                code,
            }),
            _ => Ok(Arc::from(result.unwrap_or_default())),
        },
    }
}
