//! Widget configuration.
//!
//! Every URL the core builds is derived from these fields. Query-parameter
//! mappings are ordered maps so serialized query strings are deterministic.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration for one suggest control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Base URL of the service (scheme + host, no trailing slash)
    pub service_url: String,
    /// Path of the search endpoint
    pub search_path: String,
    /// Query parameter carrying the typed text plus the wildcard marker
    pub search_param: String,
    /// Extra search parameters (limit, start, type filter...)
    pub search_params: BTreeMap<String, String>,
    /// Optional type filter, sent as the `type` search parameter
    pub type_filter: Option<String>,
    /// Path of the descriptive-text (blurb) endpoint
    pub text_path: String,
    pub text_params: BTreeMap<String, String>,
    /// Path of the thumbnail endpoint
    pub image_path: String,
    pub image_params: BTreeMap<String, String>,
    /// Path prefix for canonical browse links
    pub browse_path: String,
    /// Text shown when a candidate has no article
    pub text_placeholder: String,
    /// Image shown when a candidate has no image
    pub no_image_url: String,
    /// Keystroke debounce before a search is issued, in milliseconds
    pub xhr_delay_ms: u64,
    /// Label for the "create new" affordance; `None` disables it
    pub suggest_new: Option<String>,
}

/// Suffix appended to the query text so the service matches prefixes.
pub const WILDCARD_MARKER: &str = "*";

/// Default number of candidates requested per search.
pub const DEFAULT_LIMIT: usize = 10;

const DEFAULT_SERVICE_URL: &str = "https://www.freebase.com";

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            search_path: "/api/service/search".to_string(),
            search_param: "prefix".to_string(),
            search_params: params(&[("limit", &DEFAULT_LIMIT.to_string()), ("start", "0")]),
            type_filter: None,
            text_path: "/api/trans/blurb".to_string(),
            text_params: params(&[("maxlength", "300")]),
            image_path: "/api/trans/image_thumb".to_string(),
            image_params: params(&[("maxheight", "70"), ("maxwidth", "70")]),
            browse_path: "/view".to_string(),
            text_placeholder: String::new(),
            no_image_url: format!("{DEFAULT_SERVICE_URL}/resources/images/no_image.png"),
            xhr_delay_ms: 200,
            suggest_new: None,
        }
    }
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl SuggestConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid JSON for this struct.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sets the result limit (`limit` search parameter).
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.search_params
            .insert("limit".to_string(), limit.to_string());
        self
    }

    /// Search parameters as sent on the wire, type filter included.
    #[must_use]
    pub fn effective_search_params(&self) -> BTreeMap<String, String> {
        let mut params = self.search_params.clone();
        if let Some(filter) = &self.type_filter {
            params.insert("type".to_string(), filter.clone());
        }
        params
    }

    #[must_use]
    pub fn xhr_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.xhr_delay_ms)
    }
}
