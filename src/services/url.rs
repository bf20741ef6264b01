//! URL construction for search, blurb, thumbnail and browse links.
//!
//! Pure functions over [`SuggestConfig`]. The base URL is not validated;
//! a malformed one shows up later as a failed request.

use crate::config::{SuggestConfig, WILDCARD_MARKER};
use std::collections::BTreeMap;

/// Escapes a resource id for use as a path suffix.
///
/// Ids that already start with `/` are path-shaped and used verbatim.
/// Anything else is percent-encoded and prefixed with `/`.
#[must_use]
pub fn escape_id(id: &str) -> String {
    if id.starts_with('/') {
        id.to_string()
    } else {
        format!("/{}", urlencoding::encode(id))
    }
}

/// Serializes a parameter mapping into `k=v&k=v` form.
#[must_use]
pub fn query_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn with_query(mut url: String, params: &BTreeMap<String, String>) -> String {
    let qs = query_string(params);
    if !qs.is_empty() {
        url.push('?');
        url.push_str(&qs);
    }
    url
}

/// Search request URL for `query_text`, with the wildcard marker appended.
#[must_use]
pub fn search_url(config: &SuggestConfig, query_text: &str) -> String {
    let mut params = config.effective_search_params();
    params.insert(
        config.search_param.clone(),
        format!("{query_text}{WILDCARD_MARKER}"),
    );
    with_query(
        format!("{}{}", config.service_url, config.search_path),
        &params,
    )
}

/// Descriptive-text URL for an article id.
#[must_use]
pub fn text_url(config: &SuggestConfig, id: &str) -> String {
    with_query(
        format!("{}{}{}", config.service_url, config.text_path, escape_id(id)),
        &config.text_params,
    )
}

/// Thumbnail URL for an image id.
#[must_use]
pub fn image_url(config: &SuggestConfig, id: &str) -> String {
    with_query(
        format!("{}{}{}", config.service_url, config.image_path, escape_id(id)),
        &config.image_params,
    )
}

/// Canonical browse link for a topic id.
#[must_use]
pub fn browse_url(config: &SuggestConfig, id: &str) -> String {
    format!("{}{}{}", config.service_url, config.browse_path, escape_id(id))
}
