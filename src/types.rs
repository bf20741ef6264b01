//! Domain types for entity-suggest.
//!
//! Candidates are opaque payloads beyond the identifying fields the
//! fetch and join layers need; display formatting happens elsewhere.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies one cached candidate list: the input context the query was
/// typed into plus the literal query text.
///
/// Equality is exact on both parts. No case folding or whitespace
/// trimming is applied, so "Par" and "par " are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    context: String,
    text: String,
}

impl QueryKey {
    #[must_use]
    pub fn new(context: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.context, self.text)
    }
}

/// A reference to another resource.
///
/// The search service emits references either as a bare id string or as an
/// object carrying an `id` (and usually a `name`); both deserialize here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReference")]
pub struct Reference {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Id(String),
    Object {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        match raw {
            RawReference::Id(id) => Self { id, name: None },
            RawReference::Object { id, name } => Self { id, name },
        }
    }
}

/// One search result returned by the remote search service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        default,
        alias = "type",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub types: Vec<Reference>,
    #[serde(
        default,
        alias = "domain",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub domains: Vec<Reference>,
    #[serde(
        default,
        alias = "alias",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Reference>,
}

impl Candidate {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_article(mut self, id: impl Into<String>) -> Self {
        self.article = Some(Reference::new(id));
        self
    }

    #[must_use]
    pub fn with_image(mut self, id: impl Into<String>) -> Self {
        self.image = Some(Reference::new(id));
        self
    }

    /// Whether this candidate carries enough identifying data to show a
    /// detail flyout: an id plus at least one of article or image.
    #[must_use]
    pub fn has_detail(&self) -> bool {
        !self.id.is_empty() && (self.article.is_some() || self.image.is_some())
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered candidates for one query. Immutable once cached; cloning is a
/// reference-count bump.
pub type CandidateList = Arc<[Candidate]>;

/// A resolved auxiliary resource, cached by resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEntry {
    /// Descriptive text (blurb) for an article id.
    Text(String),
    /// Thumbnail URL for an image id, whether or not the image loaded.
    ImageUrl(String),
}

/// Which auxiliary resource an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Text,
    Image,
}

impl ResourceEntry {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Text(_) => ResourceKind::Text,
            Self::ImageUrl(_) => ResourceKind::Image,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::ImageUrl(s) => s,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) | Self::ImageUrl(s) => s,
        }
    }
}

/// Emitted once per join when both the text and the image have resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyEvent {
    pub candidate: Candidate,
    pub text: String,
    pub image_url: String,
}

/// Notification payload when a candidate is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub id: String,
    pub name: String,
}

/// Notification payload when the "create new" affordance is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTopic {
    pub name: String,
}

// Compile-time assertions for thread safety.
// These ensure Send+Sync remain implemented and catch regressions.
#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<QueryKey>();
    assert_send_sync::<Candidate>();
    assert_send_sync::<CandidateList>();
    assert_send_sync::<ResourceEntry>();
    assert_send_sync::<ReadyEvent>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_key_exact_match() {
        assert_eq!(QueryKey::new("ctx1", "par"), QueryKey::new("ctx1", "par"));
        assert_ne!(QueryKey::new("ctx1", "par"), QueryKey::new("ctx2", "par"));
        assert_ne!(QueryKey::new("ctx1", "par"), QueryKey::new("ctx1", "Par"));
        assert_ne!(QueryKey::new("ctx1", "par"), QueryKey::new("ctx1", "par "));
    }

    #[test]
    fn test_reference_bare_and_object() {
        let bare: Reference = serde_json::from_str(r#""/en/paris""#).unwrap();
        assert_eq!(bare, Reference::new("/en/paris"));

        let obj: Reference =
            serde_json::from_str(r#"{"id": "/location/citytown", "name": "City/Town"}"#).unwrap();
        assert_eq!(obj.id, "/location/citytown");
        assert_eq!(obj.name.as_deref(), Some("City/Town"));
    }

    #[test]
    fn test_candidate_from_service_json() {
        let json = r##"{
            "id": "/en/paris",
            "name": "Paris",
            "type": [{"id": "/location/citytown", "name": "City/Town"}],
            "alias": ["City of Light"],
            "article": {"id": "/guid/9202a8c04000641f80000000000ca"},
            "image": "/wikipedia/images/commons_id/1234",
            "guid": "#9202a8c04000641f8000000000009d00"
        }"##;
        let c: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, "/en/paris");
        assert_eq!(c.types.len(), 1);
        assert_eq!(c.aliases, vec!["City of Light".to_string()]);
        assert_eq!(
            c.article.as_ref().map(|r| r.id.as_str()),
            Some("/guid/9202a8c04000641f80000000000ca")
        );
        assert!(c.has_detail());
    }

    #[test]
    fn test_candidate_null_fields() {
        let c: Candidate = serde_json::from_str(r#"{"id": "/m/x", "name": null, "type": null}"#)
            .unwrap();
        assert_eq!(c.name, "");
        assert!(c.types.is_empty());
        assert!(!c.has_detail());
    }

    #[test]
    fn test_has_detail_requires_id() {
        let c = Candidate::new("", "Nameless").with_article("/en/x");
        assert!(!c.has_detail());
        let c = Candidate::new("/en/x", "X").with_image("/en/x");
        assert!(c.has_detail());
    }
}
