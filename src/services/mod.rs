//! Core services: caching, URL building, search fetches and detail joins.

mod cache;
pub mod fetcher;
pub mod joiner;
pub mod transport;
pub mod url;

pub use cache::ResultCache;
pub use fetcher::{Delivery, SuggestionFetcher};
pub use joiner::{FlyoutRenderer, JoinToken, ResourceJoiner};
pub use transport::{HttpTransport, Response, Transport};
