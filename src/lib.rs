//! entity-suggest: incremental entity search suggestions.
//!
//! As the user types, the control queries a remote search service and hands
//! ranked candidates to the list widget. For the highlighted candidate it
//! fetches a short description and a thumbnail in parallel and reveals the
//! detail flyout only once both have arrived.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        List / input widget (external)       │
//! │   SuggestView          FlyoutRenderer       │
//! └───────┬───────────────────────▲─────────────┘
//!         │ text / highlight /     │ candidates / ready
//!         │ hidden                 │
//! ┌───────▼───────────────────────┴─────────────┐
//! │               SuggestControl                │
//! │   debounce, filter, one live JoinToken      │
//! └───────┬───────────────────────┬─────────────┘
//!         │                       │
//!  ┌──────▼────────────┐  ┌───────▼────────────┐
//!  │ SuggestionFetcher │  │  ResourceJoiner    │
//!  │ search + wildcard │  │  blurb ∥ thumbnail │
//!  └──────┬────────────┘  └───────┬────────────┘
//!         │                       │
//!  ┌──────▼───────────────────────▼────────────┐
//!  │   ResultCache        UrlBuilder           │
//!  │   Transport (reqwest)                     │
//!  └───────────────────────────────────────────┘
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod fmt;
pub mod services;
#[doc(hidden)]
pub mod test_utils;
pub mod types;

pub use config::SuggestConfig;
pub use control::{SuggestControl, SuggestView};
pub use error::{SuggestError, SuggestResult};
pub use types::{Candidate, CandidateList, QueryKey, ReadyEvent, ResourceEntry};
