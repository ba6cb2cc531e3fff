//! Client library for the GISUL talent-matching platform API.
//!
//! The centerpiece is the progressive search flow: the backend answers a
//! text search either with one JSON object or with an NDJSON stream of
//! match events, and [`SearchClient::search_by_text_streaming`] surfaces
//! those events to a caller-supplied progress callback while the stream is
//! still running.

pub mod aggregator;
pub mod client;
pub mod config;
pub mod error;
pub mod expansion;
pub mod stream;
pub mod token;
pub mod types;

pub use client::SearchClient;
pub use config::ClientConfig;
pub use error::{classify_error_text, ErrorCategory, SearchError};
pub use expansion::{DomainExpansionCache, ExpandedDomain};
pub use types::{ProgressUpdate, SearchRequest, SearchResults, UserRole};
