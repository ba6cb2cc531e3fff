// src/client.rs
//! HTTP client for the GISUL search API.
//!
//! `search_by_text` drives the whole flow: POST the query, pick stream or
//! whole-body mode from the response `Content-Type`, then either consume the
//! NDJSON stream incrementally or parse the body as one JSON document.

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregator::{Accumulator, StepOutcome};
use crate::config::ClientConfig;
use crate::error::SearchError;
use crate::expansion::{DomainExpansionCache, ExpandDomainResponse, ExpandedDomain};
use crate::stream::NdjsonParser;
use crate::types::{ProgressUpdate, SearchRequest, SearchResults};

const SEARCH_BY_TEXT_ENDPOINT: &str = "/search_by_text";
const EXPAND_DOMAIN_ENDPOINT: &str = "/admin/expand_domain";

/// How to interpret a successful search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseMode {
    /// NDJSON stream of events, consumed incrementally.
    Stream,
    /// One complete JSON result object.
    Json,
    /// HTML body, diagnostic of a misrouted base URL.
    Html,
}

/// Pick the consumption mode from the response content type.
///
/// An absent or unrecognized content type falls back to the stream path,
/// which degrades cleanly: a single JSON object body is still one line.
fn select_mode(content_type: &str) -> ResponseMode {
    let ct = content_type.to_lowercase();
    if ct.contains("ndjson") {
        ResponseMode::Stream
    } else if ct.contains("text/html") {
        ResponseMode::Html
    } else if ct.contains("application/json") {
        ResponseMode::Json
    } else {
        ResponseMode::Stream
    }
}

pub struct SearchClient {
    client: reqwest::Client,
    config: ClientConfig,
    expansion_cache: DomainExpansionCache,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Result<Self, SearchError> {
        Self::with_expansion_cache(config, DomainExpansionCache::new())
    }

    /// Construct with a caller-supplied cache (tests inject a manual clock).
    pub fn with_expansion_cache(
        config: ClientConfig,
        expansion_cache: DomainExpansionCache,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            expansion_cache,
        })
    }

    pub fn role(&self) -> crate::types::UserRole {
        self.config.role
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Search without progress reporting or cancellation.
    pub async fn search_by_text(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResults, SearchError> {
        self.search_by_text_streaming(request, |_| {}, &CancellationToken::new())
            .await
    }

    /// Search, invoking `on_progress` synchronously as results stream in.
    ///
    /// The cancellation token is checked between chunk reads; once it fires,
    /// the stream is dropped and `on_progress` is never called again.
    pub async fn search_by_text_streaming(
        &self,
        request: &SearchRequest,
        mut on_progress: impl FnMut(ProgressUpdate),
        cancel: &CancellationToken,
    ) -> Result<SearchResults, SearchError> {
        let url = format!(
            "{}{}{}",
            self.config.base_url,
            self.config.role.api_prefix(),
            SEARCH_BY_TEXT_ENDPOINT
        );

        info!(url = %url, query = %request.query, "Starting text search");

        let response = self
            .authorized(self.client.post(&url).json(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Search request rejected");
            return Err(SearchError::HttpStatus { status, body });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match select_mode(&content_type) {
            ResponseMode::Html => Err(SearchError::HtmlBody),
            ResponseMode::Json => parse_whole_body(response).await,
            ResponseMode::Stream => {
                self.consume_stream(response, &mut on_progress, cancel).await
            }
        }
    }

    async fn consume_stream(
        &self,
        response: Response,
        on_progress: &mut dyn FnMut(ProgressUpdate),
        cancel: &CancellationToken,
    ) -> Result<SearchResults, SearchError> {
        let mut stream = Box::pin(response.bytes_stream());
        let mut parser = NdjsonParser::new();
        let mut accumulator = Accumulator::new();

        loop {
            // Biased so cancellation wins over an already-buffered chunk.
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Search stream cancelled by caller");
                    return Err(SearchError::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else { break };
            let bytes = chunk?;

            for event in parser.feed(&bytes) {
                match accumulator.apply(event, &mut *on_progress)? {
                    StepOutcome::Continue => {}
                    // Terminal event: return without draining remaining bytes.
                    StepOutcome::Finished(results) => return Ok(results),
                }
            }
        }

        // Natural EOF. Flush a trailing unterminated line, then fall back to
        // the accumulated state; a stream that never said "complete" is a
        // best-effort result, not an error.
        if let Some(event) = parser.finish() {
            if let StepOutcome::Finished(results) = accumulator.apply(event, &mut *on_progress)? {
                return Ok(results);
            }
        }
        debug!("Stream ended without a complete event; returning accumulated matches");
        Ok(accumulator.into_partial_results())
    }

    /// Expand a skill domain into related keywords, cached for 30 minutes.
    ///
    /// Never fails: a network or server error degrades to the literal
    /// normalized domain as the only keyword, so searches that depend on the
    /// expansion are never blocked by it.
    pub async fn expand_domain(&self, domain: &str) -> ExpandedDomain {
        let normalized = DomainExpansionCache::normalize(domain);

        if let Some(keywords) = self.expansion_cache.get(&normalized) {
            debug!(domain = %normalized, "Domain expansion cache hit");
            return ExpandedDomain {
                domain: normalized,
                keywords,
                cached: true,
            };
        }

        match self.fetch_expansion(&normalized).await {
            Ok(response) => {
                self.expansion_cache
                    .insert(&normalized, response.keywords.clone());
                ExpandedDomain {
                    domain: normalized,
                    keywords: response.keywords,
                    cached: false,
                }
            }
            Err(e) => {
                warn!(domain = %normalized, error = %e, "Domain expansion failed, using literal domain");
                ExpandedDomain {
                    domain: normalized.clone(),
                    keywords: vec![normalized],
                    cached: false,
                }
            }
        }
    }

    async fn fetch_expansion(
        &self,
        normalized: &str,
    ) -> Result<ExpandDomainResponse, SearchError> {
        let url = format!("{}{}", self.config.base_url, EXPAND_DOMAIN_ENDPOINT);
        let payload = serde_json::json!({ "domain": normalized });

        let response = self
            .authorized(self.client.post(&url).json(&payload))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::HttpStatus { status, body });
        }

        Ok(response.json::<ExpandDomainResponse>().await?)
    }
}

/// Non-streaming fallback: the entire body is one JSON result object.
async fn parse_whole_body(response: Response) -> Result<SearchResults, SearchError> {
    let text = response.text().await?;
    if text.trim_start().starts_with('<') {
        // Content type lied; this is a routing misconfiguration, not a
        // malformed result, and worth telling apart.
        return Err(SearchError::HtmlBody);
    }
    serde_json::from_str::<SearchResults>(&text)
        .map_err(|e| SearchError::UnexpectedBody(e.to_string()))
}
