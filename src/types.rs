// src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Request body for the text search endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_domain: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            top_k: None,
            skill_domain: None,
        }
    }

    /// The backend accepts 1..=50; clamp here so a bad value never 422s.
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k.clamp(1, 50));
        self
    }

    pub fn with_skill_domain(mut self, domain: impl Into<String>) -> Self {
        self.skill_domain = Some(domain.into());
        self
    }
}

/// One NDJSON line from a streaming search response.
///
/// Match records are opaque to the client and passed through unchanged;
/// only their order matters. Lines with an unknown `type` fail to decode
/// and are skipped by the parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// Batch of 100%-confidence matches, ready for immediate display.
    #[serde(rename = "matches")]
    PerfectBurst {
        matches: Vec<Value>,
        #[serde(default)]
        is_perfect: bool,
    },
    /// One incremental non-perfect match.
    #[serde(rename = "match")]
    Progressive {
        #[serde(rename = "match")]
        record: Value,
    },
    /// Terminal event carrying the backend's authoritative final list.
    #[serde(rename = "complete")]
    Complete {
        total_matches: usize,
        #[serde(default)]
        matches: Option<Vec<Value>>,
        #[serde(default)]
        expanded_terms: Option<Vec<String>>,
        #[serde(default)]
        search_time_ms: Option<f64>,
    },
    /// Terminal event signalling a server-side failure mid-stream.
    #[serde(rename = "error")]
    Error { error: String },
}

/// Final result of a search call, whether streamed or returned whole.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    pub total_matches: usize,
    pub matches: Vec<Value>,
    #[serde(default)]
    pub expanded_terms: Vec<String>,
    #[serde(default)]
    pub search_time_ms: Option<f64>,
}

/// Incremental notification handed to the progress sink while streaming.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// A perfect-match burst arrived; `total` is the running result count.
    Perfect { matches: Vec<Value>, total: usize },
    /// One more progressive match arrived.
    Progressive { record: Value, total: usize },
}

impl ProgressUpdate {
    pub fn total(&self) -> usize {
        match self {
            ProgressUpdate::Perfect { total, .. } => *total,
            ProgressUpdate::Progressive { total, .. } => *total,
        }
    }
}

/// Platform roles, as embedded in the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Trainer,
    Client,
}

impl UserRole {
    /// Path prefix for the role-scoped API routes. The backend calls the
    /// client role "customer" in its paths.
    pub fn api_prefix(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin",
            UserRole::Trainer | UserRole::Client => "/customer",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Trainer => "trainer",
            UserRole::Client => "client",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "trainer" => Ok(UserRole::Trainer),
            "client" | "customer" => Ok(UserRole::Client),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_event_tags() {
        let burst: StreamEvent =
            serde_json::from_str(r#"{"type":"matches","matches":[{"id":1}],"is_perfect":true}"#)
                .unwrap();
        assert!(matches!(burst, StreamEvent::PerfectBurst { .. }));

        let single: StreamEvent =
            serde_json::from_str(r#"{"type":"match","match":{"id":2},"is_perfect":false}"#)
                .unwrap();
        match single {
            StreamEvent::Progressive { record } => assert_eq!(record, json!({"id": 2})),
            other => panic!("expected progressive event, got {:?}", other),
        }

        let complete: StreamEvent = serde_json::from_str(
            r#"{"type":"complete","total_matches":3,"matches":[],"search_time_ms":12.5}"#,
        )
        .unwrap();
        assert!(matches!(complete, StreamEvent::Complete { total_matches: 3, .. }));
    }

    #[test]
    fn test_unknown_tag_is_a_decode_error() {
        let result: Result<StreamEvent, _> =
            serde_json::from_str(r#"{"type":"heartbeat","ts":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_top_k_clamped() {
        assert_eq!(SearchRequest::new("q", "").with_top_k(500).top_k, Some(50));
        assert_eq!(SearchRequest::new("q", "").with_top_k(0).top_k, Some(1));
    }

    #[test]
    fn test_role_parsing_and_prefix() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("customer".parse::<UserRole>().unwrap(), UserRole::Client);
        assert_eq!(UserRole::Admin.api_prefix(), "/admin");
        assert_eq!(UserRole::Client.api_prefix(), "/customer");
        assert!("root".parse::<UserRole>().is_err());
    }
}
