//! Backend endpoint catalogue and response envelope parsing
//!
//! Every status endpoint answers either with its payload or with an object
//! carrying a top-level `error` field. `parse_body` folds both shapes into a
//! single `Result`.

use crate::error::FetchError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Status endpoints exposed under the API prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Stats,
    AiStatus,
    SchedulerStatus,
    WordPressTest,
    RecentArticles,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Stats,
        Endpoint::AiStatus,
        Endpoint::SchedulerStatus,
        Endpoint::WordPressTest,
        Endpoint::RecentArticles,
    ];

    /// Path relative to the API prefix
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Stats => "/stats",
            Endpoint::AiStatus => "/ai-status",
            Endpoint::SchedulerStatus => "/scheduler-status",
            Endpoint::WordPressTest => "/wordpress-test",
            Endpoint::RecentArticles => "/recent-articles",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Stats => "stats",
            Endpoint::AiStatus => "ai-status",
            Endpoint::SchedulerStatus => "scheduler-status",
            Endpoint::WordPressTest => "wordpress-test",
            Endpoint::RecentArticles => "recent-articles",
        }
    }

    /// Slot index for per-endpoint bookkeeping
    pub fn index(&self) -> usize {
        match self {
            Endpoint::Stats => 0,
            Endpoint::AiStatus => 1,
            Endpoint::SchedulerStatus => 2,
            Endpoint::WordPressTest => 3,
            Endpoint::RecentArticles => 4,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single read request against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub limit: Option<usize>,
}

impl ApiRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            limit: None,
        }
    }

    pub fn recent_articles(limit: usize) -> Self {
        Self {
            endpoint: Endpoint::RecentArticles,
            limit: Some(limit),
        }
    }

    /// Path plus query string, relative to the API prefix
    pub fn path_and_query(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}?limit={}", self.endpoint.path(), limit),
            None => self.endpoint.path().to_string(),
        }
    }
}

/// Parse a raw response body into `T`.
///
/// A JSON object with a non-null `error` member is an application failure
/// regardless of what else it carries. The body is decoded straight from
/// text so object member order survives into `T`.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(FetchError::Backend(message));
    }

    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}
