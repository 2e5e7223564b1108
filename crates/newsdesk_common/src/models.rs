//! View-models for the backend status endpoints
//!
//! These are transient: fetched, rendered, discarded. Nothing here is
//! mutated after decoding.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Article counters from `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_articles: u64,
    pub pending_articles: u64,
    pub processing_articles: u64,
    pub processed_articles: u64,
    pub published_articles: u64,
    pub failed_articles: u64,
    pub today_published: u64,
}

/// Key availability for one AI provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiProviderStatus {
    pub available_keys: u64,
}

/// Provider name to key status, in the order the backend listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiStatusMap {
    providers: Vec<(String, AiProviderStatus)>,
}

impl AiStatusMap {
    pub fn new(providers: Vec<(String, AiProviderStatus)>) -> Self {
        Self { providers }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AiProviderStatus)> {
        self.providers.iter().map(|(name, status)| (name.as_str(), status))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<'de> Deserialize<'de> for AiStatusMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProvidersVisitor;

        impl<'de> Visitor<'de> for ProvidersVisitor {
            type Value = AiStatusMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of provider name to key status")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut providers = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, status)) = map.next_entry::<String, AiProviderStatus>()? {
                    providers.push((name, status));
                }
                Ok(AiStatusMap { providers })
            }
        }

        deserializer.deserialize_map(ProvidersVisitor)
    }
}

/// One job registered with the backend's scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// ISO-8601 timestamp, null when the job is paused
    #[serde(default)]
    pub next_run: Option<String>,
}

/// Payload of `/scheduler-status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// None when the backend omits the flag or sends something other than a bool
    #[serde(default, deserialize_with = "flag_or_unknown")]
    pub running: Option<bool>,
    #[serde(default)]
    pub jobs: Vec<SchedulerJob>,
}

impl SchedulerStatus {
    /// Next run of the first job, the only one the dashboard shows
    pub fn next_run(&self) -> Option<&str> {
        self.jobs.first().and_then(|job| job.next_run.as_deref())
    }
}

/// Payload of `/wordpress-test`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPressStatus {
    #[serde(default, deserialize_with = "flag_or_unknown")]
    pub connected: Option<bool>,
}

/// Status flags are tri-state: only a JSON bool is taken at face value
fn flag_or_unknown<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_bool()))
}

/// Article pipeline status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArticleStatus {
    Pending,
    Processing,
    Processed,
    Published,
    Failed,
    /// Any status this dashboard does not know about, kept verbatim
    Other(String),
}

impl ArticleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Processing => "processing",
            ArticleStatus::Processed => "processed",
            ArticleStatus::Published => "published",
            ArticleStatus::Failed => "failed",
            ArticleStatus::Other(s) => s,
        }
    }
}

impl From<String> for ArticleStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => ArticleStatus::Pending,
            "processing" => ArticleStatus::Processing,
            "processed" => ArticleStatus::Processed,
            "published" => ArticleStatus::Published,
            "failed" => ArticleStatus::Failed,
            _ => ArticleStatus::Other(s),
        }
    }
}

impl From<ArticleStatus> for String {
    fn from(status: ArticleStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `/recent-articles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub feed_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ArticleSummary {
    /// Error text worth showing: only failed articles carry one
    pub fn visible_error(&self) -> Option<&str> {
        match self.status {
            ArticleStatus::Failed => self.error_message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}
