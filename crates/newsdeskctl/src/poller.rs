//! Status poller
//!
//! Five sibling fetch operations, each mapping one backend endpoint onto its
//! display targets. Failures are logged and handed back as `FetchError`; the
//! previous rendering stays in place, except the WordPress indicator which is
//! forced offline so a failed check never reads as "still checking".
//!
//! Each endpoint has a sequence counter and remembers the newest sequence
//! whose result was applied. When stale discarding is on, a response that
//! completes after a newer one was applied is dropped with
//! `FetchError::Superseded`. Responses that complete in order always apply.

use crate::render::{Cell, IndicatorState, Renderer, Row, Tone};
use crate::source::StatusSource;
use newsdesk_common::text::{capitalize_words, format_timestamp, truncate_with_ellipsis};
use newsdesk_common::{
    parse_body, AiStatusMap, ApiRequest, ArticleStatus, ArticleSummary, DashboardConfig,
    DisplayTargets, Endpoint, FetchError, SchedulerStatus, StatsSnapshot, WordPressStatus,
};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Rendering and request knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerOptions {
    pub recent_articles_limit: usize,
    pub title_max_chars: usize,
    pub error_max_chars: usize,
    pub timestamp_format: String,
    pub discard_stale: bool,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl PollerOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            recent_articles_limit: config.display.effective_recent_articles_limit(),
            title_max_chars: config.display.title_max_chars,
            error_max_chars: config.display.error_max_chars,
            timestamp_format: config.display.timestamp_format.clone(),
            discard_stale: config.refresh.discard_stale,
        }
    }
}

/// Results of one frequent-group refresh
#[derive(Debug)]
pub struct FrequentReport {
    pub stats: Result<StatsSnapshot, FetchError>,
    pub ai_status: Result<AiStatusMap, FetchError>,
    pub scheduler: Result<SchedulerStatus, FetchError>,
    pub recent_articles: Result<Vec<ArticleSummary>, FetchError>,
}

impl FrequentReport {
    pub fn failures(&self) -> Vec<(Endpoint, &FetchError)> {
        [
            (Endpoint::Stats, self.stats.as_ref().err()),
            (Endpoint::AiStatus, self.ai_status.as_ref().err()),
            (Endpoint::SchedulerStatus, self.scheduler.as_ref().err()),
            (Endpoint::RecentArticles, self.recent_articles.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(endpoint, err)| err.map(|e| (endpoint, e)))
        .collect()
    }
}

/// Results of one infrequent-group refresh
#[derive(Debug)]
pub struct InfrequentReport {
    pub wordpress: Result<WordPressStatus, FetchError>,
}

impl InfrequentReport {
    pub fn failures(&self) -> Vec<(Endpoint, &FetchError)> {
        match &self.wordpress {
            Err(e) => vec![(Endpoint::WordPressTest, e)],
            Ok(_) => Vec::new(),
        }
    }
}

struct PollerInner<S, R> {
    source: Arc<S>,
    renderer: Arc<R>,
    targets: DisplayTargets,
    options: PollerOptions,
    sequences: [AtomicU64; 5],
    /// Newest sequence applied per endpoint; held while rendering
    applied: [Mutex<u64>; 5],
}

/// Polls the backend and renders into the target registry it was built with
pub struct StatusPoller<S, R> {
    inner: Arc<PollerInner<S, R>>,
}

impl<S, R> Clone for StatusPoller<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StatusSource, R: Renderer> StatusPoller<S, R> {
    pub fn new(
        source: Arc<S>,
        renderer: Arc<R>,
        targets: DisplayTargets,
        options: PollerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                source,
                renderer,
                targets,
                options,
                sequences: Default::default(),
                applied: Default::default(),
            }),
        }
    }

    pub fn renderer(&self) -> &Arc<R> {
        &self.inner.renderer
    }

    pub fn targets(&self) -> &DisplayTargets {
        &self.inner.targets
    }

    pub fn options(&self) -> &PollerOptions {
        &self.inner.options
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    /// Issue `request` and hand the outcome to `apply`, unless a newer
    /// response for the same endpoint was applied first.
    async fn request<T, F>(&self, request: ApiRequest, apply: F) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        F: FnOnce(&Result<T, FetchError>),
    {
        let endpoint = request.endpoint;
        let seq = self.inner.sequences[endpoint.index()].fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%endpoint, seq, "Fetching {}", request.path_and_query());

        let result = match self.inner.source.fetch(&request).await {
            Ok(body) => parse_body::<T>(&body),
            Err(e) => Err(e),
        };

        let mut applied = self.inner.applied[endpoint.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.options.discard_stale && seq < *applied {
            return Err(FetchError::Superseded {
                issued: seq,
                latest: *applied,
            });
        }
        *applied = (*applied).max(seq);
        apply(&result);
        result
    }

    fn report(&self, endpoint: Endpoint, error: FetchError) -> FetchError {
        if error.is_superseded() {
            debug!(%endpoint, "Discarding stale response: {}", error);
        } else {
            warn!(%endpoint, "Error fetching {}: {}", endpoint, error);
        }
        error
    }

    fn update_text(&self, target: &str, value: &str) {
        if !self.inner.renderer.set_text(target, value) {
            warn!("Display target \"{}\" not found", target);
        }
    }

    // ------------------------------------------------------------------
    // Fetch operations
    // ------------------------------------------------------------------

    /// `/stats` into the seven counter targets
    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, FetchError> {
        self.request(
            ApiRequest::new(Endpoint::Stats),
            |result: &Result<StatsSnapshot, FetchError>| {
                if let Ok(stats) = result {
                    self.render_stats(stats);
                }
            },
        )
        .await
        .map_err(|e| self.report(Endpoint::Stats, e))
    }

    /// `/ai-status` into the provider list
    pub async fn fetch_ai_status(&self) -> Result<AiStatusMap, FetchError> {
        self.request(
            ApiRequest::new(Endpoint::AiStatus),
            |result: &Result<AiStatusMap, FetchError>| {
                if let Ok(providers) = result {
                    self.render_ai_status(providers);
                }
            },
        )
        .await
        .map_err(|e| self.report(Endpoint::AiStatus, e))
    }

    /// `/scheduler-status` into the scheduler indicator and next-run text
    pub async fn fetch_scheduler_status(&self) -> Result<SchedulerStatus, FetchError> {
        self.request(
            ApiRequest::new(Endpoint::SchedulerStatus),
            |result: &Result<SchedulerStatus, FetchError>| {
                if let Ok(status) = result {
                    self.render_scheduler_status(status);
                }
            },
        )
        .await
        .map_err(|e| self.report(Endpoint::SchedulerStatus, e))
    }

    /// `/wordpress-test` into the WordPress indicator.
    ///
    /// The indicator goes to `Unknown` before the request is issued. A
    /// failed check forces it offline; a superseded one leaves it alone.
    pub async fn fetch_wordpress_status(&self) -> Result<WordPressStatus, FetchError> {
        let target = self.inner.targets.wordpress_status.as_str();
        self.inner
            .renderer
            .set_indicator(target, IndicatorState::Unknown);

        self.request(
            ApiRequest::new(Endpoint::WordPressTest),
            |result: &Result<WordPressStatus, FetchError>| {
                let state = match result {
                    Ok(status) => IndicatorState::from_flag(status.connected),
                    Err(_) => IndicatorState::Offline,
                };
                self.inner.renderer.set_indicator(target, state);
            },
        )
        .await
        .map_err(|e| self.report(Endpoint::WordPressTest, e))
    }

    /// `/recent-articles?limit=N` into the article table
    pub async fn fetch_recent_articles(
        &self,
        limit: usize,
    ) -> Result<Vec<ArticleSummary>, FetchError> {
        let mut articles = self
            .request(
                ApiRequest::recent_articles(limit),
                |result: &Result<Vec<ArticleSummary>, FetchError>| {
                    if let Ok(articles) = result {
                        self.render_recent_articles(&articles[..articles.len().min(limit)]);
                    }
                },
            )
            .await
            .map_err(|e| self.report(Endpoint::RecentArticles, e))?;
        articles.truncate(limit);
        Ok(articles)
    }

    // ------------------------------------------------------------------
    // Refresh groups
    // ------------------------------------------------------------------

    /// Stats, AI keys, scheduler and recent articles, issued concurrently
    pub async fn load_frequent_data(&self) -> FrequentReport {
        let limit = self.inner.options.recent_articles_limit;
        let (stats, ai_status, scheduler, recent_articles) = tokio::join!(
            self.fetch_stats(),
            self.fetch_ai_status(),
            self.fetch_scheduler_status(),
            self.fetch_recent_articles(limit),
        );
        FrequentReport {
            stats,
            ai_status,
            scheduler,
            recent_articles,
        }
    }

    /// WordPress connectivity, a live upstream check
    pub async fn load_infrequent_data(&self) -> InfrequentReport {
        InfrequentReport {
            wordpress: self.fetch_wordpress_status().await,
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn render_stats(&self, stats: &StatsSnapshot) {
        let values = [
            stats.total_articles,
            stats.pending_articles,
            stats.processing_articles,
            stats.processed_articles,
            stats.published_articles,
            stats.failed_articles,
            stats.today_published,
        ];
        for (target, value) in self.inner.targets.stat_targets().into_iter().zip(values) {
            self.update_text(target, &value.to_string());
        }
    }

    pub fn render_ai_status(&self, providers: &AiStatusMap) {
        self.inner
            .renderer
            .set_rows(&self.inner.targets.ai_status_container, ai_status_rows(providers));
    }

    pub fn render_scheduler_status(&self, status: &SchedulerStatus) {
        let targets = &self.inner.targets;
        self.inner
            .renderer
            .set_indicator(&targets.scheduler_status, IndicatorState::from_flag(status.running));

        if let Some(next_run) = status.next_run() {
            let formatted = format_timestamp(next_run, &self.inner.options.timestamp_format);
            self.update_text(&targets.scheduler_next_run, &format!("Next run: {}", formatted));
        }
    }

    pub fn render_recent_articles(&self, articles: &[ArticleSummary]) {
        self.inner.renderer.set_rows(
            &self.inner.targets.recent_articles_body,
            article_rows(articles, &self.inner.options),
        );
    }
}

/// One row per provider: "<Provider> Keys:" and a count badge
pub fn ai_status_rows(providers: &AiStatusMap) -> Vec<Row> {
    providers
        .iter()
        .map(|(name, status)| {
            Row::new(vec![
                Cell::plain(format!("{} Keys:", capitalize_words(name))),
                Cell::badge(status.available_keys.to_string(), Tone::Primary),
            ])
        })
        .collect()
}

pub fn status_tone(status: &ArticleStatus) -> Tone {
    match status {
        ArticleStatus::Pending => Tone::Secondary,
        ArticleStatus::Processing => Tone::Info,
        ArticleStatus::Processed => Tone::Primary,
        ArticleStatus::Published => Tone::Success,
        ArticleStatus::Failed => Tone::Danger,
        ArticleStatus::Other(_) => Tone::Dark,
    }
}

/// Table rows: id, title, status, feed, created, error
pub fn article_rows(articles: &[ArticleSummary], options: &PollerOptions) -> Vec<Row> {
    articles
        .iter()
        .map(|article| {
            let title = article.title.as_deref().unwrap_or("");
            let title_cell = Cell::plain(truncate_with_ellipsis(title, options.title_max_chars))
                .with_hover(title);

            let created = article
                .created_at
                .as_deref()
                .map(|raw| format_timestamp(raw, &options.timestamp_format))
                .unwrap_or_default();

            let error_cell = match article.visible_error() {
                Some(message) => {
                    Cell::plain(truncate_with_ellipsis(message, options.error_max_chars))
                        .with_hover(message)
                        .with_tone(Tone::Danger)
                }
                None => Cell::plain("-"),
            };

            Row::new(vec![
                Cell::plain(article.id.to_string()),
                title_cell,
                Cell::badge(article.status.as_str(), status_tone(&article.status)),
                Cell::plain(article.feed_type.as_deref().unwrap_or("")),
                Cell::plain(created),
                error_cell,
            ])
        })
        .collect()
}
