//! Display-target registry
//!
//! Names of the page regions the poller writes to. The defaults match the
//! dashboard template; any of them can be renamed in the `[targets]` config
//! section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayTargets {
    pub stat_total: String,
    pub stat_pending: String,
    pub stat_processing: String,
    pub stat_processed: String,
    pub stat_published: String,
    pub stat_failed: String,
    pub stat_today_published: String,
    pub ai_status_container: String,
    pub scheduler_status: String,
    pub scheduler_next_run: String,
    pub wordpress_status: String,
    pub recent_articles_body: String,
}

impl Default for DisplayTargets {
    fn default() -> Self {
        Self {
            stat_total: "stat-total".to_string(),
            stat_pending: "stat-pending".to_string(),
            stat_processing: "stat-processing".to_string(),
            stat_processed: "stat-processed".to_string(),
            stat_published: "stat-published".to_string(),
            stat_failed: "stat-failed".to_string(),
            stat_today_published: "stat-today-published".to_string(),
            ai_status_container: "ai-status-container".to_string(),
            scheduler_status: "scheduler-status".to_string(),
            scheduler_next_run: "scheduler-next-run".to_string(),
            wordpress_status: "wordpress-status".to_string(),
            recent_articles_body: "recent-articles-tbody".to_string(),
        }
    }
}

impl DisplayTargets {
    /// The seven scalar stat targets, in display order
    pub fn stat_targets(&self) -> [&str; 7] {
        [
            &self.stat_total,
            &self.stat_pending,
            &self.stat_processing,
            &self.stat_processed,
            &self.stat_published,
            &self.stat_failed,
            &self.stat_today_published,
        ]
    }

    /// Every target name, for registering a full page
    pub fn all(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stat_targets().to_vec();
        names.extend([
            self.ai_status_container.as_str(),
            self.scheduler_status.as_str(),
            self.scheduler_next_run.as_str(),
            self.wordpress_status.as_str(),
            self.recent_articles_body.as_str(),
        ]);
        names
    }
}
