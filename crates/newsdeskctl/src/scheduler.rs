//! Refresh scheduler
//!
//! Drives the two refresh groups on their own intervals. Each tick spawns
//! the group and moves on, so a slow backend never delays the timer; an
//! overlapping refresh is resolved by the poller's stale-response check.

use crate::poller::StatusPoller;
use crate::render::Renderer;
use crate::source::StatusSource;
use async_trait::async_trait;
use newsdesk_common::config::RefreshConfig;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Something with a frequent and an infrequent refresh
#[async_trait]
pub trait Refresh: Clone + Send + Sync + 'static {
    async fn refresh_frequent(&self);
    async fn refresh_infrequent(&self);
}

#[async_trait]
impl<S, R> Refresh for StatusPoller<S, R>
where
    S: StatusSource + 'static,
    R: Renderer + 'static,
{
    async fn refresh_frequent(&self) {
        let report = self.load_frequent_data().await;
        debug!("Frequent refresh done, {} failure(s)", report.failures().len());
    }

    async fn refresh_infrequent(&self) {
        let report = self.load_infrequent_data().await;
        debug!("Infrequent refresh done, {} failure(s)", report.failures().len());
    }
}

/// Control handle for a running scheduler
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    refresh_now: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Run both groups immediately, outside the regular cadence
    pub fn refresh_now(&self) {
        let _ = self.refresh_now.send(());
    }

    /// Stop ticking. Refreshes already in flight run to completion.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Interval-driven scheduler for the two refresh groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalScheduler {
    pub frequent: Duration,
    pub infrequent: Duration,
}

impl IntervalScheduler {
    pub fn new(frequent: Duration, infrequent: Duration) -> Self {
        Self {
            frequent,
            infrequent,
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.frequent_interval(), config.infrequent_interval())
    }

    /// Start ticking in a background task. Both groups fire right away.
    pub fn spawn<T: Refresh>(self, target: T) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(target, shutdown_rx, refresh_rx));
        SchedulerHandle {
            shutdown: shutdown_tx,
            refresh_now: refresh_tx,
            task,
        }
    }

    async fn run<T: Refresh>(
        self,
        target: T,
        mut shutdown: watch::Receiver<bool>,
        mut refresh_now: mpsc::UnboundedReceiver<()>,
    ) {
        info!(
            "Refresh scheduler started (frequent {:?}, infrequent {:?})",
            self.frequent, self.infrequent
        );

        let mut frequent = tokio::time::interval(self.frequent);
        frequent.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut infrequent = tokio::time::interval(self.infrequent);
        infrequent.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = frequent.tick() => spawn_frequent(&target),
                _ = infrequent.tick() => spawn_infrequent(&target),
                Some(()) = refresh_now.recv() => {
                    debug!("Manual refresh requested");
                    spawn_frequent(&target);
                    spawn_infrequent(&target);
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Refresh scheduler stopped");
    }
}

fn spawn_frequent<T: Refresh>(target: &T) {
    let target = target.clone();
    tokio::spawn(async move { target.refresh_frequent().await });
}

fn spawn_infrequent<T: Refresh>(target: &T) {
    let target = target.clone();
    tokio::spawn(async move { target.refresh_infrequent().await });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingRefresh {
        frequent: Arc<AtomicUsize>,
        infrequent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Refresh for CountingRefresh {
        async fn refresh_frequent(&self) {
            self.frequent.fetch_add(1, Ordering::SeqCst);
        }

        async fn refresh_infrequent(&self) {
            self.infrequent.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_from_config_clamps() {
        let config = RefreshConfig {
            frequent_secs: 1,
            infrequent_secs: 600,
            discard_stale: true,
        };
        let scheduler = IntervalScheduler::from_config(&config);
        assert_eq!(scheduler.frequent, Duration::from_secs(5));
        assert_eq!(scheduler.infrequent, Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_groups_tick_on_their_own_cadence() {
        let counter = CountingRefresh::default();
        let handle = IntervalScheduler::new(Duration::from_secs(5), Duration::from_secs(30))
            .spawn(counter.clone());

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        handle.stop().await;

        // Ticks at 0s, 5s and 10s; the infrequent group only at 0s
        assert_eq!(counter.frequent.load(Ordering::SeqCst), 3);
        assert_eq!(counter.infrequent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_runs_both_groups() {
        let counter = CountingRefresh::default();
        let handle = IntervalScheduler::new(Duration::from_secs(60), Duration::from_secs(600))
            .spawn(counter.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.refresh_now();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop().await;

        assert_eq!(counter.frequent.load(Ordering::SeqCst), 2);
        assert_eq!(counter.infrequent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_ticking() {
        let counter = CountingRefresh::default();
        let handle = IntervalScheduler::new(Duration::from_secs(5), Duration::from_secs(30))
            .spawn(counter.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(counter.frequent.load(Ordering::SeqCst), 1);
    }
}
