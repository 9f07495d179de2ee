//! Periodic cache warming.
//!
//! Runs on a fixed interval, refreshing listings and profiles for a set of
//! accounts. Failures on individual ticks are logged and the loop carries
//! on; it only stops when the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::cache::RepositoryCache;
use crate::clock::Clock;
use crate::config::DEFAULT_REFRESH_INTERVAL;
use crate::source::RepositorySource;

/// Outcome of one warming pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Listings refreshed from upstream.
    pub refreshed: usize,
    /// Listings served from cache, stale cache or fallback instead.
    pub degraded: usize,
    /// Profiles that could not be fetched.
    pub profile_failures: usize,
}

pub struct Scheduler<S: RepositorySource, C: Clock> {
    cache: Arc<RepositoryCache<S, C>>,
    accounts: Vec<String>,
    interval: Duration,
}

impl<S, C> Scheduler<S, C>
where
    S: RepositorySource + 'static,
    C: Clock + 'static,
{
    pub fn new(cache: Arc<RepositoryCache<S, C>>, accounts: Vec<String>) -> Self {
        Self {
            cache,
            accounts,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Warm every account once.
    #[tracing::instrument(skip(cache))]
    pub async fn tick(cache: &RepositoryCache<S, C>, accounts: &[String]) -> TickReport {
        let mut report = TickReport::default();

        for account in accounts {
            let listing = cache.fetch_pinned_repositories_with_origin(account).await;
            if listing.origin.is_live() {
                report.refreshed += 1;
            } else {
                report.degraded += 1;
                warn!(
                    "Refresh for {} served {:?} data",
                    account, listing.origin
                );
            }

            if let Err(e) = cache.fetch_profile(account).await {
                report.profile_failures += 1;
                warn!("Profile refresh for {} failed: {}", account, e);
            }
        }

        debug!("Scheduler tick finished: {:?}", report);
        report
    }

    /// Run until `shutdown` resolves. The first pass happens immediately.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Warming {} account(s) every {:?}",
            self.accounts.len(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let cache = Arc::clone(&self.cache);
                    let accounts = self.accounts.clone();
                    // A panicking pass must not take the loop down with it.
                    let pass = tokio::spawn(async move { Self::tick(&cache, &accounts).await });
                    if let Err(e) = pass.await {
                        error!("Scheduler tick failed: {}", e);
                    }
                }
            }
        }
    }

    /// Run on a background task.
    pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run(shutdown))
    }
}
