//! Time-boxed memoization of the query service
//!
//! A dashboard that re-renders keeps one [`SalesQueryService`] (and so one
//! connection) for a fixed wall-clock window. After the window a fresh
//! service is opened and the stale one is closed.

use std::time::{Duration, Instant};

use tracing::debug;

use dealerdash_core::DbConfig;

use crate::service::SalesQueryService;

/// Default lifetime of a cached service
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CachedService {
    created_at: Instant,
    service: SalesQueryService,
}

/// Holds at most one service, replacing it once it is older than the TTL
pub struct ServiceCache {
    config: DbConfig,
    ttl: Duration,
    entry: Option<CachedService>,
    generation: u64,
}

impl ServiceCache {
    pub fn new(config: DbConfig, ttl: Duration) -> Self {
        Self {
            config,
            ttl,
            entry: None,
            generation: 0,
        }
    }

    /// The cached service, opening a new one if none is cached or it expired.
    pub async fn get(&mut self) -> &mut SalesQueryService {
        let entry = match self.entry.take() {
            Some(entry) if entry.created_at.elapsed() < self.ttl => entry,
            stale => {
                if let Some(mut stale) = stale {
                    debug!(age = ?stale.created_at.elapsed(), "service cache expired");
                    stale.service.close().await;
                }
                self.generation += 1;
                CachedService {
                    created_at: Instant::now(),
                    service: SalesQueryService::connect(&self.config).await,
                }
            }
        };

        &mut self.entry.insert(entry).service
    }

    /// How many services this cache has opened so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Close and drop the cached service, if any.
    pub async fn invalidate(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            entry.service.close().await;
        }
    }
}
