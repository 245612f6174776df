//! Price oracle - aggregates multiple feeds into one ETH-BTC price

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use ethbtc_core::{
    div_round, AggregatedPrice, Clock, FeedError, FeedFailurePolicy, FeedResult, OracleConfig,
    OracleError, OracleResult, SystemClock, TimestampPolicy,
};

use crate::feeds::PriceFeed;

/// Anything that can quote the current aggregated ETH-BTC price
pub trait AggregatedPriceSource: Send + Sync {
    fn get_aggregated_price(&self) -> OracleResult<AggregatedPrice>;
}

/// Averages the latest answers of a runtime-managed set of feeds
pub struct PriceOracle {
    config: OracleConfig,
    feeds: RwLock<Vec<Arc<dyn PriceFeed>>>,
    clock: Arc<dyn Clock>,
    query_count: AtomicU64,
    failed_reads: AtomicU64,
}

impl PriceOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            feeds: RwLock::new(Vec::new()),
            clock: Arc::new(SystemClock),
            query_count: AtomicU64::new(0),
            failed_reads: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build an oracle with an initial feed list
    pub fn with_feeds<I>(config: OracleConfig, feeds: I) -> OracleResult<Self>
    where
        I: IntoIterator<Item = Arc<dyn PriceFeed>>,
    {
        let oracle = Self::new(config);
        for feed in feeds {
            oracle.add_feed(feed)?;
        }
        Ok(oracle)
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Register a feed. Duplicate addresses are rejected.
    pub fn add_feed(&self, feed: Arc<dyn PriceFeed>) -> OracleResult<()> {
        let address = feed.address();
        let mut feeds = self.feeds.write();

        if feeds.iter().any(|f| f.address() == address) {
            return Err(OracleError::DuplicateFeed(address));
        }

        feeds.push(feed);
        info!("Added price feed {} ({} registered)", address, feeds.len());
        Ok(())
    }

    /// Deregister a feed, returning it
    pub fn remove_feed(&self, address: Address) -> OracleResult<Arc<dyn PriceFeed>> {
        let mut feeds = self.feeds.write();

        let index = feeds
            .iter()
            .position(|f| f.address() == address)
            .ok_or(OracleError::FeedNotFound(address))?;

        let feed = feeds.remove(index);
        info!("Removed price feed {} ({} registered)", address, feeds.len());
        Ok(feed)
    }

    /// Registered feed addresses in insertion order
    pub fn feeds(&self) -> Vec<Address> {
        self.feeds.read().iter().map(|f| f.address()).collect()
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.read().len()
    }

    pub fn contains_feed(&self, address: Address) -> bool {
        self.feeds.read().iter().any(|f| f.address() == address)
    }

    /// Mean of every registered feed's latest answer, scaled to 1e8
    pub fn get_aggregated_price(&self) -> OracleResult<AggregatedPrice> {
        self.query_count.fetch_add(1, Ordering::Relaxed);

        // Feeds are read outside the lock
        let feeds: Vec<Arc<dyn PriceFeed>> = self.feeds.read().clone();
        if feeds.is_empty() {
            return Err(OracleError::NoFeedsConfigured);
        }

        let now = self.clock.now_secs();
        let mut sum = U256::ZERO;
        let mut used = 0usize;
        let mut failed = 0usize;
        let mut latest_update = 0u64;

        for feed in &feeds {
            // an addition that overflows is a bad reading from this feed
            let reading = self.read_feed(feed.as_ref(), now).and_then(|(price, updated_at)| {
                sum.checked_add(price)
                    .map(|next| (next, updated_at))
                    .ok_or_else(|| FeedError::InvalidAnswer("sum overflows 256 bits".to_string()))
            });

            match reading {
                Ok((next, updated_at)) => {
                    sum = next;
                    used += 1;
                    latest_update = latest_update.max(updated_at);
                }
                Err(source) => {
                    self.failed_reads.fetch_add(1, Ordering::Relaxed);
                    match self.config.failure_policy {
                        FeedFailurePolicy::Abort => {
                            return Err(OracleError::UpstreamFeed {
                                feed: feed.address(),
                                source,
                            });
                        }
                        FeedFailurePolicy::Skip => {
                            warn!("Skipping price feed {}: {}", feed.address(), source);
                            failed += 1;
                        }
                    }
                }
            }
        }

        if used == 0 {
            return Err(OracleError::NoUsableFeeds { failed });
        }

        let price = div_round(sum, U256::from(used), self.config.rounding)
            .ok_or(OracleError::NoUsableFeeds { failed })?;

        let timestamp = match self.config.timestamp_policy {
            TimestampPolicy::CallTime => now,
            TimestampPolicy::LatestFeedUpdate => latest_update,
        };

        debug!("Aggregated price {} from {} feeds ({} skipped)", price, used, failed);

        Ok(AggregatedPrice {
            price,
            timestamp,
            feeds_used: used,
        })
    }

    /// Read and validate one feed: positive answer, fresh enough, rescaled
    fn read_feed(&self, feed: &dyn PriceFeed, now: u64) -> FeedResult<(U256, u64)> {
        let round = feed.latest_round_data()?;

        if let Some(max_secs) = self.config.max_feed_age_secs {
            let age_secs = round.age_secs(now);
            if age_secs > max_secs {
                return Err(FeedError::Stale { age_secs, max_secs });
            }
        }

        let price = round.normalized_price().ok_or_else(|| {
            FeedError::InvalidAnswer(format!("{} with {} decimals", round.answer, round.decimals))
        })?;

        if price.is_zero() {
            return Err(FeedError::InvalidAnswer("rounds to zero at 8 decimals".to_string()));
        }

        Ok((price, round.updated_at))
    }

    /// Get statistics
    pub fn stats(&self) -> OracleStats {
        OracleStats {
            feed_count: self.feed_count(),
            query_count: self.query_count.load(Ordering::Relaxed),
            failed_reads: self.failed_reads.load(Ordering::Relaxed),
        }
    }
}

impl AggregatedPriceSource for PriceOracle {
    fn get_aggregated_price(&self) -> OracleResult<AggregatedPrice> {
        PriceOracle::get_aggregated_price(self)
    }
}

/// Oracle statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleStats {
    pub feed_count: usize,
    pub query_count: u64,
    pub failed_reads: u64,
}
