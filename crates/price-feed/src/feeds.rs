//! Price feed sources

use alloy_primitives::{Address, I256, U256};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use ethbtc_core::{FeedError, FeedResult, RoundData, PRICE_DECIMALS};

/// A source of the latest price reading
///
/// Implementations are polled synchronously by the oracle and must be safe to
/// read from several threads at once.
pub trait PriceFeed: Send + Sync {
    /// Identity of the feed; unique within an oracle
    fn address(&self) -> Address;

    fn latest_round_data(&self) -> FeedResult<RoundData>;
}

/// In-memory feed whose reading is set by the owner
///
/// Stands in for an on-chain aggregator in tests and dry runs.
#[derive(Debug)]
pub struct StaticPriceFeed {
    address: Address,
    reading: RwLock<FeedResult<RoundData>>,
    reads: AtomicU64,
}

impl StaticPriceFeed {
    pub fn new(address: Address, round: RoundData) -> Self {
        Self {
            address,
            reading: RwLock::new(Ok(round)),
            reads: AtomicU64::new(0),
        }
    }

    /// Feed reporting `price` with `PRICE_DECIMALS` decimals
    pub fn with_price(address: Address, price: U256) -> Self {
        Self::new(address, RoundData::new(to_answer(price), PRICE_DECIMALS, 0))
    }

    /// Replace the answer, keeping decimals and bumping the round
    pub fn set_answer(&self, answer: I256, updated_at: u64) {
        let mut reading = self.reading.write();
        let (round_id, decimals) = match &*reading {
            Ok(round) => (round.round_id + 1, round.decimals),
            Err(_) => (0, PRICE_DECIMALS),
        };
        *reading = Ok(RoundData {
            round_id,
            answer,
            decimals,
            updated_at,
        });
    }

    pub fn set_price(&self, price: U256) {
        self.set_answer(to_answer(price), 0);
    }

    pub fn set_round(&self, round: RoundData) {
        *self.reading.write() = Ok(round);
    }

    /// Make every subsequent read fail
    pub fn fail_with(&self, error: FeedError) {
        *self.reading.write() = Err(error);
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl PriceFeed for StaticPriceFeed {
    fn address(&self) -> Address {
        self.address
    }

    fn latest_round_data(&self) -> FeedResult<RoundData> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.reading.read().clone()
    }
}

fn to_answer(price: U256) -> I256 {
    if price > I256::MAX.into_raw() {
        I256::MAX
    } else {
        I256::from_raw(price)
    }
}
