//! ETH-BTC price oracle
//!
//! Features:
//! - Pluggable price feeds behind a single trait
//! - Chainlink `AggregatorV3Interface` reader over any `eth_call` transport
//! - Runtime feed registration and removal
//! - Fixed-point averaging with configurable rounding
//! - Abort or skip policy for failing feeds

pub mod aggregator;
pub mod chainlink;
pub mod feeds;

pub use aggregator::{AggregatedPriceSource, OracleStats, PriceOracle};
pub use chainlink::{AggregatorV3Feed, CallTransport};
pub use feeds::{PriceFeed, StaticPriceFeed};
