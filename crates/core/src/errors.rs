//! Error types

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors reading a single price feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode feed response: {0}")]
    Decode(String),

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Feed too stale: {age_secs}s > {max_secs}s")]
    Stale { age_secs: u64, max_secs: u64 },

    #[error("Feed unavailable")]
    Unavailable,
}

/// Price oracle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("No price feeds configured")]
    NoFeedsConfigured,

    #[error("Price feed {feed} failed: {source}")]
    UpstreamFeed {
        feed: Address,
        #[source]
        source: FeedError,
    },

    #[error("All {failed} price feeds failed")]
    NoUsableFeeds { failed: usize },

    #[error("Price feed not found: {0}")]
    FeedNotFound(Address),

    #[error("Price feed already registered: {0}")]
    DuplicateFeed(Address),
}

/// Swap errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: U256, available: U256 },

    #[error("Price unavailable: {0}")]
    PriceUnavailable(#[from] OracleError),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

/// Deployment errors
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Network {0} not configured")]
    UnknownNetwork(String),

    #[error("No price feed addresses configured for network: {0}")]
    NoFeedsForNetwork(String),

    #[error("No RPC endpoint configured for network: {0}")]
    NoRpcEndpoint(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Address book I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address book format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type FeedResult<T> = Result<T, FeedError>;
pub type OracleResult<T> = Result<T, OracleError>;
pub type SwapResult<T> = Result<T, SwapError>;
pub type DeployResult<T> = Result<T, DeployError>;
