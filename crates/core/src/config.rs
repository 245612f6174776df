//! Configuration types

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{get_network, DeployError, RoundingMode};

/// What the oracle does when a single feed cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFailurePolicy {
    /// Fail the whole aggregation
    #[default]
    Abort,
    /// Drop the feed and average the remaining ones
    Skip,
}

/// Where the aggregated price timestamp comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    #[default]
    CallTime,
    /// Most recent `updated_at` among the feeds used
    LatestFeedUpdate,
}

/// Price oracle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub failure_policy: FeedFailurePolicy,
    pub rounding: RoundingMode,
    pub timestamp_policy: TimestampPolicy,
    /// Readings older than this are rejected; `None` disables the check
    pub max_feed_age_secs: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            failure_policy: FeedFailurePolicy::Abort,
            rounding: RoundingMode::Floor,
            timestamp_policy: TimestampPolicy::CallTime,
            max_feed_age_secs: None,
        }
    }
}

/// Network-specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub feeds: Vec<Address>,
}

/// Complete deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Target network name
    pub network: String,
    /// Account the components are deployed from
    pub deployer: Address,
    /// Nonce of the first deployment; later components take the next ones
    pub deployer_nonce: u64,
    /// Overrides the network's RPC endpoint
    pub rpc_url: Option<String>,
    pub rpc_timeout_secs: u64,
    pub address_book_path: PathBuf,
    /// Per-component artifact files are written here when set
    pub artifacts_dir: Option<PathBuf>,
    pub oracle: OracleConfig,
    /// Networks added to or replacing the built-in registry
    pub networks: Vec<NetworkConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            network: "localhost".to_string(),
            deployer: Address::ZERO,
            deployer_nonce: 0,
            rpc_url: None,
            rpc_timeout_secs: 10,
            address_book_path: PathBuf::from("deployedAddresses.json"),
            artifacts_dir: None,
            oracle: OracleConfig::default(),
            networks: vec![],
        }
    }
}

impl DeployConfig {
    /// Resolve the target network: configured entries win over built-ins,
    /// and a top-level `rpc_url` wins over the network's own.
    pub fn resolve_network(&self) -> Result<NetworkConfig, DeployError> {
        let mut network = self
            .networks
            .iter()
            .find(|n| n.name == self.network)
            .cloned()
            .or_else(|| get_network(&self.network).cloned())
            .ok_or_else(|| DeployError::UnknownNetwork(self.network.clone()))?;

        if self.rpc_url.is_some() {
            network.rpc_url = self.rpc_url.clone();
        }

        if network.feeds.is_empty() {
            return Err(DeployError::NoFeedsForNetwork(network.name));
        }

        Ok(network)
    }
}
