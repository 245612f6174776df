//! Deployed address persistence, keyed by network name

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use ethbtc_core::DeployResult;

/// Addresses of one network's deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedAddresses {
    pub chain_id: u64,
    pub price_oracle: Address,
    pub ethereum_swap: Address,
    pub price_feeds: Vec<Address>,
    pub deployed_at: DateTime<Utc>,
}

/// One deployed component as written to its own artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArtifact {
    pub address: Address,
    pub chain_id: u64,
    pub constructor_arguments: Vec<Address>,
}

impl DeployedAddresses {
    /// Component name -> artifact. The oracle is built from the feed list,
    /// the swap from the oracle address.
    pub fn component_artifacts(&self) -> BTreeMap<&'static str, ComponentArtifact> {
        BTreeMap::from([
            (
                "PriceOracle",
                ComponentArtifact {
                    address: self.price_oracle,
                    chain_id: self.chain_id,
                    constructor_arguments: self.price_feeds.clone(),
                },
            ),
            (
                "EthereumSwap",
                ComponentArtifact {
                    address: self.ethereum_swap,
                    chain_id: self.chain_id,
                    constructor_arguments: vec![self.price_oracle],
                },
            ),
        ])
    }

    /// Write `<dir>/<network>/<Component>.json` for every component
    pub fn export_components(&self, network: &str, dir: &Path) -> DeployResult<Vec<PathBuf>> {
        let network_dir = dir.join(network);
        fs::create_dir_all(&network_dir)?;

        let mut written = Vec::new();
        for (name, artifact) in self.component_artifacts() {
            let path = network_dir.join(format!("{name}.json"));
            fs::write(&path, serde_json::to_string_pretty(&artifact)?)?;
            written.push(path);
        }

        info!("Exported {} component artifacts to {}", written.len(), network_dir.display());
        Ok(written)
    }
}

/// Network name -> deployed addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    networks: BTreeMap<String, DeployedAddresses>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an address book; a missing file is an empty book
    pub fn load(path: &Path) -> DeployResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> DeployResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Deployed addresses saved to {}", path.display());
        Ok(())
    }

    /// Replace the entry for `network`, returning the previous one
    pub fn record(
        &mut self,
        network: impl Into<String>,
        addresses: DeployedAddresses,
    ) -> Option<DeployedAddresses> {
        self.networks.insert(network.into(), addresses)
    }

    pub fn get(&self, network: &str) -> Option<&DeployedAddresses> {
        self.networks.get(network)
    }

    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
