//! Built-in network registry
//!
//! Chainlink ETH/BTC feed addresses per network. Deployments look networks
//! up here by name; a config file can add or override entries.

use alloy_primitives::{address, Address};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::NetworkConfig;

/// Well-known networks keyed by name
pub static NETWORKS: LazyLock<HashMap<&'static str, NetworkConfig>> = LazyLock::new(|| {
    let mut networks = HashMap::new();

    networks.insert("mainnet", NetworkConfig {
        name: "mainnet".to_string(),
        chain_id: 1,
        rpc_url: None,
        feeds: vec![
            // ETH / BTC
            address!("Ac559F25B1619171CbC396a50854A3240b6A4e99"),
        ],
    });

    networks.insert("rinkeby", NetworkConfig {
        name: "rinkeby".to_string(),
        chain_id: 4,
        rpc_url: None,
        feeds: vec![address!("ECe365B379E1dD183B20fc5f022230C044d51404")],
    });

    // Local development chain, feeds are supplied by config
    networks.insert("localhost", NetworkConfig {
        name: "localhost".to_string(),
        chain_id: 31337,
        rpc_url: Some("http://127.0.0.1:8545".to_string()),
        feeds: vec![],
    });

    networks
});

/// Get a built-in network by name
pub fn get_network(name: &str) -> Option<&'static NetworkConfig> {
    NETWORKS.get(name)
}

/// Names of all built-in networks, sorted
pub fn network_names() -> Vec<&'static str> {
    let mut names: Vec<_> = NETWORKS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Feed addresses for a built-in network
pub fn feeds_for(name: &str) -> Option<&'static [Address]> {
    NETWORKS.get(name).map(|n| n.feeds.as_slice())
}
