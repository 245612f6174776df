//! Component deployment for a network

use alloy_primitives::Address;
use std::sync::Arc;
use tracing::info;

use ethbtc_core::{DeployResult, NetworkConfig, OracleConfig};
use ethbtc_price_feed::{AggregatorV3Feed, CallTransport, PriceFeed, PriceOracle};
use ethbtc_swap::EthereumSwap;

use crate::address_book::DeployedAddresses;

/// Turns a feed address into a readable feed
pub trait FeedResolver {
    fn resolve(&self, address: Address) -> Arc<dyn PriceFeed>;
}

impl<F> FeedResolver for F
where
    F: Fn(Address) -> Arc<dyn PriceFeed>,
{
    fn resolve(&self, address: Address) -> Arc<dyn PriceFeed> {
        self(address)
    }
}

/// Resolves every address to a Chainlink aggregator on one transport
pub struct RpcFeedResolver<T: CallTransport + ?Sized> {
    transport: Arc<T>,
}

impl<T: CallTransport + ?Sized> RpcFeedResolver<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T: CallTransport + ?Sized + 'static> FeedResolver for RpcFeedResolver<T> {
    fn resolve(&self, address: Address) -> Arc<dyn PriceFeed> {
        Arc::new(AggregatorV3Feed::new(address, Arc::clone(&self.transport)))
    }
}

/// Deploying account; hands out CREATE addresses in nonce order
#[derive(Debug, Clone)]
pub struct Deployer {
    account: Address,
    nonce: u64,
}

impl Deployer {
    pub fn new(account: Address, nonce: u64) -> Self {
        Self { account, nonce }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn next_address(&mut self) -> Address {
        let address = self.account.create(self.nonce);
        self.nonce += 1;
        address
    }
}

/// Live components of one deployment
pub struct Deployment {
    pub network: String,
    pub oracle: Arc<PriceOracle>,
    pub swap: Arc<EthereumSwap>,
    pub addresses: DeployedAddresses,
}

/// Build the oracle over the network's feeds, then the swap bound to it
pub fn deploy(
    deployer: &mut Deployer,
    network: &NetworkConfig,
    oracle_config: &OracleConfig,
    resolver: &dyn FeedResolver,
) -> DeployResult<Deployment> {
    info!(
        "Deploying to {} (chain {}) from {} with {} price feeds",
        network.name,
        network.chain_id,
        deployer.account(),
        network.feeds.len()
    );

    let feeds = network.feeds.iter().map(|address| resolver.resolve(*address));
    let oracle = Arc::new(PriceOracle::with_feeds(oracle_config.clone(), feeds)?);
    let oracle_address = deployer.next_address();
    info!("PriceOracle deployed to: {}", oracle_address);

    let swap_address = deployer.next_address();
    let swap = Arc::new(EthereumSwap::new(swap_address, oracle.clone()));
    info!("EthereumSwap deployed to: {}", swap_address);

    Ok(Deployment {
        network: network.name.clone(),
        oracle,
        swap,
        addresses: DeployedAddresses {
            chain_id: network.chain_id,
            price_oracle: oracle_address,
            ethereum_swap: swap_address,
            price_feeds: network.feeds.clone(),
            deployed_at: chrono::Utc::now(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use ethbtc_core::{parse_units, DeployError, OracleError};
    use ethbtc_price_feed::StaticPriceFeed;

    fn network(feeds: Vec<Address>) -> NetworkConfig {
        NetworkConfig {
            name: "localhost".to_string(),
            chain_id: 31337,
            rpc_url: None,
            feeds,
        }
    }

    fn static_resolver(address: Address) -> Arc<dyn PriceFeed> {
        let price = match address.0[19] {
            1 => "30000",
            _ => "35000",
        };
        Arc::new(StaticPriceFeed::with_price(address, parse_units(price, 8).unwrap()))
    }

    #[test]
    fn test_create_addresses_follow_nonce() {
        // well-known CREATE vector
        let mut deployer = Deployer::new(address!("b20a608c624Ca5003905aA834De7156C68b2E1d0"), 0);
        assert_eq!(
            deployer.next_address(),
            address!("00000000219ab540356cBB839Cbe05303d7705Fa")
        );
        assert_eq!(deployer.nonce(), 1);
        assert_eq!(
            deployer.next_address(),
            address!("e33c6e89e69d085897f98e92b06ebd541d1daa99")
        );
        assert_eq!(deployer.nonce(), 2);
    }

    #[test]
    fn test_deploy_wires_oracle_and_swap() {
        let feeds = vec![Address::with_last_byte(1), Address::with_last_byte(2)];
        let mut deployer = Deployer::new(Address::repeat_byte(0xde), 0);

        let deployment = deploy(
            &mut deployer,
            &network(feeds.clone()),
            &OracleConfig::default(),
            &static_resolver,
        )
        .unwrap();

        assert_eq!(deployment.oracle.feeds(), feeds);
        assert_eq!(
            deployment.swap.get_aggregated_price().unwrap().price,
            parse_units("32500", 8).unwrap()
        );
        assert_eq!(deployment.addresses.price_feeds, feeds);
        assert_eq!(deployment.addresses.ethereum_swap, deployment.swap.address());
        assert_ne!(deployment.addresses.price_oracle, deployment.addresses.ethereum_swap);
        assert_eq!(deployer.nonce(), 2);

        let user = Address::repeat_byte(0x01);
        deployment.swap.deposit(user, U256::from(1)).unwrap();
        let record = deployment.swap.initiate_swap(user, U256::from(1)).unwrap();
        assert_eq!(record.amount_converted, U256::from(32_500));
    }

    #[test]
    fn test_duplicate_feed_addresses_fail_deploy() {
        let feeds = vec![Address::with_last_byte(1), Address::with_last_byte(1)];
        let mut deployer = Deployer::new(Address::repeat_byte(0xde), 0);

        let result = deploy(
            &mut deployer,
            &network(feeds),
            &OracleConfig::default(),
            &static_resolver,
        );
        assert!(matches!(
            result,
            Err(DeployError::Oracle(OracleError::DuplicateFeed(_)))
        ));
        assert_eq!(deployer.nonce(), 0);
    }
}
