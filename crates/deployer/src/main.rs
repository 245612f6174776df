//! ETH-BTC swap deployer
//!
//! Usage: `ethbtc-deploy [network]`. Configuration comes from an optional
//! `ethbtc.toml` (or the file named by `ETHBTC_CONFIG`) and `ETHBTC_*`
//! environment variables.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ethbtc_core::DeployError;
use ethbtc_deployer::{
    deploy, load_config, AddressBook, Deployer, JsonRpcTransport, RpcFeedResolver,
};

fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("ETH-BTC swap deployer v{}", env!("CARGO_PKG_VERSION"));

    let path = env::var("ETHBTC_CONFIG").unwrap_or_else(|_| "ethbtc".to_string());
    let mut config = load_config(&path)?;
    if let Some(network) = env::args().nth(1) {
        config.network = network;
    }

    let network = config.resolve_network()?;
    let rpc_url = network
        .rpc_url
        .clone()
        .ok_or_else(|| DeployError::NoRpcEndpoint(network.name.clone()))?;

    let transport = Arc::new(JsonRpcTransport::new(
        rpc_url,
        Duration::from_secs(config.rpc_timeout_secs),
    )?);
    let resolver = RpcFeedResolver::new(transport);

    let mut deployer = Deployer::new(config.deployer, config.deployer_nonce);
    let deployment = deploy(&mut deployer, &network, &config.oracle, &resolver)?;

    match deployment.oracle.get_aggregated_price() {
        Ok(aggregated) => info!(
            "Initial ETH-BTC price {} from {} feeds at {}",
            aggregated.price, aggregated.feeds_used, aggregated.timestamp
        ),
        Err(e) => warn!("Price oracle not answering yet: {}", e),
    }

    let mut book = AddressBook::load(&config.address_book_path)?;
    book.record(deployment.network.clone(), deployment.addresses.clone());
    book.save(&config.address_book_path)?;

    if let Some(dir) = &config.artifacts_dir {
        deployment.addresses.export_components(&deployment.network, dir)?;
    }

    info!("Deployment to {} complete", deployment.network);
    Ok(())
}
