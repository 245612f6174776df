//! Deployment tooling for the ETH-BTC swap engine
//!
//! Resolves a network's feed list, builds the oracle and the swap bound to
//! it, and records the resulting addresses in a JSON address book.

pub mod address_book;
pub mod deploy;
pub mod rpc;
pub mod settings;

pub use address_book::{AddressBook, ComponentArtifact, DeployedAddresses};
pub use deploy::{deploy, Deployer, Deployment, FeedResolver, RpcFeedResolver};
pub use rpc::JsonRpcTransport;
pub use settings::load_config;
