//! Chainlink `AggregatorV3Interface` reader

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use ethbtc_core::{FeedError, FeedResult, RoundData};

use crate::feeds::PriceFeed;

sol! {
    interface AggregatorV3Interface {
        function decimals() external view returns (uint8);
        function description() external view returns (string memory);

        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
    }
}

/// Read-only contract call (`eth_call` against the latest block)
pub trait CallTransport: Send + Sync {
    fn call(&self, to: Address, data: Bytes) -> FeedResult<Bytes>;
}

/// Price feed backed by an on-chain Chainlink aggregator
pub struct AggregatorV3Feed<T: CallTransport + ?Sized> {
    address: Address,
    transport: Arc<T>,
    decimals: OnceLock<u8>,
}

impl<T: CallTransport + ?Sized> AggregatorV3Feed<T> {
    pub fn new(address: Address, transport: Arc<T>) -> Self {
        Self {
            address,
            transport,
            decimals: OnceLock::new(),
        }
    }

    /// Decimals of the aggregator's answer; read once, then cached
    pub fn decimals(&self) -> FeedResult<u8> {
        if let Some(decimals) = self.decimals.get() {
            return Ok(*decimals);
        }

        let ret = self.call(AggregatorV3Interface::decimalsCall {})?;
        let _ = self.decimals.set(ret._0);
        Ok(ret._0)
    }

    pub fn description(&self) -> FeedResult<String> {
        Ok(self.call(AggregatorV3Interface::descriptionCall {})?._0)
    }

    fn call<C: SolCall>(&self, call: C) -> FeedResult<C::Return> {
        let output = self
            .transport
            .call(self.address, Bytes::from(call.abi_encode()))?;

        C::abi_decode_returns(&output, true)
            .map_err(|e| FeedError::Decode(format!("{}: {}", C::SIGNATURE, e)))
    }
}

impl<T: CallTransport + ?Sized> PriceFeed for AggregatorV3Feed<T> {
    fn address(&self) -> Address {
        self.address
    }

    fn latest_round_data(&self) -> FeedResult<RoundData> {
        let decimals = self.decimals()?;
        let ret = self.call(AggregatorV3Interface::latestRoundDataCall {})?;

        let updated_at = u64::try_from(ret.updatedAt)
            .map_err(|_| FeedError::Decode(format!("updatedAt out of range: {}", ret.updatedAt)))?;

        debug!(
            "Feed {} round {} answer {} ({} decimals)",
            self.address, ret.roundId, ret.answer, decimals
        );

        Ok(RoundData {
            round_id: ret.roundId,
            answer: ret.answer,
            decimals,
            updated_at,
        })
    }
}
