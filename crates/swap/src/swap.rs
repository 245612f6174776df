//! Swap initiation against the aggregated ETH-BTC price

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use ethbtc_core::{
    convert_amount, AggregatedPrice, OracleResult, SwapError, SwapEvent, SwapRecord, SwapResult,
};
use ethbtc_price_feed::AggregatedPriceSource;

use crate::ledger::BalanceLedger;

/// Buffered events per subscriber before the slowest one starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// Holds deposits and converts them at the oracle price
///
/// Deposits and swaps are serialized through a single ledger lock, which is
/// held across the balance check, price query and debit of a swap.
pub struct EthereumSwap {
    address: Address,
    oracle: Arc<dyn AggregatedPriceSource>,
    ledger: Mutex<BalanceLedger>,
    events: broadcast::Sender<SwapEvent>,
}

impl EthereumSwap {
    pub fn new(address: Address, oracle: Arc<dyn AggregatedPriceSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            address,
            oracle,
            ledger: Mutex::new(BalanceLedger::new()),
            events,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.events.subscribe()
    }

    /// Credit an incoming transfer to `depositor`, returning the new balance
    pub fn deposit(&self, depositor: Address, amount: U256) -> SwapResult<U256> {
        let mut ledger = self.ledger.lock();
        let balance = ledger.credit(depositor, amount)?;

        debug!("Deposit of {} from {}, balance {}", amount, depositor, balance);
        self.publish(SwapEvent::Deposited {
            depositor,
            amount,
            balance,
        });

        Ok(balance)
    }

    /// Convert `amount` of the caller's deposit at the current aggregated price
    ///
    /// The balance is only debited once the price is known; any error leaves
    /// it unchanged.
    pub fn initiate_swap(&self, caller: Address, amount: U256) -> SwapResult<SwapRecord> {
        let mut ledger = self.ledger.lock();

        let available = ledger.balance_of(caller);
        if amount > available {
            warn!(
                "Swap rejected for {}: requested {}, available {}",
                caller, amount, available
            );
            return Err(SwapError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let aggregated = self.oracle.get_aggregated_price()?;
        let amount_converted =
            convert_amount(amount, aggregated.price).ok_or(SwapError::ArithmeticOverflow)?;

        ledger.debit(caller, amount)?;

        let record = SwapRecord {
            depositor: caller,
            amount_deposited: amount,
            amount_converted,
            price: aggregated.price,
            price_timestamp: aggregated.timestamp,
        };

        info!(
            "Swap initiated by {}: {} -> {} at price {}",
            caller, amount, amount_converted, aggregated.price
        );
        self.publish(SwapEvent::SwapInitiated(record));

        Ok(record)
    }

    /// Converted amount `amount` would receive at the current price, without
    /// touching any balance
    pub fn quote(&self, amount: U256) -> SwapResult<U256> {
        let aggregated = self.oracle.get_aggregated_price()?;
        convert_amount(amount, aggregated.price).ok_or(SwapError::ArithmeticOverflow)
    }

    pub fn get_aggregated_price(&self) -> OracleResult<AggregatedPrice> {
        self.oracle.get_aggregated_price()
    }

    pub fn balance_of(&self, depositor: Address) -> U256 {
        self.ledger.lock().balance_of(depositor)
    }

    /// Native currency held by the component
    pub fn total_locked(&self) -> U256 {
        self.ledger.lock().total()
    }

    pub fn depositor_count(&self) -> usize {
        self.ledger.lock().depositor_count()
    }

    fn publish(&self, event: SwapEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethbtc_core::{parse_units, OracleError};
    use parking_lot::RwLock;

    /// Price source returning whatever the test sets
    struct MockOracle {
        price: RwLock<OracleResult<AggregatedPrice>>,
    }

    impl MockOracle {
        fn with_price(units: &str) -> Arc<Self> {
            Arc::new(Self {
                price: RwLock::new(Ok(AggregatedPrice {
                    price: parse_units(units, 8).unwrap(),
                    timestamp: 1_700_000_000,
                    feeds_used: 1,
                })),
            })
        }

        fn fail_with(&self, error: OracleError) {
            *self.price.write() = Err(error);
        }
    }

    impl AggregatedPriceSource for MockOracle {
        fn get_aggregated_price(&self) -> OracleResult<AggregatedPrice> {
            self.price.read().clone()
        }
    }

    fn eth(value: &str) -> U256 {
        parse_units(value, 18).unwrap()
    }

    fn setup(price: &str) -> (EthereumSwap, Arc<MockOracle>) {
        let oracle = MockOracle::with_price(price);
        let swap = EthereumSwap::new(Address::repeat_byte(0xee), oracle.clone());
        (swap, oracle)
    }

    #[test]
    fn test_deposit_locks_funds() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);

        assert_eq!(swap.deposit(user, eth("1")).unwrap(), eth("1"));
        assert_eq!(swap.balance_of(user), eth("1"));
        assert_eq!(swap.total_locked(), eth("1"));
    }

    #[test]
    fn test_price_passthrough() {
        let (swap, _) = setup("50000");
        assert_eq!(
            swap.get_aggregated_price().unwrap().price,
            parse_units("50000", 8).unwrap()
        );
    }

    #[test]
    fn test_initiate_swap_at_oracle_price() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);
        let mut events = swap.subscribe();

        swap.deposit(user, U256::from(1)).unwrap();
        let record = swap.initiate_swap(user, U256::from(1)).unwrap();

        assert_eq!(record.depositor, user);
        assert_eq!(record.amount_deposited, U256::from(1));
        assert_eq!(record.amount_converted, U256::from(50_000));
        assert_eq!(record.price_timestamp, 1_700_000_000);
        assert_eq!(swap.balance_of(user), U256::ZERO);

        assert!(matches!(events.try_recv(), Ok(SwapEvent::Deposited { .. })));
        assert_eq!(events.try_recv().unwrap(), SwapEvent::SwapInitiated(record));
    }

    #[test]
    fn test_swap_without_deposit_rejected() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);

        assert_eq!(
            swap.initiate_swap(user, eth("2")),
            Err(SwapError::InsufficientBalance {
                requested: eth("2"),
                available: U256::ZERO,
            })
        );
    }

    #[test]
    fn test_partial_swap_debits_exact_amount() {
        let (swap, _) = setup("0.05");
        let user = Address::repeat_byte(1);
        swap.deposit(user, eth("3")).unwrap();

        let record = swap.initiate_swap(user, eth("1")).unwrap();
        assert_eq!(record.amount_converted, eth("0.05"));
        assert_eq!(swap.balance_of(user), eth("2"));
        assert_eq!(swap.total_locked(), eth("2"));
    }

    #[test]
    fn test_oracle_failure_leaves_balance() {
        let (swap, oracle) = setup("50000");
        let user = Address::repeat_byte(1);
        swap.deposit(user, eth("1")).unwrap();
        oracle.fail_with(OracleError::NoFeedsConfigured);

        assert_eq!(
            swap.initiate_swap(user, eth("1")),
            Err(SwapError::PriceUnavailable(OracleError::NoFeedsConfigured))
        );
        assert_eq!(swap.balance_of(user), eth("1"));
    }

    #[test]
    fn test_zero_value_deposit_is_credited() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);
        swap.deposit(user, U256::from(5)).unwrap();
        let mut events = swap.subscribe();

        assert_eq!(swap.deposit(user, U256::ZERO).unwrap(), U256::from(5));
        assert_eq!(
            events.try_recv().unwrap(),
            SwapEvent::Deposited {
                depositor: user,
                amount: U256::ZERO,
                balance: U256::from(5),
            }
        );
    }

    #[test]
    fn test_zero_swap_debits_nothing() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);
        swap.deposit(user, U256::from(5)).unwrap();
        let mut events = swap.subscribe();

        let record = swap.initiate_swap(user, U256::ZERO).unwrap();
        assert_eq!(record.amount_deposited, U256::ZERO);
        assert_eq!(record.amount_converted, U256::ZERO);
        assert_eq!(swap.balance_of(user), U256::from(5));
        assert_eq!(events.try_recv().unwrap(), SwapEvent::SwapInitiated(record));

        // no deposit at all still satisfies 0 <= balance
        let stranger = Address::repeat_byte(2);
        assert!(swap.initiate_swap(stranger, U256::ZERO).is_ok());
        assert_eq!(swap.depositor_count(), 1);
    }

    #[test]
    fn test_conversion_overflow() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);
        swap.deposit(user, U256::MAX).unwrap();

        assert_eq!(swap.initiate_swap(user, U256::MAX), Err(SwapError::ArithmeticOverflow));
        assert_eq!(swap.balance_of(user), U256::MAX);
    }

    #[test]
    fn test_quote_does_not_touch_balances() {
        let (swap, _) = setup("50000");
        assert_eq!(swap.quote(U256::from(2)).unwrap(), U256::from(100_000));
        assert_eq!(swap.total_locked(), U256::ZERO);
    }

    #[tokio::test]
    async fn test_events_delivered_to_async_subscriber() {
        let (swap, _) = setup("50000");
        let user = Address::repeat_byte(1);
        let mut events = swap.subscribe();

        swap.deposit(user, U256::from(10)).unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            SwapEvent::Deposited {
                depositor: user,
                amount: U256::from(10),
                balance: U256::from(10),
            }
        );
    }
}
