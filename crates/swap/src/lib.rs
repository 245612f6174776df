//! ETH-BTC swap component
//!
//! Tracks native-currency deposits per depositor and converts them at the
//! oracle's aggregated ETH-BTC price:
//! - Deposits credit the sender's balance
//! - Swap initiation checks the balance, prices the amount and debits it
//! - Every state change is published as a `SwapEvent`

pub mod ledger;
pub mod swap;

pub use ledger::BalanceLedger;
pub use swap::{EthereumSwap, EVENT_CHANNEL_CAPACITY};
