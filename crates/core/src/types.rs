//! Core type definitions

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Decimal places of every aggregated price
pub const PRICE_DECIMALS: u8 = 8;

/// 10^PRICE_DECIMALS
pub const PRICE_SCALE: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

/// A single reading from a price feed, shaped like Chainlink's `latestRoundData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: I256,
    pub decimals: u8,
    /// Unix seconds
    pub updated_at: u64,
}

impl RoundData {
    pub fn new(answer: I256, decimals: u8, updated_at: u64) -> Self {
        Self {
            round_id: 0,
            answer,
            decimals,
            updated_at,
        }
    }

    /// Answer rescaled to `PRICE_DECIMALS`. `None` for non-positive answers
    /// or when the rescale does not fit in 256 bits.
    pub fn normalized_price(&self) -> Option<U256> {
        if !self.answer.is_positive() {
            return None;
        }
        scale_to_price_decimals(self.answer.into_raw(), self.decimals)
    }

    pub fn age_secs(&self, now_secs: u64) -> u64 {
        now_secs.saturating_sub(self.updated_at)
    }
}

/// Aggregated ETH/BTC price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedPrice {
    /// Scaled by `PRICE_SCALE`
    pub price: U256,
    /// Unix seconds
    pub timestamp: u64,
    /// Number of feeds that contributed to the mean
    pub feeds_used: usize,
}

/// Result of a successful swap initiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub depositor: Address,
    pub amount_deposited: U256,
    pub amount_converted: U256,
    pub price: U256,
    pub price_timestamp: u64,
}

/// Events published by the swap component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapEvent {
    Deposited {
        depositor: Address,
        amount: U256,
        balance: U256,
    },
    SwapInitiated(SwapRecord),
}

/// Rounding applied when a division leaves a remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Truncate, same as EVM integer division
    #[default]
    Floor,
    /// Round half away from zero
    HalfUp,
    Ceil,
}

impl RoundingMode {
    pub fn name(&self) -> &'static str {
        match self {
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "half_up",
            RoundingMode::Ceil => "ceil",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Divide with the given rounding mode. `None` on a zero denominator.
pub fn div_round(numerator: U256, denominator: U256, mode: RoundingMode) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.is_zero() {
        return Some(quotient);
    }
    let bump = match mode {
        RoundingMode::Floor => false,
        // remainder * 2 >= denominator, written to avoid overflow
        RoundingMode::HalfUp => remainder >= denominator - remainder,
        RoundingMode::Ceil => true,
    };
    Some(if bump { quotient + U256::from(1) } else { quotient })
}

/// Rescale a fixed-point value with `decimals` places to `PRICE_DECIMALS`.
/// Scaling down truncates.
pub fn scale_to_price_decimals(value: U256, decimals: u8) -> Option<U256> {
    let ten = U256::from(10);
    match decimals.cmp(&PRICE_DECIMALS) {
        std::cmp::Ordering::Equal => Some(value),
        std::cmp::Ordering::Greater => {
            let exp = U256::from(decimals - PRICE_DECIMALS);
            match ten.checked_pow(exp) {
                Some(divisor) => Some(value / divisor),
                // divisor larger than any U256
                None => Some(U256::ZERO),
            }
        }
        std::cmp::Ordering::Less => {
            let exp = U256::from(PRICE_DECIMALS - decimals);
            value.checked_mul(ten.checked_pow(exp)?)
        }
    }
}

/// `amount * price / PRICE_SCALE`, truncated. `None` on overflow.
pub fn convert_amount(amount: U256, price: U256) -> Option<U256> {
    Some(amount.checked_mul(price)? / PRICE_SCALE)
}

/// Parse a human-readable decimal string into a fixed-point integer,
/// e.g. `parse_units("32500", 8)` or `parse_units("0.5", 18)`.
pub fn parse_units(value: &str, decimals: u8) -> Option<U256> {
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if frac.len() > decimals as usize || (whole.is_empty() && frac.is_empty()) {
        return None;
    }
    let digits = format!("{whole}{frac:0<width$}", width = decimals as usize);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(&digits, 10).ok()
}

/// Source of the current unix time
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now_secs: u64) -> Self {
        Self {
            now: AtomicU64::new(now_secs),
        }
    }

    pub fn set(&self, now_secs: u64) {
        self.now.store(now_secs, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
