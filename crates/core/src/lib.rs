//! Core types and utilities for the ETH-BTC swap engine
//!
//! This crate provides shared types used across all components:
//! - Fixed-point price and feed reading types
//! - Swap records and events
//! - Oracle and deployment configuration
//! - Built-in network feed registry

pub mod types;
pub mod networks;
pub mod config;
pub mod errors;

pub use types::*;
pub use networks::*;
pub use config::*;
pub use errors::*;
