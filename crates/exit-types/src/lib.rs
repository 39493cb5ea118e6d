//! Shared types for the pool exit service.
//!
//! This crate defines the domain model passed between the pool adapters,
//! the delivery layer and the exit handler, along with fixed-point unit
//! conversion helpers and the schema validation used by every pluggable
//! implementation.

pub mod chain;
pub mod delivery;
pub mod exit;
pub mod units;
pub mod validation;

pub use alloy::primitives::{address, Address, Bytes, TxHash, U256};
pub use chain::*;
pub use delivery::*;
pub use exit::*;
pub use units::*;
pub use validation::*;
