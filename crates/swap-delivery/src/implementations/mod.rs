//! Per-family delivery implementations.

pub mod evm;
pub mod near;
pub mod solana;
