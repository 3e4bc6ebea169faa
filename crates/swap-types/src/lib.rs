//! Shared types for the swap orchestration workspace.
//!
//! Everything that crosses a crate boundary lives here: chain and venue
//! identifiers, tokens, quotes, unsigned and signed transactions, swap
//! intents with their execution plans, the per-step status machine and the
//! error taxonomy surfaced to callers.

pub mod chains;
pub mod errors;
pub mod intent;
pub mod quote;
pub mod serde_helpers;
pub mod status;
pub mod tokens;
pub mod transaction;
pub mod venue;

pub use chains::*;
pub use errors::*;
pub use intent::*;
pub use quote::*;
pub use status::*;
pub use tokens::*;
pub use transaction::*;
pub use venue::*;
