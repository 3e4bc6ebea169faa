//! Intent protocol implementations.

pub mod near_intents;
