//! Swap intent orchestration.
//!
//! [`SwapOrchestrator`] turns a [`SwapIntent`](swap_types::SwapIntent) into an
//! [`ExecutionPlan`](swap_types::ExecutionPlan) and drives it through
//! quote, build, sign, submit and confirmation. Same-chain swaps go to the
//! venue registered for the chain; swaps between chains are recorded with
//! the configured intent protocol. Progress is kept in memory per intent and
//! published on an [`EventBus`].

pub mod builder;
pub mod event_bus;
pub mod orchestrator;
pub mod planner;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use builder::OrchestratorBuilder;
pub use event_bus::{EventBus, SwapEvent};
pub use orchestrator::SwapOrchestrator;
pub use tracker::{StatusTracker, Submission};
