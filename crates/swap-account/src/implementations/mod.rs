//! Wallet implementations shipped with the workspace.

pub mod disconnected;
