//! Project planning and execution tracking for Planwright.
//!
//! A plan of dependent tasks is reconciled from generator output, approved,
//! and then driven through a fixed task state machine while an independently
//! persisted execution state records progress. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
