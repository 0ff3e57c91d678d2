//! Planwright: dependency-aware project planning and progress tracking.
//!
//! This crate keeps a project's work breakdown (a plan of dependent tasks)
//! consistent with its live progress (an execution state), gating work on
//! plan approval and dependency completion.
//!
//! # Architecture
//!
//! Planwright follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`planning`]: Plans, execution state, reconciliation and coordination

pub mod planning;
