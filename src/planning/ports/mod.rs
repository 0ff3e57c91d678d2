//! Port contracts for planning persistence and event publication.
//!
//! Ports define infrastructure-agnostic interfaces used by the coordinator.

pub mod publisher;
pub mod repository;

pub use publisher::{EventPublisher, PublishError, PublishResult};
pub use repository::{
    PlanRepository, PlanningRepositoryError, PlanningRepositoryResult, StateRepository,
};
