//! Repository ports for the plan and execution state aggregates.
//!
//! Each repository stores exactly one aggregate per project. Saves replace
//! the stored value wholesale; the two repositories share no transaction.

use crate::planning::domain::{ExecutionState, Plan};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for planning repository operations.
pub type PlanningRepositoryResult<T> = Result<T, PlanningRepositoryError>;

/// Plan persistence contract.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Loads the current plan.
    ///
    /// Returns `None` when no plan has been saved.
    async fn load(&self) -> PlanningRepositoryResult<Option<Plan>>;

    /// Replaces the stored plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::Persistence`] when the write fails.
    async fn save(&self, plan: &Plan) -> PlanningRepositoryResult<()>;
}

/// Execution state persistence contract.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Loads the current execution state.
    ///
    /// Returns `None` when no state has been saved.
    async fn load(&self) -> PlanningRepositoryResult<Option<ExecutionState>>;

    /// Replaces the stored execution state.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningRepositoryError::Persistence`] when the write fails.
    async fn save(&self, state: &ExecutionState) -> PlanningRepositoryResult<()>;
}

/// Errors returned by planning repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PlanningRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlanningRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
