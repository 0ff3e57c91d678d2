//! In-memory execution state repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::planning::{
    domain::ExecutionState,
    ports::{PlanningRepositoryError, PlanningRepositoryResult, StateRepository},
};

/// Thread-safe in-memory execution state repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateRepository {
    state: Arc<RwLock<Option<ExecutionState>>>,
}

impl InMemoryStateRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository already holding `state`.
    #[must_use]
    pub fn with_state(state: ExecutionState) -> Self {
        Self {
            state: Arc::new(RwLock::new(Some(state))),
        }
    }
}

#[async_trait]
impl StateRepository for InMemoryStateRepository {
    async fn load(&self) -> PlanningRepositoryResult<Option<ExecutionState>> {
        let state = self.state.read().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.clone())
    }

    async fn save(&self, state: &ExecutionState) -> PlanningRepositoryResult<()> {
        let mut stored = self.state.write().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        *stored = Some(state.clone());
        Ok(())
    }
}
