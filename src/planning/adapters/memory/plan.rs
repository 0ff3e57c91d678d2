//! In-memory plan repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::planning::{
    domain::Plan,
    ports::{PlanRepository, PlanningRepositoryError, PlanningRepositoryResult},
};

/// Thread-safe in-memory plan repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanRepository {
    plan: Arc<RwLock<Option<Plan>>>,
}

impl InMemoryPlanRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository already holding `plan`.
    #[must_use]
    pub fn with_plan(plan: Plan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(Some(plan))),
        }
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn load(&self) -> PlanningRepositoryResult<Option<Plan>> {
        let plan = self.plan.read().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(plan.clone())
    }

    async fn save(&self, plan: &Plan) -> PlanningRepositoryResult<()> {
        let mut stored = self.plan.write().map_err(|err| {
            PlanningRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        *stored = Some(plan.clone());
        Ok(())
    }
}
