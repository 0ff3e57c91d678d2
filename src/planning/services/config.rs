//! Coordinator configuration.

use crate::planning::domain::ProjectId;
use serde::{Deserialize, Serialize};

/// Settings for [`super::PlanningCoordinator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Project recorded on execution state the coordinator creates.
    pub project_id: ProjectId,
}

impl CoordinatorConfig {
    /// Creates a configuration for `project_id`.
    #[must_use]
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: ProjectId::new(project_id),
        }
    }
}
