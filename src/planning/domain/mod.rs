//! Domain model for project planning and execution tracking.
//!
//! A [`Plan`] holds the structural work breakdown and its approval status;
//! an [`ExecutionState`] holds live progress keyed by task identifier. The
//! two aggregates are persisted independently and only combined by the
//! coordinator service and the read-only projections in this module.

mod error;
mod graph;
mod ids;
mod plan;
mod progress;
mod state;
mod status;
mod task;

pub use error::{
    DependencyError, ParseApprovalStatusError, ParsePriorityError, ParseTaskEventError,
    ParseTaskStatusError, PlanningDomainError, TransitionError,
};
pub use graph::validate_dag;
pub use ids::{PlanId, ProjectId, TaskId};
pub use plan::{PersistedPlanData, Plan};
pub use progress::{
    ProjectSnapshot, TaskSummary, check_dependencies, is_unlocked, task_summaries,
    unlocked_tasks,
};
pub use state::{ExecutionState, ExternalRef, PersistedExecutionStateData, TaskResult};
pub use status::{ApprovalStatus, TaskEvent, TaskStatus, TransitionGuard};
pub use task::{Priority, Task};
