//! Read-only projections combining a plan with its execution state.

use super::{
    ApprovalStatus, DependencyError, ExecutionState, Plan, PlanId, Priority, Task, TaskId,
    TaskStatus,
};
use serde::{Deserialize, Serialize};

/// Returns whether `task` is pending and every dependency is complete.
#[must_use]
pub fn is_unlocked(task: &Task, state: &ExecutionState) -> bool {
    state.status_of(task.id()) == TaskStatus::Pending
        && task
            .depends_on()
            .iter()
            .all(|dependency| state.status_of(dependency).is_complete())
}

/// Checks that every dependency of `task` is done or verified.
///
/// # Errors
///
/// Returns a [`DependencyError`] for the first incomplete dependency in
/// declared order. Dependencies the state does not track count as pending.
pub fn check_dependencies(task: &Task, state: &ExecutionState) -> Result<(), DependencyError> {
    task.depends_on()
        .iter()
        .map(|dependency| (dependency, state.status_of(dependency)))
        .find(|(_, status)| !status.is_complete())
        .map_or(Ok(()), |(dependency, status)| {
            Err(DependencyError {
                task_id: task.id().clone(),
                dependency_id: dependency.clone(),
                status,
            })
        })
}

/// Returns the identifiers of unlocked tasks in plan order.
#[must_use]
pub fn unlocked_tasks(plan: &Plan, state: &ExecutionState) -> Vec<TaskId> {
    plan.tasks()
        .iter()
        .filter(|task| is_unlocked(task, state))
        .map(|task| task.id().clone())
        .collect()
}

/// Flattened view of one planned task and its progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Task priority.
    pub priority: Priority,
    /// Current status, `pending` when untracked.
    pub status: TaskStatus,
    /// Current owner, if any.
    pub owner: Option<String>,
    /// Dependencies in declared order.
    pub depends_on: Vec<TaskId>,
    /// Whether the task can be started now.
    pub unlocked: bool,
}

impl TaskSummary {
    /// Builds the summary of `task` against `state`.
    #[must_use]
    pub fn from_task(task: &Task, state: &ExecutionState) -> Self {
        let result = state.task(task.id());
        Self {
            id: task.id().clone(),
            title: task.title().to_owned(),
            priority: task.priority(),
            status: state.status_of(task.id()),
            owner: result.and_then(|entry| entry.owner().map(str::to_owned)),
            depends_on: task.depends_on().to_vec(),
            unlocked: is_unlocked(task, state),
        }
    }
}

/// Summaries of every task in plan order.
#[must_use]
pub fn task_summaries(plan: &Plan, state: &ExecutionState) -> Vec<TaskSummary> {
    plan.tasks()
        .iter()
        .map(|task| TaskSummary::from_task(task, state))
        .collect()
}

/// Point-in-time progress report of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Plan the snapshot was taken from.
    pub plan_id: PlanId,
    /// Approval status of that plan.
    pub approval_status: ApprovalStatus,
    /// Number of tasks in the plan.
    pub total_tasks: usize,
    /// Number of tasks done or verified.
    pub completed_tasks: usize,
    /// Floor of `completed_tasks / total_tasks * 100`; zero for empty plans.
    pub progress_percent: usize,
    /// Tasks that are done but not verified.
    pub completed: Vec<TaskId>,
    /// Verified tasks.
    pub verified: Vec<TaskId>,
    /// Tasks in progress.
    pub in_progress: Vec<TaskId>,
    /// Blocked tasks.
    pub blocked: Vec<TaskId>,
    /// Pending tasks whose dependencies are all complete.
    pub unlocked: Vec<TaskId>,
}

impl ProjectSnapshot {
    /// Buckets every planned task by status.
    #[must_use]
    pub fn build(plan: &Plan, state: &ExecutionState) -> Self {
        let mut snapshot = Self {
            plan_id: plan.id().clone(),
            approval_status: plan.approval_status(),
            total_tasks: plan.tasks().len(),
            completed_tasks: 0,
            progress_percent: 0,
            completed: Vec::new(),
            verified: Vec::new(),
            in_progress: Vec::new(),
            blocked: Vec::new(),
            unlocked: Vec::new(),
        };

        for task in plan.tasks() {
            let task_id = task.id().clone();
            match state.status_of(task.id()) {
                TaskStatus::Done => snapshot.completed.push(task_id),
                TaskStatus::Verified => snapshot.verified.push(task_id),
                TaskStatus::InProgress => snapshot.in_progress.push(task_id),
                TaskStatus::Blocked => snapshot.blocked.push(task_id),
                TaskStatus::Pending if is_unlocked(task, state) => snapshot.unlocked.push(task_id),
                TaskStatus::Pending => {}
            }
        }

        snapshot.completed_tasks = snapshot.completed.len() + snapshot.verified.len();
        snapshot.progress_percent = (snapshot.completed_tasks * 100)
            .checked_div(snapshot.total_tasks)
            .unwrap_or(0);
        snapshot
    }
}
