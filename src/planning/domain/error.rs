//! Error types for planning domain validation and parsing.

use super::{ApprovalStatus, TaskEvent, TaskId, TaskStatus};
use thiserror::Error;

/// A task status change rejected by the transition table or a guard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("task {task_id}: cannot {event} from {from_status} to {to_status}")]
pub struct TransitionError {
    /// Task whose transition was rejected.
    pub task_id: TaskId,
    /// Status the task was in.
    pub from_status: TaskStatus,
    /// Status the event would have produced.
    pub to_status: TaskStatus,
    /// Event that was attempted.
    pub event: TaskEvent,
}

/// A task start rejected because a dependency is not complete.
///
/// Only the first unmet dependency in declaration order is reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("task {task_id} depends on {dependency_id}, which is {status}")]
pub struct DependencyError {
    /// Task that could not be started.
    pub task_id: TaskId,
    /// First dependency that is neither done nor verified.
    pub dependency_id: TaskId,
    /// Current status of that dependency.
    pub status: TaskStatus,
}

/// Errors returned by planning domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanningDomainError {
    /// The task state machine rejected an event.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A dependency of the task is not yet complete.
    #[error(transparent)]
    DependenciesNotMet(#[from] DependencyError),

    /// The plan approval state machine rejected a change.
    #[error("invalid plan approval transition: {from} -> {to}")]
    InvalidApprovalTransition {
        /// Current approval status.
        from: ApprovalStatus,
        /// Requested approval status.
        to: ApprovalStatus,
    },

    /// The dependency graph contains a cycle through the given task.
    #[error("dependency cycle detected at task {task_id}")]
    DependencyCycle {
        /// Task that closes the cycle.
        task_id: TaskId,
    },

    /// Two tasks in the plan share an identifier.
    #[error("duplicate task identifier: {0}")]
    DuplicateTaskId(TaskId),
}

/// Error returned while parsing a task status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a task event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task event: {0}")]
pub struct ParseTaskEventError(pub String);

/// Error returned while parsing an approval status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown approval status: {0}")]
pub struct ParseApprovalStatusError(pub String);

/// Error returned while parsing a task priority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
