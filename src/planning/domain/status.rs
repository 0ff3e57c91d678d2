//! Task status and plan approval state machines.
//!
//! Both machines are fixed tables over `Copy` enums. The enums are the only
//! source of state names; storage and display strings are derived from them.

use super::{ParseApprovalStatusError, ParseTaskEventError, ParseTaskStatusError, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    Pending,
    /// Work is underway.
    InProgress,
    /// Work is held up by an external impediment.
    Blocked,
    /// Work is finished but not yet verified.
    Done,
    /// Work is finished and verified.
    Verified,
}

/// Event driving a [`TaskStatus`] transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEvent {
    /// Begin work on a pending task.
    Start,
    /// Finish work on an in-progress task.
    Complete,
    /// Mark a pending or in-progress task as blocked.
    Block,
    /// Return a blocked task to pending.
    Unblock,
    /// Abandon in-progress work, returning the task to pending.
    Stop,
    /// Return a done or verified task to pending.
    Reopen,
    /// Confirm a done task.
    Verify,
}

impl TaskStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Blocked,
        Self::Done,
        Self::Verified,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Verified => "verified",
        }
    }

    /// Returns the status reached by applying `event`, if the table allows it.
    #[must_use]
    pub const fn transition_with(self, event: TaskEvent) -> Option<Self> {
        match (self, event) {
            (Self::Pending, TaskEvent::Start) => Some(Self::InProgress),
            (Self::Pending | Self::InProgress, TaskEvent::Block) => Some(Self::Blocked),
            (Self::InProgress, TaskEvent::Complete) => Some(Self::Done),
            (Self::InProgress, TaskEvent::Stop)
            | (Self::Blocked, TaskEvent::Unblock)
            | (Self::Done | Self::Verified, TaskEvent::Reopen) => Some(Self::Pending),
            (Self::Done, TaskEvent::Verify) => Some(Self::Verified),
            _ => None,
        }
    }

    /// Returns whether `event` is legal from this status.
    #[must_use]
    pub const fn can_transition_with(self, event: TaskEvent) -> bool {
        self.transition_with(event).is_some()
    }

    /// Returns whether this status satisfies a dependency.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Done | Self::Verified)
    }

    /// Returns whether no further forward progress is possible.
    ///
    /// `Done` is not final: it may still be verified or reopened.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "verified" => Ok(Self::Verified),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl TaskEvent {
    /// All events.
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Complete,
        Self::Block,
        Self::Unblock,
        Self::Stop,
        Self::Reopen,
        Self::Verify,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Stop => "stop",
            Self::Reopen => "reopen",
            Self::Verify => "verify",
        }
    }

    /// Returns the status this event leads to when it is legal.
    #[must_use]
    pub const fn target(self) -> TaskStatus {
        match self {
            Self::Start => TaskStatus::InProgress,
            Self::Complete => TaskStatus::Done,
            Self::Block => TaskStatus::Blocked,
            Self::Unblock | Self::Stop | Self::Reopen => TaskStatus::Pending,
            Self::Verify => TaskStatus::Verified,
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskEvent {
    type Error = ParseTaskEventError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == normalized)
            .ok_or_else(|| ParseTaskEventError(value.to_owned()))
    }
}

/// Review status of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved for execution.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether a change to `target` is allowed.
    ///
    /// Approved and rejected plans can only return to pending review; they
    /// never flip directly into each other.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected)
                | (Self::Approved | Self::Rejected, Self::Pending)
        )
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ApprovalStatus {
    type Error = ParseApprovalStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseApprovalStatusError(value.to_owned())),
        }
    }
}

/// Policy hook that may veto an otherwise legal task transition.
///
/// Returning `false` rejects the transition with the same error shape as an
/// illegal one.
pub trait TransitionGuard: Send + Sync {
    /// Returns whether `event` may be applied to `task_id`.
    fn allows(&self, task_id: &TaskId, event: TaskEvent) -> bool;
}

impl<F> TransitionGuard for F
where
    F: Fn(&TaskId, TaskEvent) -> bool + Send + Sync,
{
    fn allows(&self, task_id: &TaskId, event: TaskEvent) -> bool {
        self(task_id, event)
    }
}
