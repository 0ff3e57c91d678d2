//! Plan aggregate root.

use super::{ApprovalStatus, PlanId, PlanningDomainError, Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Structural work breakdown of a project: tasks, their dependency graph and
/// the plan's approval status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    id: PlanId,
    spec_id: String,
    tasks: Vec<Task>,
    approval_status: ApprovalStatus,
    approved_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPlanData {
    /// Persisted plan identifier.
    pub id: PlanId,
    /// Persisted link to the originating specification.
    pub spec_id: String,
    /// Persisted tasks in plan order.
    pub tasks: Vec<Task>,
    /// Persisted approval status.
    pub approval_status: ApprovalStatus,
    /// Persisted approver, if approved.
    pub approved_by: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Creates a fresh plan awaiting approval.
    ///
    /// The task list is not validated; use
    /// [`crate::planning::services::PlanReconciler`] to build plans from
    /// generator output.
    #[must_use]
    pub fn new(spec_id: impl Into<String>, tasks: Vec<Task>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PlanId::generate(),
            spec_id: spec_id.into(),
            tasks,
            approval_status: ApprovalStatus::Pending,
            approved_by: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a plan from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPlanData) -> Self {
        Self {
            id: data.id,
            spec_id: data.spec_id,
            tasks: data.tasks,
            approval_status: data.approval_status,
            approved_by: data.approved_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> &PlanId {
        &self.id
    }

    /// Returns the linked specification identifier.
    #[must_use]
    pub fn spec_id(&self) -> &str {
        &self.spec_id
    }

    /// Returns the tasks in plan order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Returns the approval status.
    #[must_use]
    pub const fn approval_status(&self) -> ApprovalStatus {
        self.approval_status
    }

    /// Returns whether the plan is approved for execution.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self.approval_status, ApprovalStatus::Approved)
    }

    /// Returns who approved the plan, if anyone.
    #[must_use]
    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Approves the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::InvalidApprovalTransition`] unless the
    /// plan is pending review.
    pub fn approve(
        &mut self,
        approver: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), PlanningDomainError> {
        self.transition_approval(ApprovalStatus::Approved, clock)?;
        self.approved_by = Some(approver.into());
        Ok(())
    }

    /// Rejects the plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::InvalidApprovalTransition`] unless the
    /// plan is pending review.
    pub fn reject(&mut self, clock: &impl Clock) -> Result<(), PlanningDomainError> {
        self.transition_approval(ApprovalStatus::Rejected, clock)
    }

    /// Sends an approved or rejected plan back for review.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::InvalidApprovalTransition`] when the
    /// plan is already pending.
    pub fn reopen_review(&mut self, clock: &impl Clock) -> Result<(), PlanningDomainError> {
        self.transition_approval(ApprovalStatus::Pending, clock)?;
        self.approved_by = None;
        Ok(())
    }

    fn transition_approval(
        &mut self,
        target: ApprovalStatus,
        clock: &impl Clock,
    ) -> Result<(), PlanningDomainError> {
        if !self.approval_status.can_transition_to(target) {
            return Err(PlanningDomainError::InvalidApprovalTransition {
                from: self.approval_status,
                to: target,
            });
        }
        self.approval_status = target;
        self.updated_at = clock.utc();
        Ok(())
    }
}
