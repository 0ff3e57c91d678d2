//! Merges regenerated task lists into a persisted plan.

use crate::planning::domain::{
    ApprovalStatus, PersistedPlanData, Plan, PlanId, PlanningDomainError, Task, TaskId,
    validate_dag,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Overrides applied while reconciling a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    spec_id: Option<String>,
    existing_id: Option<PlanId>,
    created_at: Option<DateTime<Utc>>,
}

impl ReconcileOptions {
    /// Creates options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the specification the plan was generated from.
    #[must_use]
    pub fn with_spec_id(mut self, spec_id: impl Into<String>) -> Self {
        self.spec_id = Some(spec_id.into());
        self
    }

    /// Forces the identifier of the reconciled plan.
    #[must_use]
    pub fn with_existing_id(mut self, plan_id: PlanId) -> Self {
        self.existing_id = Some(plan_id);
        self
    }

    /// Forces the creation timestamp of the reconciled plan.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Builds a new plan from generator output and the previously persisted plan.
///
/// Proposed tasks replace existing tasks with the same identifier in full.
/// Existing tasks that were not proposed again are kept as orphans after the
/// proposed ones, in their original order. Tasks without an identifier or
/// title are dropped silently. The result always awaits re-approval.
#[derive(Debug)]
pub struct PlanReconciler<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> Clone for PlanReconciler<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> PlanReconciler<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Reconciles `proposed` against `existing`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::DependencyCycle`] or
    /// [`PlanningDomainError::DuplicateTaskId`] when the merged task list is
    /// not a valid dependency graph. No plan is produced in that case.
    pub fn reconcile(
        &self,
        existing: Option<&Plan>,
        proposed: Vec<Task>,
        options: ReconcileOptions,
    ) -> Result<Plan, PlanningDomainError> {
        let previous = existing.map_or(&[][..], Plan::tasks);
        let proposed_count = proposed.len();
        let mut tasks = Vec::with_capacity(proposed_count + previous.len());
        let mut regenerated: HashSet<TaskId> = HashSet::with_capacity(proposed_count);

        for task in proposed.into_iter().filter(Task::is_well_formed) {
            regenerated.insert(task.id().clone());
            tasks.push(task);
        }
        let accepted = tasks.len();

        tasks.extend(
            previous
                .iter()
                .filter(|task| !regenerated.contains(task.id()))
                .filter(|task| task.is_well_formed())
                .cloned(),
        );
        let orphans = tasks.len() - accepted;

        validate_dag(&tasks)?;

        let now = self.clock.utc();
        let ReconcileOptions {
            spec_id,
            existing_id,
            created_at,
        } = options;
        let plan = Plan::from_persisted(PersistedPlanData {
            id: existing_id
                .or_else(|| existing.map(|plan| plan.id().clone()))
                .unwrap_or_else(PlanId::generate),
            spec_id: spec_id
                .or_else(|| existing.map(|plan| plan.spec_id().to_owned()))
                .unwrap_or_default(),
            tasks,
            approval_status: ApprovalStatus::Pending,
            approved_by: None,
            created_at: created_at
                .or_else(|| existing.map(Plan::created_at))
                .unwrap_or(now),
            updated_at: now,
        });

        debug!(
            plan_id = %plan.id(),
            proposed = proposed_count,
            accepted,
            orphans,
            dropped = proposed_count - accepted,
            "reconciled plan"
        );
        Ok(plan)
    }
}
