//! Coordinator for every mutation spanning the plan and execution state.
//!
//! Plans and execution state are persisted independently with no shared
//! transaction. The coordinator is the single writer for both: mutators hold
//! an exclusive lock for their whole read-modify-write cycle, including
//! repository I/O, and queries hold a shared lock. Event publication is best
//! effort; failures are logged and never reach the caller.

use super::{CoordinatorConfig, PlanReconciler, ReconcileOptions};
use crate::planning::{
    domain::{
        ApprovalStatus, DependencyError, ExecutionState, ExternalRef, Plan, PlanningDomainError,
        ProjectSnapshot, Task, TaskEvent, TaskId, TaskResult, TaskStatus, TaskSummary,
        TransitionError, TransitionGuard, check_dependencies, task_summaries, unlocked_tasks,
    },
    ports::{
        EventPublisher, PlanRepository, PlanningRepositoryError, PublishResult, StateRepository,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Service-level errors for coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// No plan has been saved yet.
    #[error("no plan exists")]
    NoPlan,

    /// No execution state has been saved yet.
    #[error("no execution state exists")]
    NoState,

    /// The plan must be approved before work can start.
    #[error("plan is not approved")]
    PlanNotApproved,

    /// The task is not part of the current plan.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Starting a task requires a non-empty owner.
    #[error("owner is required to start a task")]
    OwnerRequired,

    /// The task state machine rejected the operation.
    #[error(transparent)]
    InvalidTransition(TransitionError),

    /// A dependency of the task is not complete.
    #[error(transparent)]
    DependenciesNotMet(DependencyError),

    /// Plan-level domain validation failed.
    #[error(transparent)]
    Domain(PlanningDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PlanningRepositoryError),
}

impl CoordinatorError {
    /// Returns whether the error reports a rejected state transition of a
    /// task or of plan approval.
    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition(_)
                | Self::Domain(PlanningDomainError::InvalidApprovalTransition { .. })
        )
    }

    /// Returns whether the error reports an incomplete dependency.
    #[must_use]
    pub const fn is_dependencies_not_met(&self) -> bool {
        matches!(self, Self::DependenciesNotMet(_))
    }
}

impl From<TransitionError> for CoordinatorError {
    fn from(err: TransitionError) -> Self {
        Self::InvalidTransition(err)
    }
}

impl From<DependencyError> for CoordinatorError {
    fn from(err: DependencyError) -> Self {
        Self::DependenciesNotMet(err)
    }
}

impl From<PlanningDomainError> for CoordinatorError {
    fn from(err: PlanningDomainError) -> Self {
        match err {
            PlanningDomainError::InvalidTransition(inner) => Self::InvalidTransition(inner),
            PlanningDomainError::DependenciesNotMet(inner) => Self::DependenciesNotMet(inner),
            other => Self::Domain(other),
        }
    }
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Single authority over plan approval and task execution.
///
/// Share one coordinator (for example behind an [`Arc`]) between all callers;
/// separate instances do not serialize against each other.
pub struct PlanningCoordinator<P, S, E, C>
where
    P: PlanRepository,
    S: StateRepository,
    E: EventPublisher,
    C: Clock + Send + Sync,
{
    plans: Arc<P>,
    states: Arc<S>,
    publisher: Arc<E>,
    clock: Arc<C>,
    reconciler: PlanReconciler<C>,
    config: CoordinatorConfig,
    guard: Option<Arc<dyn TransitionGuard>>,
    lock: RwLock<()>,
}

impl<P, S, E, C> PlanningCoordinator<P, S, E, C>
where
    P: PlanRepository,
    S: StateRepository,
    E: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator with the default configuration and no guard.
    #[must_use]
    pub fn new(plans: Arc<P>, states: Arc<S>, publisher: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            plans,
            states,
            publisher,
            reconciler: PlanReconciler::new(Arc::clone(&clock)),
            clock,
            config: CoordinatorConfig::default(),
            guard: None,
            lock: RwLock::new(()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a policy guard consulted before every task transition.
    #[must_use]
    pub fn with_guard(mut self, guard: impl TransitionGuard + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Reconciles generator output into the persisted plan and saves it.
    ///
    /// The stored execution state is left untouched. The new plan always
    /// requires approval again.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Domain`] when the merged tasks contain a
    /// cycle or duplicate identifiers, in which case nothing is saved, or
    /// repository errors.
    pub async fn reconcile_plan(
        &self,
        proposed: Vec<Task>,
        options: ReconcileOptions,
    ) -> CoordinatorResult<Plan> {
        let _write = self.lock.write().await;
        let existing = self.plans.load().await?;
        let plan = self
            .reconciler
            .reconcile(existing.as_ref(), proposed, options)?;
        self.plans.save(&plan).await?;
        info!(
            plan_id = %plan.id(),
            tasks = plan.tasks().len(),
            "plan regenerated and awaiting approval"
        );
        Ok(plan)
    }

    /// Approves the plan and seeds execution state for every planned task.
    ///
    /// Approving an approved plan saves nothing on the plan side but still
    /// seeds any task missing from the execution state, so retrying after a
    /// failed state save completes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`], an invalid approval transition
    /// when the plan was rejected, or repository errors.
    pub async fn approve_plan(&self, approver: &str) -> CoordinatorResult<Plan> {
        let _write = self.lock.write().await;
        let mut plan = self.load_plan().await?;

        let newly_approved = !plan.is_approved();
        if newly_approved {
            plan.approve(approver, &*self.clock)?;
            self.plans.save(&plan).await?;
        } else {
            debug!(plan_id = %plan.id(), "plan already approved");
        }

        let stored = self.states.load().await?;
        let created = stored.is_none();
        let mut state = stored
            .unwrap_or_else(|| ExecutionState::new(self.config.project_id.clone(), &*self.clock));
        let seeded = state.seed_pending(plan.tasks().iter().map(Task::id), &*self.clock);
        if created || seeded > 0 {
            self.states.save(&state).await?;
        }

        if newly_approved {
            info!(plan_id = %plan.id(), approver, seeded, "plan approved");
            log_publish_failure(
                "plan_approved",
                self.publisher
                    .publish_plan_approved(plan.id(), approver)
                    .await,
            );
        }
        Ok(plan)
    }

    /// Rejects a plan that is pending review.
    ///
    /// Rejecting a rejected plan is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`], an invalid approval transition
    /// when the plan is approved, or repository errors.
    pub async fn reject_plan(&self, reviewer: &str) -> CoordinatorResult<Plan> {
        let _write = self.lock.write().await;
        let mut plan = self.load_plan().await?;
        if plan.approval_status() == ApprovalStatus::Rejected {
            debug!(plan_id = %plan.id(), "plan already rejected");
            return Ok(plan);
        }
        plan.reject(&*self.clock)?;
        self.plans.save(&plan).await?;
        info!(plan_id = %plan.id(), reviewer, "plan rejected");
        Ok(plan)
    }

    /// Starts work on a task of the approved plan.
    ///
    /// # Errors
    ///
    /// Returns, in order of checking: [`CoordinatorError::OwnerRequired`],
    /// [`CoordinatorError::NoPlan`], [`CoordinatorError::PlanNotApproved`],
    /// [`CoordinatorError::TaskNotFound`], [`CoordinatorError::NoState`],
    /// [`CoordinatorError::InvalidTransition`] and
    /// [`CoordinatorError::DependenciesNotMet`] naming the first incomplete
    /// dependency. Repository errors may occur at any step.
    pub async fn start_task(
        &self,
        task_id: &TaskId,
        owner: &str,
        rate_id: Option<&str>,
    ) -> CoordinatorResult<TaskResult> {
        if owner.trim().is_empty() {
            return Err(CoordinatorError::OwnerRequired);
        }

        let _write = self.lock.write().await;
        let plan = self.load_plan().await?;
        if !plan.is_approved() {
            return Err(CoordinatorError::PlanNotApproved);
        }
        let task = find_task(&plan, task_id)?;
        let mut state = self.load_state().await?;

        state.check_transition(task_id, TaskEvent::Start, self.guard())?;
        check_dependencies(task, &state)?;
        // The guard has already ruled on this start.
        state.start(task_id, owner, rate_id.map(str::to_owned), None, &*self.clock)?;
        self.states.save(&state).await?;

        info!(%task_id, owner, ?rate_id, "task started");
        log_publish_failure(
            "task_started",
            self.publisher
                .publish_task_started(task_id, owner, rate_id)
                .await,
        );
        Ok(task_result(&state, task_id))
    }

    /// Completes an in-progress task and reports which tasks are now ready.
    ///
    /// The returned identifiers are every planned task that is pending and has
    /// all dependencies done or verified, in plan order.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`], [`CoordinatorError::TaskNotFound`],
    /// [`CoordinatorError::NoState`], [`CoordinatorError::InvalidTransition`]
    /// or repository errors.
    pub async fn complete_task(
        &self,
        task_id: &TaskId,
        evidence: &str,
    ) -> CoordinatorResult<Vec<TaskId>> {
        let _write = self.lock.write().await;
        let plan = self.load_plan().await?;
        find_task(&plan, task_id)?;
        let mut state = self.load_state().await?;

        state.complete(task_id, evidence, self.guard(), &*self.clock)?;
        self.states.save(&state).await?;

        let unlocked = unlocked_tasks(&plan, &state);
        info!(
            %task_id,
            elapsed_minutes = state.task(task_id).map_or(0, TaskResult::elapsed_minutes),
            unlocked = unlocked.len(),
            "task completed"
        );
        log_publish_failure(
            "task_completed",
            self.publisher
                .publish_task_completed(task_id, evidence)
                .await,
        );
        Ok(unlocked)
    }

    /// Blocks a pending or in-progress task.
    ///
    /// Only the execution state is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoState`],
    /// [`CoordinatorError::InvalidTransition`] or repository errors.
    pub async fn block_task(&self, task_id: &TaskId, reason: &str) -> CoordinatorResult<()> {
        let _write = self.lock.write().await;
        let mut state = self.load_state().await?;
        state.block(task_id, reason, self.guard(), &*self.clock)?;
        self.states.save(&state).await?;

        info!(%task_id, reason, "task blocked");
        log_publish_failure(
            "task_blocked",
            self.publisher.publish_task_blocked(task_id, reason).await,
        );
        Ok(())
    }

    /// Returns a blocked task to pending.
    ///
    /// Only the execution state is consulted.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoState`],
    /// [`CoordinatorError::InvalidTransition`] or repository errors.
    pub async fn unblock_task(&self, task_id: &TaskId) -> CoordinatorResult<()> {
        let _write = self.lock.write().await;
        let mut state = self.load_state().await?;
        state.unblock(task_id, self.guard(), &*self.clock)?;
        self.states.save(&state).await?;

        info!(%task_id, "task unblocked");
        log_publish_failure(
            "task_unblocked",
            self.publisher.publish_task_unblocked(task_id).await,
        );
        Ok(())
    }

    /// Verifies a done task.
    ///
    /// Unlike the other mutators this publishes no event.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoState`],
    /// [`CoordinatorError::InvalidTransition`] or repository errors.
    pub async fn verify_task(&self, task_id: &TaskId, verifier: &str) -> CoordinatorResult<()> {
        let _write = self.lock.write().await;
        let mut state = self.load_state().await?;
        state.verify(task_id, verifier, self.guard(), &*self.clock)?;
        self.states.save(&state).await?;

        info!(%task_id, verifier, "task verified");
        Ok(())
    }

    /// Records the external tracker reference of a task for `provider`.
    ///
    /// References of other providers are left as they are. An untracked task
    /// gets a pending result first.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoState`] or repository errors.
    pub async fn link_external_ref(
        &self,
        task_id: &TaskId,
        provider: &str,
        external_ref: ExternalRef,
    ) -> CoordinatorResult<()> {
        let _write = self.lock.write().await;
        let mut state = self.load_state().await?;
        let identifier = external_ref.identifier.clone();
        state.set_external_ref(task_id, provider, external_ref, &*self.clock);
        self.states.save(&state).await?;

        debug!(%task_id, provider, %identifier, "external reference linked");
        Ok(())
    }

    /// Returns the stored plan.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_plan(&self) -> CoordinatorResult<Option<Plan>> {
        let _read = self.lock.read().await;
        Ok(self.plans.load().await?)
    }

    /// Returns the stored execution state.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_state(&self) -> CoordinatorResult<Option<ExecutionState>> {
        let _read = self.lock.read().await;
        Ok(self.states.load().await?)
    }

    /// Returns a progress snapshot of the plan.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`] or repository errors.
    pub async fn get_project_snapshot(&self) -> CoordinatorResult<ProjectSnapshot> {
        let _read = self.lock.read().await;
        let (plan, state) = self.load_projection().await?;
        Ok(ProjectSnapshot::build(&plan, &state))
    }

    /// Returns a summary of every planned task in plan order.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`] or repository errors.
    pub async fn get_task_summaries(&self) -> CoordinatorResult<Vec<TaskSummary>> {
        let _read = self.lock.read().await;
        let (plan, state) = self.load_projection().await?;
        Ok(task_summaries(&plan, &state))
    }

    /// Returns pending tasks whose dependencies are all complete.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`] or repository errors.
    pub async fn get_ready_tasks(&self) -> CoordinatorResult<Vec<TaskSummary>> {
        self.summaries_where(|summary| summary.unlocked).await
    }

    /// Returns blocked tasks.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`] or repository errors.
    pub async fn get_blocked_tasks(&self) -> CoordinatorResult<Vec<TaskSummary>> {
        self.summaries_where(|summary| summary.status == TaskStatus::Blocked)
            .await
    }

    /// Returns tasks in progress.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoPlan`] or repository errors.
    pub async fn get_in_progress_tasks(&self) -> CoordinatorResult<Vec<TaskSummary>> {
        self.summaries_where(|summary| summary.status == TaskStatus::InProgress)
            .await
    }

    async fn summaries_where(
        &self,
        predicate: impl Fn(&TaskSummary) -> bool + Send,
    ) -> CoordinatorResult<Vec<TaskSummary>> {
        let _read = self.lock.read().await;
        let (plan, state) = self.load_projection().await?;
        Ok(task_summaries(&plan, &state)
            .into_iter()
            .filter(|summary| predicate(summary))
            .collect())
    }

    fn guard(&self) -> Option<&dyn TransitionGuard> {
        self.guard.as_deref()
    }

    async fn load_plan(&self) -> CoordinatorResult<Plan> {
        self.plans.load().await?.ok_or(CoordinatorError::NoPlan)
    }

    async fn load_state(&self) -> CoordinatorResult<ExecutionState> {
        self.states.load().await?.ok_or(CoordinatorError::NoState)
    }

    /// Loads the plan and its state, treating missing state as empty.
    async fn load_projection(&self) -> CoordinatorResult<(Plan, ExecutionState)> {
        let plan = self.load_plan().await?;
        let state = self.states.load().await?.unwrap_or_else(|| {
            ExecutionState::new(self.config.project_id.clone(), &*self.clock)
        });
        Ok((plan, state))
    }
}

fn find_task<'a>(plan: &'a Plan, task_id: &TaskId) -> CoordinatorResult<&'a Task> {
    plan.task(task_id)
        .ok_or_else(|| CoordinatorError::TaskNotFound(task_id.clone()))
}

fn task_result(state: &ExecutionState, task_id: &TaskId) -> TaskResult {
    state.task(task_id).cloned().unwrap_or_default()
}

fn log_publish_failure(event: &'static str, result: PublishResult) {
    if let Err(err) = result {
        warn!(event, error = %err, "event publication failed; continuing");
    }
}
