//! Execution state aggregate: live progress of every tracked task.

use super::{ProjectId, TaskEvent, TaskId, TaskStatus, TransitionError, TransitionGuard};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Correlation data linking a task to a record in an external tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Tracker-native identifier.
    pub id: String,
    /// Human-readable identifier such as `GH-123`.
    pub identifier: String,
    /// Link to the external record.
    pub url: String,
    /// When the record was last synchronized.
    pub last_synced_at: DateTime<Utc>,
}

impl ExternalRef {
    /// Creates an external reference.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        identifier: impl Into<String>,
        url: impl Into<String>,
        last_synced_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            url: url.into(),
            last_synced_at,
        }
    }
}

/// Progress record for a single task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    status: TaskStatus,
    owner: Option<String>,
    #[serde(default)]
    evidence: Vec<String>,
    #[serde(default)]
    external_refs: BTreeMap<String, ExternalRef>,
    rate_id: Option<String>,
    block_reason: Option<String>,
    verified_by: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    elapsed_minutes: u64,
}

impl TaskResult {
    /// Creates a pending result with no history.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owner, set once work starts.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Returns the recorded evidence in insertion order.
    #[must_use]
    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    /// Returns external references keyed by provider name.
    #[must_use]
    pub const fn external_refs(&self) -> &BTreeMap<String, ExternalRef> {
        &self.external_refs
    }

    /// Returns the external reference for `provider`, if any.
    #[must_use]
    pub fn external_ref(&self, provider: &str) -> Option<&ExternalRef> {
        self.external_refs.get(provider)
    }

    /// Returns the external rate or tracking identifier given at start.
    #[must_use]
    pub fn rate_id(&self) -> Option<&str> {
        self.rate_id.as_deref()
    }

    /// Returns why the task is blocked, while it is blocked.
    #[must_use]
    pub fn block_reason(&self) -> Option<&str> {
        self.block_reason.as_deref()
    }

    /// Returns who verified the task.
    #[must_use]
    pub fn verified_by(&self) -> Option<&str> {
        self.verified_by.as_deref()
    }

    /// Returns when work last started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when work last completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whole minutes between the last start and completion.
    #[must_use]
    pub const fn elapsed_minutes(&self) -> u64 {
        self.elapsed_minutes
    }
}

/// Parameter object for reconstructing persisted execution state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedExecutionStateData {
    /// Persisted project identifier.
    pub project_id: ProjectId,
    /// Persisted per-task results.
    pub task_states: HashMap<TaskId, TaskResult>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Live progress record of a project.
///
/// Results are keyed by task identifier and may outlive the task in the
/// current plan. Entries are created lazily as `pending` on first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionState {
    project_id: ProjectId,
    task_states: HashMap<TaskId, TaskResult>,
    updated_at: DateTime<Utc>,
}

impl ExecutionState {
    /// Creates an empty execution state.
    #[must_use]
    pub fn new(project_id: ProjectId, clock: &impl Clock) -> Self {
        Self {
            project_id,
            task_states: HashMap::new(),
            updated_at: clock.utc(),
        }
    }

    /// Reconstructs execution state from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedExecutionStateData) -> Self {
        Self {
            project_id: data.project_id,
            task_states: data.task_states,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns all tracked results.
    #[must_use]
    pub const fn task_states(&self) -> &HashMap<TaskId, TaskResult> {
        &self.task_states
    }

    /// Returns the result for `task_id`, if tracked.
    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<&TaskResult> {
        self.task_states.get(task_id)
    }

    /// Returns the status of `task_id`, treating untracked tasks as pending.
    #[must_use]
    pub fn status_of(&self, task_id: &TaskId) -> TaskStatus {
        self.task(task_id)
            .map_or(TaskStatus::Pending, TaskResult::status)
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Adds a pending result for every identifier not already tracked.
    ///
    /// Existing results are never reset. Returns the number of results added.
    pub fn seed_pending<'a, I>(&mut self, task_ids: I, clock: &impl Clock) -> usize
    where
        I: IntoIterator<Item = &'a TaskId>,
    {
        let mut seeded = 0_usize;
        for task_id in task_ids {
            if !self.task_states.contains_key(task_id) {
                self.task_states
                    .insert(task_id.clone(), TaskResult::pending());
                seeded += 1;
            }
        }
        if seeded > 0 {
            self.touch(clock);
        }
        seeded
    }

    /// Sets the owner of a task.
    pub fn set_owner(&mut self, task_id: &TaskId, owner: impl Into<String>, clock: &impl Clock) {
        self.entry(task_id).owner = Some(owner.into());
        self.touch(clock);
    }

    /// Overwrites the status of a task without consulting the state machine.
    ///
    /// Intended for sync collaborators mirroring an external tracker.
    pub fn set_status(&mut self, task_id: &TaskId, status: TaskStatus, clock: &impl Clock) {
        self.entry(task_id).status = status;
        self.touch(clock);
    }

    /// Appends a piece of evidence to a task.
    pub fn add_evidence(
        &mut self,
        task_id: &TaskId,
        evidence: impl Into<String>,
        clock: &impl Clock,
    ) {
        self.entry(task_id).evidence.push(evidence.into());
        self.touch(clock);
    }

    /// Records the external reference for `provider`, replacing only that key.
    pub fn set_external_ref(
        &mut self,
        task_id: &TaskId,
        provider: impl Into<String>,
        external_ref: ExternalRef,
        clock: &impl Clock,
    ) {
        self.entry(task_id)
            .external_refs
            .insert(provider.into(), external_ref);
        self.touch(clock);
    }

    /// Starts work on a task.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `start` is illegal from the current
    /// status or vetoed by `guard`. Nothing is mutated on error.
    pub fn start(
        &mut self,
        task_id: &TaskId,
        owner: impl Into<String>,
        rate_id: Option<String>,
        guard: Option<&dyn TransitionGuard>,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        let now = clock.utc();
        let result = self.transition(task_id, TaskEvent::Start, guard)?;
        result.owner = Some(owner.into());
        result.started_at = Some(now);
        if rate_id.is_some() {
            result.rate_id = rate_id;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Marks a task done, recording elapsed time and optional evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `complete` is illegal from the current
    /// status or vetoed by `guard`. Nothing is mutated on error.
    pub fn complete(
        &mut self,
        task_id: &TaskId,
        evidence: &str,
        guard: Option<&dyn TransitionGuard>,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        let now = clock.utc();
        let result = self.transition(task_id, TaskEvent::Complete, guard)?;
        result.completed_at = Some(now);
        result.elapsed_minutes = result.started_at.map_or(0, |started_at| {
            u64::try_from((now - started_at).num_minutes()).unwrap_or(0)
        });
        if !evidence.trim().is_empty() {
            result.evidence.push(evidence.to_owned());
        }
        self.updated_at = now;
        Ok(())
    }

    /// Blocks a task, remembering the reason.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `block` is illegal from the current
    /// status or vetoed by `guard`. Nothing is mutated on error.
    pub fn block(
        &mut self,
        task_id: &TaskId,
        reason: &str,
        guard: Option<&dyn TransitionGuard>,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        let result = self.transition(task_id, TaskEvent::Block, guard)?;
        result.block_reason = (!reason.trim().is_empty()).then(|| reason.to_owned());
        self.touch(clock);
        Ok(())
    }

    /// Returns a blocked task to pending.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `unblock` is illegal from the current
    /// status or vetoed by `guard`. Nothing is mutated on error.
    pub fn unblock(
        &mut self,
        task_id: &TaskId,
        guard: Option<&dyn TransitionGuard>,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        let result = self.transition(task_id, TaskEvent::Unblock, guard)?;
        result.block_reason = None;
        self.touch(clock);
        Ok(())
    }

    /// Verifies a done task.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `verify` is illegal from the current
    /// status or vetoed by `guard`. Nothing is mutated on error.
    pub fn verify(
        &mut self,
        task_id: &TaskId,
        verifier: impl Into<String>,
        guard: Option<&dyn TransitionGuard>,
        clock: &impl Clock,
    ) -> Result<(), TransitionError> {
        let result = self.transition(task_id, TaskEvent::Verify, guard)?;
        result.verified_by = Some(verifier.into());
        self.touch(clock);
        Ok(())
    }

    /// Returns the status `event` would produce for `task_id` without
    /// applying it.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the event is illegal from the current
    /// status or vetoed by `guard`.
    pub fn check_transition(
        &self,
        task_id: &TaskId,
        event: TaskEvent,
        guard: Option<&dyn TransitionGuard>,
    ) -> Result<TaskStatus, TransitionError> {
        let from_status = self.status_of(task_id);
        let vetoed = guard.is_some_and(|policy| !policy.allows(task_id, event));
        from_status
            .transition_with(event)
            .filter(|_| !vetoed)
            .ok_or_else(|| TransitionError {
                task_id: task_id.clone(),
                from_status,
                to_status: event.target(),
                event,
            })
    }

    /// Applies `event`, creating the entry only once the transition is known
    /// to be legal.
    fn transition(
        &mut self,
        task_id: &TaskId,
        event: TaskEvent,
        guard: Option<&dyn TransitionGuard>,
    ) -> Result<&mut TaskResult, TransitionError> {
        let next = self.check_transition(task_id, event, guard)?;
        let result = self.entry(task_id);
        result.status = next;
        Ok(result)
    }

    fn entry(&mut self, task_id: &TaskId) -> &mut TaskResult {
        self.task_states.entry(task_id.clone()).or_default()
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
