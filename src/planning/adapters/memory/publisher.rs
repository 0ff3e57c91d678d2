//! Event publisher that records every notification in memory.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::planning::{
    domain::{PlanId, TaskId},
    ports::{EventPublisher, PublishError, PublishResult},
};

/// Notification captured by [`RecordingEventPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningEvent {
    /// A plan was approved.
    PlanApproved {
        /// Approved plan.
        plan_id: PlanId,
        /// Who approved it.
        approver: String,
    },
    /// Work on a task started.
    TaskStarted {
        /// Started task.
        task_id: TaskId,
        /// Who started it.
        owner: String,
        /// External rate or tracking identifier.
        rate_id: Option<String>,
    },
    /// A task was completed.
    TaskCompleted {
        /// Completed task.
        task_id: TaskId,
        /// Evidence supplied on completion.
        evidence: String,
    },
    /// A task was blocked.
    TaskBlocked {
        /// Blocked task.
        task_id: TaskId,
        /// Why it was blocked.
        reason: String,
    },
    /// A task was unblocked.
    TaskUnblocked {
        /// Released task.
        task_id: TaskId,
    },
}

/// Thread-safe publisher keeping events in publication order.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<RwLock<Vec<PlanningEvent>>>,
}

impl RecordingEventPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events published so far.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the event log lock is poisoned.
    pub fn events(&self) -> Result<Vec<PlanningEvent>, PublishError> {
        let events = self
            .events
            .read()
            .map_err(|err| PublishError::new(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }

    fn record(&self, event: PlanningEvent) -> PublishResult {
        let mut events = self
            .events
            .write()
            .map_err(|err| PublishError::new(std::io::Error::other(err.to_string())))?;
        events.push(event);
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish_plan_approved(&self, plan_id: &PlanId, approver: &str) -> PublishResult {
        self.record(PlanningEvent::PlanApproved {
            plan_id: plan_id.clone(),
            approver: approver.to_owned(),
        })
    }

    async fn publish_task_started(
        &self,
        task_id: &TaskId,
        owner: &str,
        rate_id: Option<&str>,
    ) -> PublishResult {
        self.record(PlanningEvent::TaskStarted {
            task_id: task_id.clone(),
            owner: owner.to_owned(),
            rate_id: rate_id.map(str::to_owned),
        })
    }

    async fn publish_task_completed(&self, task_id: &TaskId, evidence: &str) -> PublishResult {
        self.record(PlanningEvent::TaskCompleted {
            task_id: task_id.clone(),
            evidence: evidence.to_owned(),
        })
    }

    async fn publish_task_blocked(&self, task_id: &TaskId, reason: &str) -> PublishResult {
        self.record(PlanningEvent::TaskBlocked {
            task_id: task_id.clone(),
            reason: reason.to_owned(),
        })
    }

    async fn publish_task_unblocked(&self, task_id: &TaskId) -> PublishResult {
        self.record(PlanningEvent::TaskUnblocked {
            task_id: task_id.clone(),
        })
    }
}
