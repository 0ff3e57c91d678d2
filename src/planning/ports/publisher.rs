//! Best-effort notification port for planning lifecycle events.

use crate::planning::domain::{PlanId, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event publication.
pub type PublishResult = Result<(), PublishError>;

/// Receives notifications after successful coordinator mutations.
///
/// Callers treat every error as non-fatal: failures are logged and dropped.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// A plan was approved.
    async fn publish_plan_approved(&self, plan_id: &PlanId, approver: &str) -> PublishResult;

    /// Work on a task started.
    async fn publish_task_started(
        &self,
        task_id: &TaskId,
        owner: &str,
        rate_id: Option<&str>,
    ) -> PublishResult;

    /// A task was completed.
    async fn publish_task_completed(&self, task_id: &TaskId, evidence: &str) -> PublishResult;

    /// A task was blocked.
    async fn publish_task_blocked(&self, task_id: &TaskId, reason: &str) -> PublishResult;

    /// A blocked task was released.
    async fn publish_task_unblocked(&self, task_id: &TaskId) -> PublishResult;
}

/// Error returned by event publishers.
#[derive(Debug, Clone, Error)]
#[error("event publication failed: {0}")]
pub struct PublishError(pub Arc<dyn std::error::Error + Send + Sync>);

impl PublishError {
    /// Wraps a transport error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
