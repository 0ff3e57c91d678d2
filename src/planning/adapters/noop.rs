//! Publisher that discards every event.

use async_trait::async_trait;

use crate::planning::{
    domain::{PlanId, TaskId},
    ports::{EventPublisher, PublishResult},
};

/// Event publisher for hosts without a notification channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish_plan_approved(&self, _plan_id: &PlanId, _approver: &str) -> PublishResult {
        Ok(())
    }

    async fn publish_task_started(
        &self,
        _task_id: &TaskId,
        _owner: &str,
        _rate_id: Option<&str>,
    ) -> PublishResult {
        Ok(())
    }

    async fn publish_task_completed(&self, _task_id: &TaskId, _evidence: &str) -> PublishResult {
        Ok(())
    }

    async fn publish_task_blocked(&self, _task_id: &TaskId, _reason: &str) -> PublishResult {
        Ok(())
    }

    async fn publish_task_unblocked(&self, _task_id: &TaskId) -> PublishResult {
        Ok(())
    }
}
