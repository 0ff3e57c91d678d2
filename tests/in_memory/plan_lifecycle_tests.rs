//! In-memory integration tests for the plan lifecycle.

use std::sync::Arc;

use super::helpers::{Harness, harness, release_tasks};
use planwright::planning::{
    adapters::memory::PlanningEvent,
    domain::{ApprovalStatus, Task, TaskId, TaskStatus},
    ports::StateRepository,
    services::{CoordinatorError, ReconcileOptions},
};
use rstest::rstest;

fn ids(values: &[&str]) -> Vec<TaskId> {
    values.iter().copied().map(TaskId::from).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn release_runs_to_completion(
    harness: Harness,
    release_tasks: Vec<Task>,
) -> eyre::Result<()> {
    let coordinator = &harness.coordinator;
    coordinator
        .reconcile_plan(release_tasks, ReconcileOptions::new().with_spec_id("billing-v1"))
        .await?;
    coordinator.approve_plan("release-manager").await?;

    let ready: Vec<TaskId> = coordinator
        .get_ready_tasks()
        .await?
        .into_iter()
        .map(|summary| summary.id)
        .collect();
    eyre::ensure!(ready == ids(&["api", "audit"]));

    coordinator.start_task(&TaskId::new("api"), "ada", None).await?;
    eyre::ensure!(
        coordinator.complete_task(&TaskId::new("api"), "PR #120").await?
            == ids(&["ui", "audit"])
    );
    coordinator.start_task(&TaskId::new("ui"), "grace", None).await?;
    eyre::ensure!(
        coordinator.complete_task(&TaskId::new("ui"), "PR #121").await?
            == ids(&["docs", "audit"])
    );
    coordinator.verify_task(&TaskId::new("api"), "qa").await?;

    let snapshot = coordinator.get_project_snapshot().await?;
    eyre::ensure!(snapshot.approval_status == ApprovalStatus::Approved);
    eyre::ensure!(snapshot.completed_tasks == 2);
    eyre::ensure!(snapshot.progress_percent == 50);
    eyre::ensure!(snapshot.verified == ids(&["api"]));
    eyre::ensure!(snapshot.completed == ids(&["ui"]));
    eyre::ensure!(snapshot.unlocked == ids(&["docs", "audit"]));

    let started = harness
        .publisher
        .events()?
        .into_iter()
        .filter(|event| matches!(event, PlanningEvent::TaskStarted { .. }))
        .count();
    eyre::ensure!(started == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn regeneration_orphans_dropped_tasks_and_keeps_their_progress(
    harness: Harness,
    release_tasks: Vec<Task>,
) -> eyre::Result<()> {
    let coordinator = &harness.coordinator;
    let original = coordinator
        .reconcile_plan(release_tasks, ReconcileOptions::new().with_spec_id("billing-v1"))
        .await?;
    coordinator.approve_plan("release-manager").await?;
    coordinator.start_task(&TaskId::new("audit"), "mallory", None).await?;

    let regenerated = coordinator
        .reconcile_plan(
            vec![
                Task::new("api", "Expose billing API v2"),
                Task::new("", "Untitled generator noise"),
                Task::new("sdk", "Ship client SDK").with_depends_on(["api"]),
            ],
            ReconcileOptions::new().with_spec_id("billing-v2"),
        )
        .await?;

    eyre::ensure!(regenerated.id() == original.id());
    eyre::ensure!(regenerated.spec_id() == "billing-v2");
    eyre::ensure!(regenerated.created_at() == original.created_at());
    eyre::ensure!(regenerated.approval_status() == ApprovalStatus::Pending);
    let order: Vec<&str> = regenerated
        .tasks()
        .iter()
        .map(|task| task.id().as_str())
        .collect();
    eyre::ensure!(order == ["api", "sdk", "ui", "docs", "audit"]);
    eyre::ensure!(
        regenerated
            .task(&TaskId::new("api"))
            .map(Task::title)
            == Some("Expose billing API v2")
    );

    let state = harness
        .states
        .load()
        .await?
        .ok_or_else(|| eyre::eyre!("state should survive regeneration"))?;
    eyre::ensure!(state.status_of(&TaskId::new("audit")) == TaskStatus::InProgress);
    eyre::ensure!(state.task(&TaskId::new("sdk")).is_none());

    coordinator.approve_plan("release-manager").await?;
    let state = harness
        .states
        .load()
        .await?
        .ok_or_else(|| eyre::eyre!("state should exist"))?;
    eyre::ensure!(state.task(&TaskId::new("sdk")).is_some());
    eyre::ensure!(state.status_of(&TaskId::new("audit")) == TaskStatus::InProgress);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_work_is_reported_until_released(
    harness: Harness,
    release_tasks: Vec<Task>,
) -> eyre::Result<()> {
    let coordinator = &harness.coordinator;
    coordinator
        .reconcile_plan(release_tasks, ReconcileOptions::new())
        .await?;
    coordinator.approve_plan("release-manager").await?;
    coordinator.start_task(&TaskId::new("api"), "ada", None).await?;
    coordinator
        .block_task(&TaskId::new("api"), "waiting on payment provider sandbox")
        .await?;

    let blocked = coordinator.get_blocked_tasks().await?;
    eyre::ensure!(blocked.len() == 1);
    eyre::ensure!(blocked.iter().all(|summary| summary.id.as_str() == "api"));

    let restart = coordinator.start_task(&TaskId::new("api"), "ada", None).await;
    eyre::ensure!(matches!(restart, Err(CoordinatorError::InvalidTransition(_))));

    coordinator.unblock_task(&TaskId::new("api")).await?;
    coordinator.start_task(&TaskId::new("api"), "ada", None).await?;
    eyre::ensure!(coordinator.get_blocked_tasks().await?.is_empty());
    eyre::ensure!(coordinator.get_in_progress_tasks().await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_starts_of_one_task_admit_a_single_owner(
    harness: Harness,
    release_tasks: Vec<Task>,
) -> eyre::Result<()> {
    let coordinator = &harness.coordinator;
    coordinator
        .reconcile_plan(release_tasks, ReconcileOptions::new())
        .await?;
    coordinator.approve_plan("release-manager").await?;

    let mut handles = Vec::new();
    for (task, owner) in [("api", "ada"), ("audit", "grace"), ("api", "grace")] {
        let coordinator = Arc::clone(coordinator);
        handles.push(tokio::spawn(async move {
            coordinator
                .start_task(&TaskId::new(task), owner, None)
                .await
        }));
    }

    let mut owners = Vec::new();
    let mut failures = 0_usize;
    for handle in handles {
        match handle.await? {
            Ok(result) => owners.extend(result.owner().map(str::to_owned)),
            Err(_) => failures += 1,
        }
    }

    eyre::ensure!(failures == 1);
    eyre::ensure!(owners.len() == 2);
    let in_progress = coordinator.get_in_progress_tasks().await?;
    eyre::ensure!(
        in_progress
            .iter()
            .map(|summary| summary.id.as_str())
            .collect::<Vec<_>>()
            == ["api", "audit"]
    );
    Ok(())
}
