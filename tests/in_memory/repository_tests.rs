//! Storage round trips for the in-memory repositories.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use mockable::DefaultClock;
use planwright::planning::{
    adapters::memory::{InMemoryPlanRepository, InMemoryStateRepository},
    domain::{
        ApprovalStatus, ExecutionState, PersistedExecutionStateData, PersistedPlanData, Plan,
        PlanId, ProjectId, Task, TaskId, TaskStatus,
    },
    ports::{PlanRepository, StateRepository},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_repositories_load_nothing() -> eyre::Result<()> {
    let plans = InMemoryPlanRepository::new();
    let states = InMemoryStateRepository::new();

    eyre::ensure!(plans.load().await?.is_none());
    eyre::ensure!(states.load().await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plan_save_replaces_the_stored_plan() -> eyre::Result<()> {
    let clock = DefaultClock;
    let plans = InMemoryPlanRepository::new();
    let first = Plan::new("spec-1", vec![Task::new("A", "First")], &clock);
    let second = Plan::new("spec-2", vec![Task::new("B", "Second")], &clock);

    plans.save(&first).await?;
    plans.save(&second).await?;

    let loaded = plans
        .load()
        .await?
        .ok_or_else(|| eyre::eyre!("plan should be stored"))?;
    eyre::ensure!(loaded == second);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persisted_aggregates_are_returned_unchanged() -> eyre::Result<()> {
    let timestamp = Utc
        .with_ymd_and_hms(2025, 11, 3, 14, 30, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("valid timestamp"))?;
    let plan = Plan::from_persisted(PersistedPlanData {
        id: PlanId::new("plan-42"),
        spec_id: "spec-42".to_owned(),
        tasks: vec![Task::new("A", "Only task")],
        approval_status: ApprovalStatus::Approved,
        approved_by: Some("lead".to_owned()),
        created_at: timestamp,
        updated_at: timestamp,
    });
    let mut clock_free_state = ExecutionState::from_persisted(PersistedExecutionStateData {
        project_id: ProjectId::new("apollo"),
        task_states: HashMap::new(),
        updated_at: timestamp,
    });
    clock_free_state.set_status(&TaskId::new("A"), TaskStatus::Done, &DefaultClock);

    let plans = InMemoryPlanRepository::with_plan(plan.clone());
    let states = InMemoryStateRepository::with_state(clock_free_state.clone());

    eyre::ensure!(plans.load().await? == Some(plan));
    eyre::ensure!(states.load().await? == Some(clock_free_state));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cloned_repositories_share_storage() -> eyre::Result<()> {
    let states = InMemoryStateRepository::new();
    let view = states.clone();

    states
        .save(&ExecutionState::new(ProjectId::default(), &DefaultClock))
        .await?;

    let loaded = view
        .load()
        .await?
        .ok_or_else(|| eyre::eyre!("state should be visible through the clone"))?;
    eyre::ensure!(loaded.project_id().as_str() == "default");
    Ok(())
}
