//! Then steps for plan execution BDD scenarios.

use super::world::{PlanExecutionWorld, run_async};
use planwright::planning::{
    domain::{ApprovalStatus, TaskId, TaskStatus},
    services::CoordinatorError,
};
use rstest_bdd_macros::then;

#[then(r#"the unlocked tasks are "{expected}""#)]
fn unlocked_tasks_are(world: &PlanExecutionWorld, expected: String) -> Result<(), eyre::Report> {
    let expected: Vec<TaskId> = expected.split(',').map(str::trim).map(TaskId::from).collect();
    let unlocked = world
        .last_unlocked
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no completion recorded in scenario world"))?;
    eyre::ensure!(
        *unlocked == expected,
        "expected unlocked {expected:?}, found {unlocked:?}"
    );
    Ok(())
}

#[then(r#"task "{task_id}" is "{status}""#)]
fn task_has_status(
    world: &PlanExecutionWorld,
    task_id: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let state = run_async(world.coordinator.get_state())?
        .ok_or_else(|| eyre::eyre!("missing execution state"))?;
    let actual = state.status_of(&TaskId::new(task_id));
    eyre::ensure!(actual == expected, "expected {expected}, found {actual}");
    Ok(())
}

#[then("the project is {percent} percent complete")]
fn project_progress(world: &PlanExecutionWorld, percent: usize) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.coordinator.get_project_snapshot())?;
    eyre::ensure!(
        snapshot.progress_percent == percent,
        "expected {percent}% progress, found {}%",
        snapshot.progress_percent
    );
    Ok(())
}

#[then(r#"the operation fails because "{task_id}" waits on "{dependency_id}""#)]
fn fails_on_dependency(
    world: &PlanExecutionWorld,
    task_id: String,
    dependency_id: String,
) -> Result<(), eyre::Report> {
    match world.last_error.as_ref() {
        Some(CoordinatorError::DependenciesNotMet(err))
            if err.task_id.as_str() == task_id && err.dependency_id.as_str() == dependency_id =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!("expected unmet dependency error, got {other:?}")),
    }
}

#[then("the operation fails because the plan is not approved")]
fn fails_on_approval(world: &PlanExecutionWorld) -> Result<(), eyre::Report> {
    match world.last_error.as_ref() {
        Some(CoordinatorError::PlanNotApproved) => Ok(()),
        other => Err(eyre::eyre!("expected plan-not-approved error, got {other:?}")),
    }
}

#[then("the operation fails with an invalid transition")]
fn fails_on_transition(world: &PlanExecutionWorld) -> Result<(), eyre::Report> {
    match world.last_error.as_ref() {
        Some(err) if err.is_invalid_transition() => Ok(()),
        other => Err(eyre::eyre!("expected invalid transition error, got {other:?}")),
    }
}

#[then("the plan awaits approval")]
fn plan_awaits_approval(world: &PlanExecutionWorld) -> Result<(), eyre::Report> {
    let plan = run_async(world.coordinator.get_plan())?
        .ok_or_else(|| eyre::eyre!("missing plan"))?;
    eyre::ensure!(
        plan.approval_status() == ApprovalStatus::Pending,
        "expected pending approval, found {}",
        plan.approval_status()
    );
    Ok(())
}
