//! When steps for plan execution BDD scenarios.

use super::world::{PlanExecutionWorld, run_async};
use planwright::planning::{
    domain::{Task, TaskId},
    services::ReconcileOptions,
};
use rstest_bdd_macros::when;

#[when(r#""{owner}" starts task "{task_id}""#)]
fn start_task(world: &mut PlanExecutionWorld, owner: String, task_id: String) {
    let result = run_async(
        world
            .coordinator
            .start_task(&TaskId::new(task_id), &owner, None),
    );
    world.record(result);
}

#[when(r#"task "{task_id}" is completed with evidence "{evidence}""#)]
fn complete_task(world: &mut PlanExecutionWorld, task_id: String, evidence: String) {
    let result = run_async(
        world
            .coordinator
            .complete_task(&TaskId::new(task_id), &evidence),
    );
    world.last_unlocked = result.as_ref().ok().cloned();
    world.record(result);
}

#[when(r#"task "{task_id}" is blocked because "{reason}""#)]
fn block_task(world: &mut PlanExecutionWorld, task_id: String, reason: String) {
    let result = run_async(world.coordinator.block_task(&TaskId::new(task_id), &reason));
    world.record(result);
}

#[when(r#"the plan is regenerated with task "{task_id}" titled "{title}""#)]
fn regenerate_plan(world: &mut PlanExecutionWorld, task_id: String, title: String) {
    let result = run_async(
        world
            .coordinator
            .reconcile_plan(vec![Task::new(task_id, title)], ReconcileOptions::new()),
    );
    world.record(result);
}
