//! Given steps for plan execution BDD scenarios.

use super::world::{PlanExecutionWorld, run_async};
use eyre::WrapErr;
use planwright::planning::{domain::Task, services::ReconcileOptions};
use rstest_bdd_macros::given;

#[given(r#"a plan where "{second}" depends on "{first}" and "{third}" depends on "{first_again}" and "{second_again}""#)]
fn chained_plan(
    world: &mut PlanExecutionWorld,
    second: String,
    first: String,
    third: String,
    first_again: String,
    second_again: String,
) -> Result<(), eyre::Report> {
    let tasks = vec![
        Task::new(first.as_str(), "Design schema"),
        Task::new(second, "Write migrations").with_depends_on([first]),
        Task::new(third, "Wire repository").with_depends_on([first_again, second_again]),
    ];
    run_async(
        world
            .coordinator
            .reconcile_plan(tasks, ReconcileOptions::new().with_spec_id("spec-1")),
    )
    .wrap_err("create plan for scenario")?;
    Ok(())
}

#[given(r#"the plan is approved by "{approver}""#)]
fn plan_is_approved(world: &mut PlanExecutionWorld, approver: String) -> Result<(), eyre::Report> {
    run_async(world.coordinator.approve_plan(&approver)).wrap_err("approve plan for scenario")?;
    Ok(())
}
