//! Dependency graph validation for plans.

use super::{PlanningDomainError, Task, TaskId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

type Graph<'a> = HashMap<&'a TaskId, &'a [TaskId]>;

/// Checks that task identifiers are unique and `depends_on` edges form a
/// directed acyclic graph.
///
/// Tasks are visited in slice order using three-colour depth-first search,
/// so the whole check is `O(V + E)`. Dependencies on identifiers outside the
/// slice are not edges of the graph and are ignored here.
///
/// # Errors
///
/// Returns [`PlanningDomainError::DuplicateTaskId`] for the first repeated
/// identifier, or [`PlanningDomainError::DependencyCycle`] naming the task
/// that closes the first cycle found. A task depending on itself is a cycle.
pub fn validate_dag(tasks: &[Task]) -> Result<(), PlanningDomainError> {
    let mut graph: Graph<'_> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if graph.insert(task.id(), task.depends_on()).is_some() {
            return Err(PlanningDomainError::DuplicateTaskId(task.id().clone()));
        }
    }

    let mut marks = HashMap::with_capacity(tasks.len());
    for task in tasks {
        visit(task.id(), &graph, &mut marks)?;
    }
    Ok(())
}

/// Depth-first search from `root` on an explicit stack of
/// `(node, dependencies, next index)` frames.
fn visit<'a>(
    root: &'a TaskId,
    graph: &Graph<'a>,
    marks: &mut HashMap<&'a TaskId, Mark>,
) -> Result<(), PlanningDomainError> {
    if marks.get(root).copied().unwrap_or(Mark::White) != Mark::White {
        return Ok(());
    }
    let Some(&root_dependencies) = graph.get(root) else {
        return Ok(());
    };

    marks.insert(root, Mark::Gray);
    let mut stack: Vec<(&'a TaskId, &'a [TaskId], usize)> =
        vec![(root, root_dependencies, 0)];
    while let Some(frame) = stack.last_mut() {
        let (node, dependencies, next) = *frame;
        let Some(dependency) = dependencies.get(next) else {
            marks.insert(node, Mark::Black);
            stack.pop();
            continue;
        };
        frame.2 = next + 1;

        match marks.get(dependency).copied().unwrap_or(Mark::White) {
            Mark::Black => {}
            Mark::Gray => {
                return Err(PlanningDomainError::DependencyCycle {
                    task_id: dependency.clone(),
                });
            }
            Mark::White => {
                if let Some(&children) = graph.get(dependency) {
                    marks.insert(dependency, Mark::Gray);
                    stack.push((dependency, children, 0));
                }
            }
        }
    }
    Ok(())
}
