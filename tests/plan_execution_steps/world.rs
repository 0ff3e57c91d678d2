//! Shared world state for plan execution BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use planwright::planning::{
    adapters::{
        NoopEventPublisher,
        memory::{InMemoryPlanRepository, InMemoryStateRepository},
    },
    domain::TaskId,
    services::{CoordinatorError, PlanningCoordinator},
};
use rstest::fixture;

/// Coordinator type used by the BDD world.
pub type TestCoordinator = PlanningCoordinator<
    InMemoryPlanRepository,
    InMemoryStateRepository,
    NoopEventPublisher,
    DefaultClock,
>;

/// Scenario world for plan execution behaviour tests.
pub struct PlanExecutionWorld {
    pub coordinator: TestCoordinator,
    pub last_unlocked: Option<Vec<TaskId>>,
    pub last_error: Option<CoordinatorError>,
}

impl PlanExecutionWorld {
    /// Creates a world with empty repositories.
    #[must_use]
    pub fn new() -> Self {
        let coordinator = PlanningCoordinator::new(
            Arc::new(InMemoryPlanRepository::new()),
            Arc::new(InMemoryStateRepository::new()),
            Arc::new(NoopEventPublisher),
            Arc::new(DefaultClock),
        );

        Self {
            coordinator,
            last_unlocked: None,
            last_error: None,
        }
    }

    /// Records the outcome of a mutation, keeping only the error.
    pub fn record<T>(&mut self, result: Result<T, CoordinatorError>) {
        self.last_error = result.err();
    }
}

impl Default for PlanExecutionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PlanExecutionWorld {
    PlanExecutionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
