//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use planwright::planning::{
    adapters::memory::{InMemoryPlanRepository, InMemoryStateRepository, RecordingEventPublisher},
    domain::{Priority, Task},
    services::PlanningCoordinator,
};
use rstest::fixture;

/// Coordinator wired to in-memory adapters.
pub type TestCoordinator = PlanningCoordinator<
    InMemoryPlanRepository,
    InMemoryStateRepository,
    RecordingEventPublisher,
    DefaultClock,
>;

/// A coordinator plus handles on its collaborators.
pub struct Harness {
    pub coordinator: Arc<TestCoordinator>,
    pub states: Arc<InMemoryStateRepository>,
    pub publisher: Arc<RecordingEventPublisher>,
}

/// Provides a coordinator over empty repositories.
#[fixture]
pub fn harness() -> Harness {
    let states = Arc::new(InMemoryStateRepository::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let coordinator = PlanningCoordinator::new(
        Arc::new(InMemoryPlanRepository::new()),
        Arc::clone(&states),
        Arc::clone(&publisher),
        Arc::new(DefaultClock),
    );
    Harness {
        coordinator: Arc::new(coordinator),
        states,
        publisher,
    }
}

/// Generator output for a small web release.
#[fixture]
pub fn release_tasks() -> Vec<Task> {
    vec![
        Task::new("api", "Expose billing API")
            .with_priority(Priority::High)
            .with_estimate("2d")
            .with_feature_id("billing"),
        Task::new("ui", "Billing settings page")
            .with_depends_on(["api"])
            .with_feature_id("billing"),
        Task::new("docs", "Publish billing guide").with_depends_on(["api", "ui"]),
        Task::new("audit", "Security review").with_priority(Priority::Low),
    ]
}
