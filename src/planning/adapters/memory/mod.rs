//! In-memory adapters for planning ports.

mod plan;
mod publisher;
mod state;

pub use plan::InMemoryPlanRepository;
pub use publisher::{PlanningEvent, RecordingEventPublisher};
pub use state::InMemoryStateRepository;
