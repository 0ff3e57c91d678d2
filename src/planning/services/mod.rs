//! Application services for plan reconciliation and execution coordination.

mod config;
mod coordinator;
mod reconciler;

pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorError, CoordinatorResult, PlanningCoordinator};
pub use reconciler::{PlanReconciler, ReconcileOptions};
