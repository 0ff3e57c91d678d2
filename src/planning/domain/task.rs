//! Planned task and priority types.

use super::{ParsePriorityError, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative importance of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal scheduling.
    #[default]
    Medium,
    /// Should be picked up first.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Structural definition of one unit of work in a plan.
///
/// Tasks carry intent only. Execution progress lives in
/// [`super::TaskResult`] so that regenerating a plan never discards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    estimate: String,
    #[serde(default)]
    depends_on: Vec<TaskId>,
    #[serde(default)]
    feature_id: Option<String>,
}

impl Task {
    /// Creates a task with the given identifier and title.
    ///
    /// No validation is performed; see [`Task::is_well_formed`].
    #[must_use]
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            estimate: String::new(),
            depends_on: Vec::new(),
            feature_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the estimate, an opaque duration string such as `"2h"`.
    #[must_use]
    pub fn with_estimate(mut self, estimate: impl Into<String>) -> Self {
        self.estimate = estimate.into();
        self
    }

    /// Sets the dependencies, preserving their order.
    #[must_use]
    pub fn with_depends_on<I, T>(mut self, depends_on: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.depends_on = depends_on.into_iter().map(Into::into).collect();
        self
    }

    /// Links the task to an external feature.
    #[must_use]
    pub fn with_feature_id(mut self, feature_id: impl Into<String>) -> Self {
        self.feature_id = Some(feature_id.into());
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the estimate.
    #[must_use]
    pub fn estimate(&self) -> &str {
        &self.estimate
    }

    /// Returns the identifiers this task depends on, in declared order.
    #[must_use]
    pub fn depends_on(&self) -> &[TaskId] {
        &self.depends_on
    }

    /// Returns the linked feature identifier, if any.
    #[must_use]
    pub fn feature_id(&self) -> Option<&str> {
        self.feature_id.as_deref()
    }

    /// Returns `false` for generator output missing an identifier or title.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_blank() && !self.title.trim().is_empty()
    }
}
