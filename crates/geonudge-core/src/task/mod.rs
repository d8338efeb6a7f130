//! Task types for location-tagged reminders.
//!
//! A task is a free-form reminder ("buy milk") tagged with a category and
//! a priority at creation. Status follows a strict two-state model:
//!
//!   PENDING ─────────> TRIGGERED
//!
//! Valid transitions:
//! - PENDING → TRIGGERED (fired by the trigger engine, at most once)
//!
//! TRIGGERED is terminal. There is no dismissal and no re-arming;
//! `triggered_at` is set exactly once, together with the transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Place category a task is matched against.
///
/// Assigned once by the classifier when the task is created and frozen
/// onto the record; the trigger engine only ever reads it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Grocery stores and supermarkets
    Grocery,
    /// Pharmacies and drug stores
    Pharmacy,
    /// Clothing and apparel stores
    Clothing,
    /// Fallback when no keyword rule matches
    General,
}

impl Category {
    /// All known categories, in classifier rule order.
    pub const ALL: [Category; 4] = [
        Category::Clothing,
        Category::Grocery,
        Category::Pharmacy,
        Category::General,
    ];

    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Grocery => "grocery",
            Category::Pharmacy => "pharmacy",
            Category::Clothing => "clothing",
            Category::General => "general",
        }
    }

    /// Parse from the stable string form.
    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "grocery" => Some(Category::Grocery),
            "pharmacy" => Some(Category::Pharmacy),
            "clothing" => Some(Category::Clothing),
            "general" => Some(Category::General),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority, assigned at creation, immutable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: lower value sorts first (`high` < `medium` < `low`).
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Stable string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse from the stable string form.
    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task status enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for a proximity hit
    Pending,
    /// Fired once; terminal
    Triggered,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(to, TaskStatus::Triggered),
            TaskStatus::Triggered => false, // Terminal state
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A location-tagged reminder.
///
/// Invariant: `triggered_at` is non-null iff `status == Triggered`.
/// The store owns all status transitions; the engine requests them
/// through [`crate::storage::TaskDb`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Free-form reminder text, immutable after creation
    pub text: String,
    /// Category assigned by the classifier at creation
    pub category: Category,
    /// Priority assigned at creation
    pub priority: Priority,
    /// Current status
    pub status: TaskStatus,
    /// Set exactly once, when status transitions to Triggered
    pub triggered_at: Option<DateTime<Utc>>,
    /// Per-task re-check suppression window, server-assigned
    pub cooldown_minutes: i64,
    /// Creation timestamp, used for tie-break ordering
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(
        text: impl Into<String>,
        category: Category,
        priority: Priority,
        cooldown_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        Task {
            id: format!("task-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            text: text.into(),
            category,
            priority,
            status: TaskStatus::Pending,
            triggered_at: None,
            cooldown_minutes,
            created_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::Triggered));
        assert!(!TaskStatus::Triggered.can_transition_to(&TaskStatus::Pending));
        assert!(!TaskStatus::Triggered.can_transition_to(&TaskStatus::Triggered));
        assert!(!TaskStatus::Pending.can_transition_to(&TaskStatus::Pending));
    }

    #[test]
    fn priority_rank_ordering() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn category_string_forms_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("bakery"), None);
    }

    #[test]
    fn task_serialization() {
        let task = Task::new("buy milk", Category::Grocery, Priority::High, 60);
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""category":"grocery""#));
        assert!(json.contains(r#""priority":"high""#));
        assert!(json.contains(r#""status":"pending""#));
        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, task.id);
        assert!(decoded.triggered_at.is_none());
    }
}
