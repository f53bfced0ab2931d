//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about goal data changes. Runtime adapters
/// translate them into platform-specific actions (list refresh,
/// notifications, celebration screens).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Goals were created, updated, or deleted.
    GoalsChanged { goal_ids: Vec<String> },

    /// The aggregate saved amount of a goal changed through its badges.
    GoalProgressChanged {
        goal_id: String,
        current_amount: Decimal,
    },

    /// Every badge of a goal is done and the target is reached.
    GoalCompleted { goal_id: String },

    /// Budget data changed; `month_key` is set when one month is affected.
    BudgetChanged { month_key: Option<String> },
}

impl DomainEvent {
    /// Creates a GoalsChanged event.
    pub fn goals_changed(goal_ids: Vec<String>) -> Self {
        Self::GoalsChanged { goal_ids }
    }

    /// Creates a GoalProgressChanged event.
    pub fn goal_progress_changed(goal_id: impl Into<String>, current_amount: Decimal) -> Self {
        Self::GoalProgressChanged {
            goal_id: goal_id.into(),
            current_amount,
        }
    }

    /// Creates a GoalCompleted event.
    pub fn goal_completed(goal_id: impl Into<String>) -> Self {
        Self::GoalCompleted {
            goal_id: goal_id.into(),
        }
    }

    pub fn budget_changed(month_key: Option<String>) -> Self {
        Self::BudgetChanged { month_key }
    }
}
