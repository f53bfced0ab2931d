//! Badge schedule models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::goals::{Goal, SaveFrequency};

/// Timeliness of a badge relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BadgeStatus {
    Early,
    OnTime,
    Late,
    Missed,
}

/// One periodic savings obligation of a goal. Badges are derived from the
/// goal on every load and never stored on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingBadge {
    /// 1-based position in the schedule
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub completed: bool,
    /// Always within `[0, amount]`
    pub progress_amount: Decimal,
    pub status: BadgeStatus,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl SavingBadge {
    /// Position in the schedule, parsed from the id.
    pub fn sequence(&self) -> u32 {
        self.id.parse().unwrap_or(0)
    }

    /// "Week 3", "Month 12", ...
    pub fn period_label(&self, frequency: SaveFrequency) -> String {
        frequency.period_label(self.sequence())
    }

    pub fn remaining(&self) -> Decimal {
        (self.amount - self.progress_amount).max(Decimal::ZERO)
    }

    /// What this badge contributes to the goal's saved amount.
    pub fn contribution(&self) -> Decimal {
        if self.completed {
            self.amount
        } else {
            self.progress_amount
        }
    }
}

/// Figures shown next to the badge grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_periods: usize,
    pub completed_periods: usize,
    pub remaining_periods: usize,
    /// Amount each badge was planned at
    pub planned_per_period: Option<Decimal>,
    pub remaining_to_save: Decimal,
    /// Remaining amount spread over the open badges
    pub suggested_per_period: Option<Decimal>,
    pub progress_percent: u32,
}

/// A goal together with its derived schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSchedule {
    pub goal: Goal,
    pub badges: Vec<SavingBadge>,
    pub summary: ScheduleSummary,
}
