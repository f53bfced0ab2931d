//! Badge scheduler: periodic savings obligations derived from a goal.

mod goal_tracker;
mod schedule_generator;
mod schedule_model;
mod schedule_reconcile;

#[cfg(test)]
mod goal_tracker_tests;

pub use goal_tracker::GoalTracker;
pub use schedule_generator::{
    aggregate_saved, classify_status, due_dates, generate_schedule, period_count,
    refresh_statuses, required_per_period, summarize,
};
pub use schedule_model::{BadgeStatus, GoalSchedule, SavingBadge, ScheduleSummary};
pub use schedule_reconcile::{merge_progress, regenerate_schedule};
