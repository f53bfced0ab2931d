//! Live badge state of one goal.
//!
//! The tracker is the in-memory source of truth while a goal is open: badge
//! edits apply immediately and the goal's aggregate saved amount is pushed to
//! the store in the background. Pushes from one tracker reach the store in
//! the order they were made. A failed push is logged and the in-memory state
//! is kept as is.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use super::schedule_generator::{
    aggregate_saved, classify_status, generate_schedule, refresh_statuses, summarize,
};
use super::schedule_model::{GoalSchedule, SavingBadge, ScheduleSummary};
use super::schedule_reconcile::regenerate_schedule;
use crate::errors::{Result, ScheduleError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::goals::{Goal, GoalRepositoryTrait, GoalStatus};
use crate::settings::Settings;
use crate::utils::decimal_utils::clamp_amount;
use crate::utils::time_utils::{date_from_utc, parse_timezone};

/// A store write queued by a tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SyncCommand {
    SavedAmount(Decimal),
    Status(GoalStatus),
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncCommand::SavedAmount(amount) => write!(f, "saved amount {}", amount),
            SyncCommand::Status(status) => write!(f, "status {}", status),
        }
    }
}

/// Applies queued writes one at a time until the tracker goes away.
async fn run_sync_worker(
    store: Arc<dyn GoalRepositoryTrait>,
    goal_id: String,
    mut commands: mpsc::UnboundedReceiver<SyncCommand>,
) {
    while let Some(command) = commands.recv().await {
        let result = match command {
            SyncCommand::SavedAmount(amount) => {
                store.update_current_amount(goal_id.clone(), amount).await
            }
            SyncCommand::Status(status) => store.update_goal_status(goal_id.clone(), status).await,
        };
        if let Err(e) = result {
            warn!("Failed to sync {} of goal {}: {}", command, goal_id, e);
        }
    }
    debug!("Sync worker of goal {} stopped", goal_id);
}

pub struct GoalTracker {
    goal: Goal,
    badges: Vec<SavingBadge>,
    settings: Settings,
    timezone: Tz,
    store: Arc<dyn GoalRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    completion_signaled: bool,
    // Started on the first write
    sync_tx: Option<mpsc::UnboundedSender<SyncCommand>>,
}

impl GoalTracker {
    /// Builds the schedule of `goal` as of `today`.
    ///
    /// A goal that is already completed will not signal completion again.
    pub fn new(
        goal: Goal,
        settings: Settings,
        today: NaiveDate,
        store: Arc<dyn GoalRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Result<Self> {
        let badges = generate_schedule(&goal, today, &settings)?;
        let timezone = parse_timezone(&settings.timezone).unwrap_or_else(|e| {
            warn!("{}; tracker falls back to UTC", e);
            chrono_tz::UTC
        });
        debug!("Tracking goal {} with {} badges", goal.id, badges.len());
        Ok(Self {
            completion_signaled: goal.is_completed(),
            goal,
            badges,
            settings,
            timezone,
            store,
            event_sink,
            sync_tx: None,
        })
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn badges(&self) -> &[SavingBadge] {
        &self.badges
    }

    pub fn summary(&self) -> ScheduleSummary {
        summarize(&self.goal, &self.badges)
    }

    pub fn snapshot(&self) -> GoalSchedule {
        GoalSchedule {
            goal: self.goal.clone(),
            badges: self.badges.clone(),
            summary: self.summary(),
        }
    }

    /// An empty schedule means the goal has no usable window.
    pub fn has_schedule(&self) -> bool {
        !self.badges.is_empty()
    }

    pub fn completion_signaled(&self) -> bool {
        self.completion_signaled
    }

    /// Checks a badge off, or un-checks it.
    ///
    /// Checking records the badge's full amount as its progress; un-checking
    /// clears it.
    pub fn toggle_badge(&mut self, badge_id: &str, now: DateTime<Utc>) -> Result<&SavingBadge> {
        let index = self.position(badge_id)?;
        let today = self.local_date(now);
        let grace = self.settings.late_grace_days;

        let badge = &mut self.badges[index];
        badge.completed = !badge.completed;
        badge.progress_amount = if badge.completed {
            badge.amount
        } else {
            Decimal::ZERO
        };
        badge.last_updated_at = Some(now);
        badge.status = classify_status(badge.date, badge.completed, today, grace);
        debug!(
            "Badge {} of goal {} toggled to {}",
            badge_id, self.goal.id, badge.completed
        );

        self.sync_saved_amount();
        Ok(&self.badges[index])
    }

    /// Records how much was saved toward one badge.
    ///
    /// The amount is clamped to `[0, badge.amount]`. Falling short of the full
    /// amount un-completes the badge; reaching it does not complete it, that
    /// takes [`GoalTracker::complete_badge`].
    pub fn set_badge_progress(
        &mut self,
        badge_id: &str,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<&SavingBadge> {
        let index = self.position(badge_id)?;
        let today = self.local_date(now);
        let grace = self.settings.late_grace_days;

        let badge = &mut self.badges[index];
        badge.progress_amount = clamp_amount(amount, Decimal::ZERO, badge.amount);
        if badge.progress_amount < badge.amount {
            badge.completed = false;
        }
        badge.last_updated_at = Some(now);
        badge.status = classify_status(badge.date, badge.completed, today, grace);

        self.sync_saved_amount();
        Ok(&self.badges[index])
    }

    /// Marks a fully funded badge as completed.
    pub fn complete_badge(&mut self, badge_id: &str, now: DateTime<Utc>) -> Result<&SavingBadge> {
        let index = self.position(badge_id)?;
        let today = self.local_date(now);
        let grace = self.settings.late_grace_days;

        let badge = &mut self.badges[index];
        if badge.progress_amount < badge.amount {
            return Err(ScheduleError::ProgressIncomplete {
                badge_id: badge.id.clone(),
                progress: badge.progress_amount,
                amount: badge.amount,
            }
            .into());
        }
        badge.completed = true;
        badge.last_updated_at = Some(now);
        badge.status = classify_status(badge.date, true, today, grace);

        self.sync_saved_amount();
        Ok(&self.badges[index])
    }

    /// Replaces the goal after an edit and rebuilds the schedule, keeping the
    /// progress of every badge whose due date survives.
    pub fn apply_goal_edit(&mut self, updated_goal: Goal, today: NaiveDate) -> Result<()> {
        updated_goal.validate()?;
        let badges = regenerate_schedule(&self.badges, &updated_goal, today, &self.settings)?;
        debug!(
            "Goal {} rescheduled from {} to {} badges",
            updated_goal.id,
            self.badges.len(),
            badges.len()
        );
        self.goal = updated_goal;
        self.badges = badges;
        self.sync_saved_amount();
        Ok(())
    }

    /// Re-derives badge statuses, e.g. after midnight.
    pub fn refresh_statuses(&mut self, today: NaiveDate) {
        refresh_statuses(&mut self.badges, today, &self.settings);
    }

    /// Signals goal completion once every badge is done and the target is
    /// reached. Returns `true` only on the call that fired the signal.
    pub fn check_completion(&mut self) -> bool {
        if self.completion_signaled || self.badges.is_empty() {
            return false;
        }
        let all_completed = self.badges.iter().all(|b| b.completed);
        if !all_completed || self.goal.progress_percent() < 100 {
            return false;
        }

        self.completion_signaled = true;
        self.goal.status = GoalStatus::Completed;
        info!("Goal {} completed", self.goal.id);
        self.event_sink
            .emit(DomainEvent::goal_completed(self.goal.id.clone()));
        self.queue_sync(SyncCommand::Status(GoalStatus::Completed));
        true
    }

    fn position(&self, badge_id: &str) -> Result<usize> {
        self.badges
            .iter()
            .position(|b| b.id == badge_id)
            .ok_or_else(|| ScheduleError::BadgeNotFound(badge_id.to_string()).into())
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        date_from_utc(now, self.timezone)
    }

    /// Recomputes the aggregate saved amount and queues it for the store.
    ///
    /// The first money saved moves a `not_started` goal to `in_progress`.
    fn sync_saved_amount(&mut self) {
        let saved = aggregate_saved(&self.badges, self.goal.target_amount);
        let promote = self.goal.status == GoalStatus::NotStarted && saved > Decimal::ZERO;
        if saved == self.goal.current_amount && !promote {
            return;
        }

        if saved != self.goal.current_amount {
            self.goal.set_current_amount(saved);
            self.event_sink.emit(DomainEvent::goal_progress_changed(
                self.goal.id.clone(),
                self.goal.current_amount,
            ));
            self.queue_sync(SyncCommand::SavedAmount(self.goal.current_amount));
        }
        if promote {
            debug!("Goal {} started saving", self.goal.id);
            self.goal.status = GoalStatus::InProgress;
            self.queue_sync(SyncCommand::Status(GoalStatus::InProgress));
        }
    }

    /// Hands a write to the tracker's sync worker, starting it on first use.
    /// Without a Tokio runtime the write is dropped with a warning.
    fn queue_sync(&mut self, command: SyncCommand) {
        if self.sync_tx.is_none() {
            let handle = match tokio::runtime::Handle::try_current() {
                Ok(handle) => handle,
                Err(_) => {
                    warn!(
                        "No async runtime available, {} of goal {} was not synced",
                        command, self.goal.id
                    );
                    return;
                }
            };
            let (tx, rx) = mpsc::unbounded_channel();
            handle.spawn(run_sync_worker(
                Arc::clone(&self.store),
                self.goal.id.clone(),
                rx,
            ));
            self.sync_tx = Some(tx);
        }

        let Some(tx) = self.sync_tx.as_ref() else {
            return;
        };
        if let Err(e) = tx.send(command) {
            warn!(
                "Sync worker of goal {} is gone, {} was not synced",
                self.goal.id, e.0
            );
            self.sync_tx = None;
        }
    }
}
