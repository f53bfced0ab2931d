//! Turns a goal's window and cadence into a badge schedule.

use chrono::{Days, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use super::schedule_model::{BadgeStatus, SavingBadge, ScheduleSummary};
use crate::errors::{Result, ScheduleError};
use crate::goals::{Goal, SaveFrequency};
use crate::settings::Settings;
use crate::utils::decimal_utils::{clamp_amount, round_money};
use crate::utils::time_utils::add_months;

/// Due dates from `start` to `end` inclusive, one per period.
///
/// Every date is computed from `start` (not from the previous date) so a
/// monthly schedule starting on the 31st stays on month ends.
pub fn due_dates(frequency: SaveFrequency, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut step: u32 = 0;
    loop {
        let next = match frequency {
            SaveFrequency::Daily => start.checked_add_days(Days::new(u64::from(step))),
            SaveFrequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(step))),
            SaveFrequency::Monthly => add_months(start, step),
        };
        match next {
            Some(date) if date <= end => dates.push(date),
            _ => break,
        }
        step += 1;
    }
    dates
}

/// Number of badges a window produces.
pub fn period_count(frequency: SaveFrequency, start: NaiveDate, end: NaiveDate) -> usize {
    due_dates(frequency, start, end).len()
}

/// Derives a badge status from its due date and completion.
pub fn classify_status(
    due: NaiveDate,
    completed: bool,
    today: NaiveDate,
    late_grace_days: u32,
) -> BadgeStatus {
    if completed {
        return if due <= today {
            BadgeStatus::OnTime
        } else {
            BadgeStatus::Early
        };
    }
    if due < today {
        let overdue = (today - due).num_days();
        if late_grace_days > 0 && overdue <= i64::from(late_grace_days) {
            BadgeStatus::Late
        } else {
            BadgeStatus::Missed
        }
    } else if due == today {
        BadgeStatus::OnTime
    } else {
        BadgeStatus::Early
    }
}

/// Builds the schedule for a window, spreading `seed_saved` over the badges
/// in order: badge `i` holds `clamp(seed - amount*(i-1), 0, amount)`.
///
/// A seed that reaches the target fills every badge, even when the rounded
/// badge amounts add up to a little more than the target.
pub(crate) fn build_schedule(
    frequency: SaveFrequency,
    start: NaiveDate,
    end: NaiveDate,
    target_amount: Decimal,
    seed_saved: Decimal,
    today: NaiveDate,
    settings: &Settings,
) -> Result<Vec<SavingBadge>> {
    if target_amount <= Decimal::ZERO {
        return Err(ScheduleError::NonPositiveTarget(target_amount).into());
    }
    let dates = due_dates(frequency, start, end);
    if dates.is_empty() {
        return Ok(Vec::new());
    }

    let amount = round_money(target_amount / Decimal::from(dates.len()));
    let fully_saved = seed_saved >= target_amount;
    let badges = dates
        .into_iter()
        .enumerate()
        .map(|(index, date)| {
            let progress_amount = if fully_saved {
                amount
            } else {
                clamp_amount(
                    seed_saved - amount * Decimal::from(index),
                    Decimal::ZERO,
                    amount,
                )
            };
            let completed = progress_amount >= amount;
            SavingBadge {
                id: (index + 1).to_string(),
                date,
                amount,
                completed,
                progress_amount,
                status: classify_status(date, completed, today, settings.late_grace_days),
                last_updated_at: None,
            }
        })
        .collect();
    Ok(badges)
}

/// Generates the badge schedule of a goal, seeding per-badge progress from
/// the goal's saved amount.
///
/// A goal without a resolvable window, or whose end precedes its start,
/// yields an empty schedule. A non-positive target is rejected.
pub fn generate_schedule(
    goal: &Goal,
    today: NaiveDate,
    settings: &Settings,
) -> Result<Vec<SavingBadge>> {
    if goal.target_amount <= Decimal::ZERO {
        return Err(ScheduleError::NonPositiveTarget(goal.target_amount).into());
    }
    let Some((start, end)) = goal.schedule_window() else {
        debug!("Goal {} has no schedule window", goal.id);
        return Ok(Vec::new());
    };
    build_schedule(
        goal.save_frequency,
        start,
        end,
        goal.target_amount,
        goal.current_amount,
        today,
        settings,
    )
}

/// Re-derives every badge status for a new "today".
pub fn refresh_statuses(badges: &mut [SavingBadge], today: NaiveDate, settings: &Settings) {
    for badge in badges.iter_mut() {
        badge.status = classify_status(
            badge.date,
            badge.completed,
            today,
            settings.late_grace_days,
        );
    }
}

/// Sum of what each badge contributes, rounded to cents and clamped to
/// `[0, target]`.
pub fn aggregate_saved(badges: &[SavingBadge], target_amount: Decimal) -> Decimal {
    let total: Decimal = badges.iter().map(SavingBadge::contribution).sum();
    clamp_amount(round_money(total), Decimal::ZERO, target_amount)
}

pub fn summarize(goal: &Goal, badges: &[SavingBadge]) -> ScheduleSummary {
    let completed_periods = badges.iter().filter(|b| b.completed).count();
    let remaining_periods = badges.len() - completed_periods;
    let remaining_to_save = goal.remaining_amount();
    let suggested_per_period = if remaining_periods > 0 {
        Some(round_money(
            remaining_to_save / Decimal::from(remaining_periods),
        ))
    } else {
        None
    };
    ScheduleSummary {
        total_periods: badges.len(),
        completed_periods,
        remaining_periods,
        planned_per_period: badges.first().map(|b| b.amount),
        remaining_to_save,
        suggested_per_period,
        progress_percent: goal.progress_percent(),
    }
}

/// Per-period amount still needed when saving resumes on `from`.
///
/// Only the due dates on or after `from` count. Returns `None` when the goal
/// has no window or no period is left.
pub fn required_per_period(goal: &Goal, from: NaiveDate) -> Option<Decimal> {
    let (start, end) = goal.schedule_window()?;
    let periods = due_dates(goal.save_frequency, start, end)
        .into_iter()
        .filter(|due| *due >= from)
        .count();
    if periods == 0 {
        return None;
    }
    Some(round_money(
        goal.remaining_amount() / Decimal::from(periods),
    ))
}
