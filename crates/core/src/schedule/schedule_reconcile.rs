//! Rebuilds a schedule after a goal edit without losing recorded progress.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::schedule_generator::{build_schedule, classify_status};
use super::schedule_model::SavingBadge;
use crate::errors::{Result, ScheduleError};
use crate::goals::Goal;
use crate::settings::Settings;
use crate::utils::decimal_utils::clamp_amount;

/// Regenerates the schedule of `updated_goal` and carries progress over from
/// `previous`, matching badges on their due date.
///
/// A matched badge keeps its progress (clamped to the new amount) and its
/// last update time, and counts as completed only if that progress covers
/// the new amount. Dates that did not exist before start empty, and previous
/// badges whose date left the window are dropped.
pub fn regenerate_schedule(
    previous: &[SavingBadge],
    updated_goal: &Goal,
    today: NaiveDate,
    settings: &Settings,
) -> Result<Vec<SavingBadge>> {
    if updated_goal.target_amount <= Decimal::ZERO {
        return Err(ScheduleError::NonPositiveTarget(updated_goal.target_amount).into());
    }
    let Some((start, end)) = updated_goal.schedule_window() else {
        return Ok(Vec::new());
    };
    let fresh = build_schedule(
        updated_goal.save_frequency,
        start,
        end,
        updated_goal.target_amount,
        Decimal::ZERO,
        today,
        settings,
    )?;
    Ok(merge_progress(previous, fresh, today, settings))
}

/// Keyed merge of `previous` progress into a freshly built schedule.
pub fn merge_progress(
    previous: &[SavingBadge],
    fresh: Vec<SavingBadge>,
    today: NaiveDate,
    settings: &Settings,
) -> Vec<SavingBadge> {
    let by_date: HashMap<NaiveDate, &SavingBadge> =
        previous.iter().map(|badge| (badge.date, badge)).collect();

    let merged: Vec<SavingBadge> = fresh
        .into_iter()
        .map(|badge| match by_date.get(&badge.date) {
            Some(prior) => carry_over(badge, prior, today, settings),
            None => badge,
        })
        .collect();

    let dropped = previous
        .iter()
        .filter(|prior| prior.progress_amount > Decimal::ZERO)
        .filter(|prior| !merged.iter().any(|badge| badge.date == prior.date))
        .count();
    if dropped > 0 {
        debug!(
            "{} badge(s) with recorded progress fell outside the new schedule",
            dropped
        );
    }
    merged
}

fn carry_over(
    badge: SavingBadge,
    prior: &SavingBadge,
    today: NaiveDate,
    settings: &Settings,
) -> SavingBadge {
    let progress_amount = clamp_amount(prior.progress_amount, Decimal::ZERO, badge.amount);
    let completed = progress_amount >= badge.amount;
    SavingBadge {
        completed,
        progress_amount,
        status: classify_status(badge.date, completed, today, settings.late_grace_days),
        last_updated_at: prior.last_updated_at,
        ..badge
    }
}
