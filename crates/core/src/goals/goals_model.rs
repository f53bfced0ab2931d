//! Goals domain models.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_utils::clamp_amount;
use crate::utils::time_utils::add_months;

/// Cadence at which a goal expects a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SaveFrequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl SaveFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveFrequency::Daily => "daily",
            SaveFrequency::Weekly => "weekly",
            SaveFrequency::Monthly => "monthly",
        }
    }

    /// Lenient parse: anything unrecognized schedules monthly.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => SaveFrequency::Daily,
            "weekly" => SaveFrequency::Weekly,
            _ => SaveFrequency::Monthly,
        }
    }

    /// Human label for the n-th period of this cadence ("Week 3").
    pub fn period_label(&self, n: u32) -> String {
        match self {
            SaveFrequency::Daily => format!("Day {}", n),
            SaveFrequency::Weekly => format!("Week {}", n),
            SaveFrequency::Monthly => format!("Month {}", n),
        }
    }
}

impl From<String> for SaveFrequency {
    fn from(value: String) -> Self {
        SaveFrequency::parse_lenient(&value)
    }
}

impl From<SaveFrequency> for String {
    fn from(value: SaveFrequency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SaveFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a goal. `active` and `achieved` are accepted as older
/// spellings of `in_progress` and `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    #[serde(alias = "active")]
    InProgress,
    #[serde(alias = "achieved")]
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "not_started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_started" => Some(GoalStatus::NotStarted),
            "in_progress" | "active" => Some(GoalStatus::InProgress),
            "completed" | "achieved" => Some(GoalStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing a savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_amount: Decimal,
    #[serde(alias = "savedAmount", default)]
    pub current_amount: Decimal,
    #[serde(default)]
    pub save_frequency: SaveFrequency,
    /// Length of the plan in months
    pub duration: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    pub created_at: NaiveDateTime,
}

impl Goal {
    /// Start and end of the savings schedule, inclusive.
    ///
    /// Without an explicit end date the window covers `duration` months
    /// starting on the start date.
    pub fn schedule_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date?;
        let end = match (self.end_date, self.duration) {
            (Some(end), _) => end,
            (None, Some(months)) => end_from_duration(start, months)?,
            _ => return None,
        };
        Some((start, end))
    }

    /// Whole percent of the target saved, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        if self.target_amount <= Decimal::ZERO {
            return 0;
        }
        let pct = (self.current_amount / self.target_amount * dec!(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        pct.to_u32().unwrap_or(0).min(100)
    }

    /// Sets the saved amount, clamped to `[0, target_amount]`.
    pub fn set_current_amount(&mut self, amount: Decimal) {
        self.current_amount = clamp_amount(amount, Decimal::ZERO, self.target_amount);
    }

    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    /// Checks the invariants a stored goal must keep after an edit.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Goal title cannot be empty".to_string(),
            )));
        }
        validate_target(self.target_amount)?;
        if self.duration == Some(0) && self.end_date.is_none() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Duration must be at least one month".to_string(),
            )));
        }
        validate_window(self.start_date, self.end_date)
    }
}

/// Last day of a plan of `months` months starting on `start`.
pub(crate) fn end_from_duration(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    if months == 0 {
        return None;
    }
    add_months(start, months)?.checked_sub_days(Days::new(1))
}

fn validate_target(target: Decimal) -> Result<()> {
    if target <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Target amount must be positive, got {}",
            target
        ))));
    }
    Ok(())
}

fn validate_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "End date {} is before start date {}",
                end, start
            ))));
        }
    }
    Ok(())
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_amount: Option<Decimal>,
    pub save_frequency: Option<SaveFrequency>,
    pub duration: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewGoal {
    /// Form-level checks: title, target amount, frequency and a way to
    /// bound the schedule (duration or end date) are required.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "title".to_string(),
            )));
        }
        match self.target_amount {
            Some(target) => validate_target(target)?,
            None => {
                return Err(Error::Validation(ValidationError::MissingField(
                    "targetAmount".to_string(),
                )))
            }
        }
        if self.save_frequency.is_none() {
            return Err(Error::Validation(ValidationError::MissingField(
                "saveFrequency".to_string(),
            )));
        }
        match (self.duration, self.end_date) {
            (Some(0), None) => {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Duration must be at least one month".to_string(),
                )))
            }
            (None, None) => {
                return Err(Error::Validation(ValidationError::MissingField(
                    "duration".to_string(),
                )))
            }
            _ => {}
        }
        validate_window(self.start_date, self.end_date)
    }
}

/// Partial update of a goal; `None` leaves the field untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_amount: Option<Decimal>,
    pub save_frequency: Option<SaveFrequency>,
    pub duration: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl GoalUpdate {
    /// True when the patch touches a field the badge schedule depends on.
    pub fn affects_schedule(&self) -> bool {
        self.target_amount.is_some()
            || self.save_frequency.is_some()
            || self.duration.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    /// Applies the patch onto a copy of `goal`.
    ///
    /// A new duration moves an existing end date with it unless the same
    /// patch sets the end date.
    pub fn apply_to(&self, goal: &Goal) -> Goal {
        let mut updated = goal.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = Some(description.clone());
        }
        if let Some(category) = &self.category {
            updated.category = Some(category.clone());
        }
        if let Some(target) = self.target_amount {
            updated.target_amount = target;
        }
        if let Some(frequency) = self.save_frequency {
            updated.save_frequency = frequency;
        }
        if let Some(start) = self.start_date {
            updated.start_date = Some(start);
        }
        if let Some(duration) = self.duration {
            updated.duration = Some(duration);
            if self.end_date.is_none() && updated.end_date.is_some() {
                updated.end_date = updated
                    .start_date
                    .and_then(|start| end_from_duration(start, duration));
            }
        }
        if let Some(end) = self.end_date {
            updated.end_date = Some(end);
        }
        let current = updated.current_amount;
        updated.set_current_amount(current);
        updated
    }
}
