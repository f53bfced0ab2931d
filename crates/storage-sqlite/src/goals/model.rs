//! Database models for goals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use goalpace_core::goals::{Goal, GoalStatus, NewGoal, SaveFrequency};

use crate::utils::{format_optional_date, parse_amount, parse_date};

/// Database model for goals
#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct GoalDB {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub save_frequency: String,
    pub duration: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Database model for creating a new goal
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalDB {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub save_frequency: String,
    pub duration: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

// Conversion to domain models
impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        let status = GoalStatus::parse(&db.status).unwrap_or_else(|| {
            log::warn!(
                "Unknown status '{}' on goal {}, reading it as not started",
                db.status,
                db.id
            );
            GoalStatus::NotStarted
        });
        Self {
            target_amount: parse_amount(&db.target_amount, "target_amount"),
            current_amount: parse_amount(&db.current_amount, "current_amount"),
            save_frequency: SaveFrequency::parse_lenient(&db.save_frequency),
            duration: db.duration.and_then(|months| u32::try_from(months).ok()),
            start_date: parse_date(db.start_date.as_deref(), "start_date"),
            end_date: parse_date(db.end_date.as_deref(), "end_date"),
            status,
            id: db.id,
            title: db.title,
            description: db.description,
            category: db.category,
            created_at: db.created_at,
        }
    }
}

impl From<Goal> for GoalDB {
    fn from(domain: Goal) -> Self {
        Self {
            id: domain.id,
            title: domain.title,
            description: domain.description,
            category: domain.category,
            target_amount: domain.target_amount.to_string(),
            current_amount: domain.current_amount.to_string(),
            save_frequency: domain.save_frequency.as_str().to_string(),
            duration: domain.duration.and_then(|months| i32::try_from(months).ok()),
            start_date: format_optional_date(domain.start_date),
            end_date: format_optional_date(domain.end_date),
            status: domain.status.as_str().to_string(),
            created_at: domain.created_at,
        }
    }
}

impl NewGoalDB {
    /// Builds the row for a validated new goal. Saved amount starts at zero.
    pub fn from_new_goal(domain: NewGoal, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            title: domain.title.trim().to_string(),
            description: domain.description,
            category: domain.category,
            target_amount: domain.target_amount.unwrap_or_default().to_string(),
            current_amount: Decimal::ZERO.to_string(),
            save_frequency: domain
                .save_frequency
                .unwrap_or_default()
                .as_str()
                .to_string(),
            duration: domain.duration.and_then(|months| i32::try_from(months).ok()),
            start_date: format_optional_date(domain.start_date),
            end_date: format_optional_date(domain.end_date),
            status: GoalStatus::NotStarted.as_str().to_string(),
            created_at,
        }
    }
}
