//! Database models for the monthly budget.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use goalpace_core::budget::{
    BorrowEntry, BudgetCategory, EarningEntry, Month, MonthKey, NewBorrowEntry, NewEarningEntry,
    NewSpendingEntry, Plan, PlanInput, SpendingEntry,
};

use crate::errors::StorageError;
use crate::utils::{format_date, parse_amount, parse_date, read_date};

fn read_month_key(value: &str) -> Result<MonthKey, StorageError> {
    MonthKey::parse(value).map_err(|e| StorageError::CorruptValue(e.to_string()))
}

#[derive(Queryable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::budget_months)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MonthDB {
    pub month_key: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<MonthDB> for Month {
    type Error = StorageError;

    fn try_from(db: MonthDB) -> Result<Self, StorageError> {
        Ok(Self {
            month_key: read_month_key(&db.month_key)?,
            created_at: db.created_at,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::budget_categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetCategoryDB {
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl From<BudgetCategoryDB> for BudgetCategory {
    fn from(db: BudgetCategoryDB) -> Self {
        Self {
            name: db.name,
            created_at: db.created_at,
        }
    }
}

/// Database model for spending entries
#[derive(
    Queryable, Selectable, Insertable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::spending_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SpendingEntryDB {
    pub id: String,
    pub amount: String,
    pub category: String,
    pub entry_date: String,
    pub month_key: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl SpendingEntryDB {
    pub fn from_new(entry: NewSpendingEntry, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            month_key: entry.month_key().to_string(),
            id,
            amount: entry.amount.to_string(),
            category: entry.category,
            entry_date: format_date(entry.date),
            note: entry.note,
            created_at,
        }
    }
}

impl TryFrom<SpendingEntryDB> for SpendingEntry {
    type Error = StorageError;

    fn try_from(db: SpendingEntryDB) -> Result<Self, StorageError> {
        Ok(Self {
            amount: parse_amount(&db.amount, "amount"),
            date: read_date(&db.entry_date, "entry_date")?,
            month_key: read_month_key(&db.month_key)?,
            id: db.id,
            category: db.category,
            note: db.note,
            created_at: db.created_at,
        })
    }
}

/// Database model for earning entries
#[derive(
    Queryable, Selectable, Insertable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::earning_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct EarningEntryDB {
    pub id: String,
    pub source: String,
    pub amount: String,
    pub entry_date: String,
    pub month_key: String,
    pub created_at: NaiveDateTime,
}

impl EarningEntryDB {
    pub fn from_new(entry: NewEarningEntry, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            month_key: entry.month_key().to_string(),
            id,
            source: entry.source,
            amount: entry.amount.to_string(),
            entry_date: format_date(entry.date),
            created_at,
        }
    }
}

impl TryFrom<EarningEntryDB> for EarningEntry {
    type Error = StorageError;

    fn try_from(db: EarningEntryDB) -> Result<Self, StorageError> {
        Ok(Self {
            amount: parse_amount(&db.amount, "amount"),
            date: read_date(&db.entry_date, "entry_date")?,
            month_key: read_month_key(&db.month_key)?,
            id: db.id,
            source: db.source,
            created_at: db.created_at,
        })
    }
}

/// Database model for borrows. Repayment columns stay null until one is recorded.
#[derive(
    Queryable, Selectable, Insertable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::borrow_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct BorrowEntryDB {
    pub id: String,
    pub lender: String,
    pub amount: String,
    pub entry_date: String,
    pub month_key: String,
    pub repaid_amount: Option<String>,
    pub repaid_date: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BorrowEntryDB {
    pub fn from_new(entry: NewBorrowEntry, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            month_key: entry.month_key().to_string(),
            id,
            lender: entry.lender,
            amount: entry.amount.to_string(),
            entry_date: format_date(entry.date),
            repaid_amount: None,
            repaid_date: None,
            created_at,
        }
    }
}

impl TryFrom<BorrowEntryDB> for BorrowEntry {
    type Error = StorageError;

    fn try_from(db: BorrowEntryDB) -> Result<Self, StorageError> {
        Ok(Self {
            amount: parse_amount(&db.amount, "amount"),
            date: read_date(&db.entry_date, "entry_date")?,
            month_key: read_month_key(&db.month_key)?,
            repaid_amount: db
                .repaid_amount
                .as_deref()
                .map(|value| parse_amount(value, "repaid_amount")),
            repaid_date: parse_date(db.repaid_date.as_deref(), "repaid_date"),
            id: db.id,
            lender: db.lender,
            created_at: db.created_at,
        })
    }
}

/// Database model for per-month category plans
#[derive(
    Queryable, Selectable, Insertable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::budget_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PlanDB {
    pub id: String,
    pub month_key: String,
    pub category: String,
    pub planned_amount: String,
    pub created_at: NaiveDateTime,
}

impl PlanDB {
    pub fn from_input(plan: PlanInput, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            month_key: plan.month_key.to_string(),
            category: plan.category,
            planned_amount: plan.planned_amount.to_string(),
            created_at,
        }
    }

    /// Zero plan seeded for a category when its month is created.
    pub fn seed(
        month_key: &MonthKey,
        category: String,
        id: String,
        created_at: NaiveDateTime,
    ) -> Self {
        Self::from_input(
            PlanInput {
                month_key: month_key.clone(),
                category,
                planned_amount: Decimal::ZERO,
            },
            id,
            created_at,
        )
    }
}

impl TryFrom<PlanDB> for Plan {
    type Error = StorageError;

    fn try_from(db: PlanDB) -> Result<Self, StorageError> {
        Ok(Self {
            planned_amount: parse_amount(&db.planned_amount, "planned_amount"),
            month_key: read_month_key(&db.month_key)?,
            id: db.id,
            category: db.category,
            created_at: db.created_at,
        })
    }
}
