//! Monthly budget domain models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_utils::round_money;

/// Calendar month a budget belongs to, written `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        let month = value.get(5..).and_then(|m| m.parse::<u32>().ok());
        match month {
            Some(1..=12) if well_formed => Ok(Self(value.to_string())),
            _ => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid month key '{}', expected YYYY-MM",
                value
            )))),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        MonthKey::parse(value)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        MonthKey::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn require_positive(amount: Decimal, field: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "{} must be positive, got {}",
            field, amount
        ))));
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    Ok(())
}

/// A month that has a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Month {
    pub month_key: MonthKey,
    pub created_at: NaiveDateTime,
}

/// Spending category shared by every month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingEntry {
    pub id: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub month_key: MonthKey,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpendingEntry {
    pub id: Option<String>,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl NewSpendingEntry {
    pub fn validate(&self) -> Result<()> {
        require_positive(self.amount, "Spending amount")?;
        require_text(&self.category, "category")
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningEntry {
    pub id: String,
    pub source: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month_key: MonthKey,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEarningEntry {
    pub id: Option<String>,
    pub source: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl NewEarningEntry {
    pub fn validate(&self) -> Result<()> {
        require_positive(self.amount, "Earning amount")?;
        require_text(&self.source, "source")
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// Money borrowed from someone, and how much of it went back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowEntry {
    pub id: String,
    #[serde(rename = "from")]
    pub lender: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month_key: MonthKey,
    pub repaid_amount: Option<Decimal>,
    pub repaid_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl BorrowEntry {
    /// What is still owed, never below zero.
    pub fn outstanding(&self) -> Decimal {
        (self.amount - self.repaid_amount.unwrap_or_default()).max(Decimal::ZERO)
    }

    pub fn is_repaid(&self) -> bool {
        self.outstanding().is_zero()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrowEntry {
    pub id: Option<String>,
    #[serde(rename = "from")]
    pub lender: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl NewBorrowEntry {
    pub fn validate(&self) -> Result<()> {
        require_positive(self.amount, "Borrowed amount")?;
        require_text(&self.lender, "from")
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// Repayment recorded against a borrow. Replaces any earlier repayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRepayment {
    pub repaid_amount: Decimal,
    pub repaid_date: NaiveDate,
}

impl BorrowRepayment {
    /// A repayment cannot exceed the borrow nor predate it.
    pub fn validate_against(&self, borrow: &BorrowEntry) -> Result<()> {
        if self.repaid_amount < Decimal::ZERO || self.repaid_amount > borrow.amount {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Repaid amount {} must be between 0 and the borrowed {}",
                self.repaid_amount, borrow.amount
            ))));
        }
        if self.repaid_date < borrow.date {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Repayment on {} is before the borrow on {}",
                self.repaid_date, borrow.date
            ))));
        }
        Ok(())
    }
}

/// Planned spending for one category in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub month_key: MonthKey,
    pub category: String,
    pub planned_amount: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    pub month_key: MonthKey,
    pub category: String,
    pub planned_amount: Decimal,
}

impl PlanInput {
    pub fn validate(&self) -> Result<()> {
        require_text(&self.category, "category")?;
        if self.planned_amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Planned amount cannot be negative, got {}",
                self.planned_amount
            ))));
        }
        Ok(())
    }
}

/// Planned against actual spending for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category: String,
    pub planned: Decimal,
    pub spent: Decimal,
    /// Negative once the category is over budget
    pub remaining: Decimal,
}

impl CategoryBudget {
    pub fn is_over_budget(&self) -> bool {
        self.remaining < Decimal::ZERO
    }
}

/// Everything recorded for one month, with its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month_key: MonthKey,
    pub spending: Vec<SpendingEntry>,
    pub earnings: Vec<EarningEntry>,
    pub borrows: Vec<BorrowEntry>,
    pub plans: Vec<Plan>,
    pub total_spent: Decimal,
    pub total_earned: Decimal,
    pub total_planned: Decimal,
    /// Earned minus spent
    pub net: Decimal,
    pub outstanding_borrowed: Decimal,
    /// Sorted by category name
    pub categories: Vec<CategoryBudget>,
}

impl MonthSummary {
    pub fn build(
        month_key: MonthKey,
        spending: Vec<SpendingEntry>,
        earnings: Vec<EarningEntry>,
        borrows: Vec<BorrowEntry>,
        plans: Vec<Plan>,
    ) -> Self {
        let total_spent = round_money(spending.iter().map(|e| e.amount).sum());
        let total_earned = round_money(earnings.iter().map(|e| e.amount).sum());
        let total_planned = round_money(plans.iter().map(|p| p.planned_amount).sum());
        let outstanding_borrowed =
            round_money(borrows.iter().map(BorrowEntry::outstanding).sum());

        let mut by_category: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for plan in &plans {
            by_category.entry(plan.category.as_str()).or_default().0 += plan.planned_amount;
        }
        for entry in &spending {
            by_category.entry(entry.category.as_str()).or_default().1 += entry.amount;
        }
        let categories = by_category
            .into_iter()
            .map(|(category, (planned, spent))| CategoryBudget {
                category: category.to_string(),
                planned: round_money(planned),
                spent: round_money(spent),
                remaining: round_money(planned - spent),
            })
            .collect();

        Self {
            net: total_earned - total_spent,
            month_key,
            spending,
            earnings,
            borrows,
            plans,
            total_spent,
            total_earned,
            total_planned,
            outstanding_borrowed,
            categories,
        }
    }
}
