use goalpace_core::budget::{
    BorrowEntry, BorrowRepayment, BudgetCategory, BudgetRepositoryTrait, EarningEntry, Month,
    MonthKey, NewBorrowEntry, NewEarningEntry, NewSpendingEntry, Plan, PlanInput, SpendingEntry,
};
use goalpace_core::{Error, Result};

use super::model::{
    BorrowEntryDB, BudgetCategoryDB, EarningEntryDB, MonthDB, PlanDB, SpendingEntryDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{
    borrow_entries, budget_categories, budget_months, budget_plans, earning_entries,
    spending_entries,
};
use crate::utils::format_date;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use std::sync::Arc;
use uuid::Uuid;

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        BudgetRepository { pool, writer }
    }
}

fn convert_all<D, T>(rows: Vec<D>) -> Result<Vec<T>>
where
    T: TryFrom<D, Error = StorageError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(Error::from))
        .collect()
}

fn new_id(given: Option<String>) -> String {
    given.unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Creates the month row unless it exists, then returns it.
fn ensure_month_in(conn: &mut SqliteConnection, month_key: &MonthKey) -> Result<Month> {
    diesel::insert_or_ignore_into(budget_months::table)
        .values(&MonthDB {
            month_key: month_key.to_string(),
            created_at: Utc::now().naive_utc(),
        })
        .execute(conn)
        .map_err(StorageError::from)?;
    let month_db = budget_months::table
        .find(month_key.as_str())
        .first::<MonthDB>(conn)
        .map_err(StorageError::from)?;
    Ok(Month::try_from(month_db)?)
}

fn find_borrow(conn: &mut SqliteConnection, entry_id: &str) -> Result<Option<BorrowEntry>> {
    let borrow_db = borrow_entries::table
        .find(entry_id)
        .first::<BorrowEntryDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    Ok(borrow_db.map(BorrowEntry::try_from).transpose()?)
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn list_months(&self) -> Result<Vec<Month>> {
        let mut conn = get_connection(&self.pool)?;
        let months_db = budget_months::table
            .order(budget_months::month_key.desc())
            .load::<MonthDB>(&mut conn)
            .map_err(StorageError::from)?;
        convert_all(months_db)
    }

    fn get_month(&self, month_key: &MonthKey) -> Result<Option<Month>> {
        let mut conn = get_connection(&self.pool)?;
        let month_db = budget_months::table
            .find(month_key.as_str())
            .first::<MonthDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(month_db.map(Month::try_from).transpose()?)
    }

    async fn ensure_month(&self, month_key: MonthKey) -> Result<Month> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Month> {
                ensure_month_in(conn, &month_key)
            })
            .await
    }

    async fn create_month_with_plans(&self, month_key: MonthKey) -> Result<Month> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Month> {
                let month = ensure_month_in(conn, &month_key)?;
                let categories = budget_categories::table
                    .select(budget_categories::name)
                    .load::<String>(conn)
                    .map_err(StorageError::from)?;
                let now = Utc::now().naive_utc();
                let seeds: Vec<PlanDB> = categories
                    .into_iter()
                    .map(|category| {
                        PlanDB::seed(&month_key, category, Uuid::new_v4().to_string(), now)
                    })
                    .collect();
                if seeds.is_empty() {
                    return Ok(month);
                }
                // Existing plans for the month keep their amounts.
                let seeded = diesel::insert_or_ignore_into(budget_plans::table)
                    .values(&seeds)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Seeded {} zero plans for {}", seeded, month_key);
                Ok(month)
            })
            .await
    }

    async fn delete_month(&self, month_key: MonthKey) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let key = month_key.as_str();
                let spending = diesel::delete(
                    spending_entries::table.filter(spending_entries::month_key.eq(key)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let earnings = diesel::delete(
                    earning_entries::table.filter(earning_entries::month_key.eq(key)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let borrows =
                    diesel::delete(borrow_entries::table.filter(borrow_entries::month_key.eq(key)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                let plans =
                    diesel::delete(budget_plans::table.filter(budget_plans::month_key.eq(key)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                let months = diesel::delete(budget_months::table.find(key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Month {} removed with {} spending, {} earning, {} borrow and {} plan rows",
                    month_key, spending, earnings, borrows, plans
                );
                Ok(months)
            })
            .await
    }

    fn list_spending(&self, month: Option<&MonthKey>) -> Result<Vec<SpendingEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = spending_entries::table.into_boxed();
        if let Some(month) = month {
            query = query.filter(spending_entries::month_key.eq(month.as_str()));
        }
        let entries_db = query
            .order((
                spending_entries::entry_date.desc(),
                spending_entries::created_at.desc(),
            ))
            .load::<SpendingEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        convert_all(entries_db)
    }

    async fn create_spending(&self, entry: NewSpendingEntry) -> Result<SpendingEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SpendingEntry> {
                ensure_month_in(conn, &entry.month_key())?;
                let entry_id = new_id(entry.id.clone());
                let entry_db =
                    SpendingEntryDB::from_new(entry, entry_id, Utc::now().naive_utc());

                let result_db = diesel::insert_into(spending_entries::table)
                    .values(&entry_db)
                    .returning(SpendingEntryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(SpendingEntry::try_from(result_db)?)
            })
            .await
    }

    async fn delete_spending(&self, entry_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(spending_entries::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_earnings(&self, month: Option<&MonthKey>) -> Result<Vec<EarningEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = earning_entries::table.into_boxed();
        if let Some(month) = month {
            query = query.filter(earning_entries::month_key.eq(month.as_str()));
        }
        let entries_db = query
            .order((
                earning_entries::entry_date.desc(),
                earning_entries::created_at.desc(),
            ))
            .load::<EarningEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        convert_all(entries_db)
    }

    async fn create_earning(&self, entry: NewEarningEntry) -> Result<EarningEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<EarningEntry> {
                ensure_month_in(conn, &entry.month_key())?;
                let entry_id = new_id(entry.id.clone());
                let entry_db = EarningEntryDB::from_new(entry, entry_id, Utc::now().naive_utc());

                let result_db = diesel::insert_into(earning_entries::table)
                    .values(&entry_db)
                    .returning(EarningEntryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(EarningEntry::try_from(result_db)?)
            })
            .await
    }

    async fn delete_earning(&self, entry_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(earning_entries::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_borrows(&self, month: Option<&MonthKey>) -> Result<Vec<BorrowEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = borrow_entries::table.into_boxed();
        if let Some(month) = month {
            query = query.filter(borrow_entries::month_key.eq(month.as_str()));
        }
        let entries_db = query
            .order((
                borrow_entries::entry_date.desc(),
                borrow_entries::created_at.desc(),
            ))
            .load::<BorrowEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        convert_all(entries_db)
    }

    fn get_borrow(&self, entry_id: &str) -> Result<Option<BorrowEntry>> {
        let mut conn = get_connection(&self.pool)?;
        find_borrow(&mut conn, entry_id)
    }

    async fn create_borrow(&self, entry: NewBorrowEntry) -> Result<BorrowEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BorrowEntry> {
                ensure_month_in(conn, &entry.month_key())?;
                let entry_id = new_id(entry.id.clone());
                let entry_db = BorrowEntryDB::from_new(entry, entry_id, Utc::now().naive_utc());

                let result_db = diesel::insert_into(borrow_entries::table)
                    .values(&entry_db)
                    .returning(BorrowEntryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(BorrowEntry::try_from(result_db)?)
            })
            .await
    }

    async fn update_borrow_repayment(
        &self,
        entry_id: String,
        repayment: BorrowRepayment,
    ) -> Result<Option<BorrowEntry>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<BorrowEntry>> {
                let updated = diesel::update(borrow_entries::table.find(entry_id.as_str()))
                    .set((
                        borrow_entries::repaid_amount.eq(Some(repayment.repaid_amount.to_string())),
                        borrow_entries::repaid_date.eq(Some(format_date(repayment.repaid_date))),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Ok(None);
                }
                find_borrow(conn, &entry_id)
            })
            .await
    }

    async fn delete_borrow(&self, entry_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(borrow_entries::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_categories(&self) -> Result<Vec<BudgetCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let categories_db = budget_categories::table
            .order(budget_categories::name.asc())
            .load::<BudgetCategoryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(categories_db.into_iter().map(BudgetCategory::from).collect())
    }

    async fn create_category(&self, name: String) -> Result<BudgetCategory> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BudgetCategory> {
                let result_db = diesel::insert_into(budget_categories::table)
                    .values(&BudgetCategoryDB {
                        name,
                        created_at: Utc::now().naive_utc(),
                    })
                    .returning(BudgetCategoryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(BudgetCategory::from(result_db))
            })
            .await
    }

    async fn delete_category(&self, name: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(budget_categories::table.find(name))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_plans(&self, month: Option<&MonthKey>) -> Result<Vec<Plan>> {
        let mut conn = get_connection(&self.pool)?;
        let plans_db = match month {
            Some(month) => budget_plans::table
                .filter(budget_plans::month_key.eq(month.as_str()))
                .order(budget_plans::category.asc())
                .load::<PlanDB>(&mut conn),
            None => budget_plans::table
                .order((budget_plans::month_key.desc(), budget_plans::category.asc()))
                .load::<PlanDB>(&mut conn),
        }
        .map_err(StorageError::from)?;
        convert_all(plans_db)
    }

    async fn upsert_plan(&self, plan: PlanInput) -> Result<(Plan, bool)> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(Plan, bool)> {
                ensure_month_in(conn, &plan.month_key)?;
                let existing = budget_plans::table
                    .filter(budget_plans::month_key.eq(plan.month_key.as_str()))
                    .filter(budget_plans::category.eq(plan.category.as_str()))
                    .select(budget_plans::id)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let updated = existing.is_some();

                let plan_db = PlanDB::from_input(
                    plan,
                    existing.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    Utc::now().naive_utc(),
                );
                let result_db = diesel::insert_into(budget_plans::table)
                    .values(&plan_db)
                    .on_conflict((budget_plans::month_key, budget_plans::category))
                    .do_update()
                    .set(budget_plans::planned_amount.eq(&plan_db.planned_amount))
                    .returning(PlanDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok((Plan::try_from(result_db)?, updated))
            })
            .await
    }

    async fn delete_plan(&self, month_key: MonthKey, category: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    budget_plans::table
                        .filter(budget_plans::month_key.eq(month_key.as_str()))
                        .filter(budget_plans::category.eq(category)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}
