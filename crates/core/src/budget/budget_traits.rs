use async_trait::async_trait;

use crate::errors::Result;

use super::budget_model::{
    BorrowEntry, BorrowRepayment, BudgetCategory, EarningEntry, Month, MonthKey, MonthSummary,
    NewBorrowEntry, NewEarningEntry, NewSpendingEntry, Plan, PlanInput, SpendingEntry,
};

/// Persistence of months, their entries and plans.
///
/// Creating an entry or a plan also creates its month when missing. Lists
/// filtered by `month` return everything when it is `None`.
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    // Months
    fn list_months(&self) -> Result<Vec<Month>>;
    fn get_month(&self, month_key: &MonthKey) -> Result<Option<Month>>;
    async fn ensure_month(&self, month_key: MonthKey) -> Result<Month>;
    /// Creates the month with a zero plan for every category.
    async fn create_month_with_plans(&self, month_key: MonthKey) -> Result<Month>;
    /// Removes the month with all its entries and plans, all or nothing.
    async fn delete_month(&self, month_key: MonthKey) -> Result<usize>;

    // Spending
    fn list_spending(&self, month: Option<&MonthKey>) -> Result<Vec<SpendingEntry>>;
    async fn create_spending(&self, entry: NewSpendingEntry) -> Result<SpendingEntry>;
    async fn delete_spending(&self, entry_id: String) -> Result<usize>;

    // Earnings
    fn list_earnings(&self, month: Option<&MonthKey>) -> Result<Vec<EarningEntry>>;
    async fn create_earning(&self, entry: NewEarningEntry) -> Result<EarningEntry>;
    async fn delete_earning(&self, entry_id: String) -> Result<usize>;

    // Borrows
    fn list_borrows(&self, month: Option<&MonthKey>) -> Result<Vec<BorrowEntry>>;
    fn get_borrow(&self, entry_id: &str) -> Result<Option<BorrowEntry>>;
    async fn create_borrow(&self, entry: NewBorrowEntry) -> Result<BorrowEntry>;
    async fn update_borrow_repayment(
        &self,
        entry_id: String,
        repayment: BorrowRepayment,
    ) -> Result<Option<BorrowEntry>>;
    async fn delete_borrow(&self, entry_id: String) -> Result<usize>;

    // Categories
    fn list_categories(&self) -> Result<Vec<BudgetCategory>>;
    async fn create_category(&self, name: String) -> Result<BudgetCategory>;
    async fn delete_category(&self, name: String) -> Result<usize>;

    // Plans
    fn list_plans(&self, month: Option<&MonthKey>) -> Result<Vec<Plan>>;
    /// Returns the plan and whether an existing one was updated.
    async fn upsert_plan(&self, plan: PlanInput) -> Result<(Plan, bool)>;
    async fn delete_plan(&self, month_key: MonthKey, category: String) -> Result<usize>;
}

/// Monthly budget operations with validation.
///
/// Deletes of rows that do not exist fail with `DatabaseError::NotFound`.
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    fn list_months(&self) -> Result<Vec<Month>>;
    async fn create_month(&self, month_key: &str) -> Result<Month>;
    fn get_month_summary(&self, month_key: &str) -> Result<MonthSummary>;
    async fn delete_month(&self, month_key: &str) -> Result<()>;

    fn list_spending(&self, month_key: Option<&str>) -> Result<Vec<SpendingEntry>>;
    async fn add_spending(&self, entry: NewSpendingEntry) -> Result<SpendingEntry>;
    async fn delete_spending(&self, entry_id: &str) -> Result<()>;

    fn list_earnings(&self, month_key: Option<&str>) -> Result<Vec<EarningEntry>>;
    async fn add_earning(&self, entry: NewEarningEntry) -> Result<EarningEntry>;
    async fn delete_earning(&self, entry_id: &str) -> Result<()>;

    fn list_borrows(&self, month_key: Option<&str>) -> Result<Vec<BorrowEntry>>;
    async fn add_borrow(&self, entry: NewBorrowEntry) -> Result<BorrowEntry>;
    async fn record_repayment(
        &self,
        entry_id: &str,
        repayment: BorrowRepayment,
    ) -> Result<BorrowEntry>;
    async fn delete_borrow(&self, entry_id: &str) -> Result<()>;

    fn list_categories(&self) -> Result<Vec<BudgetCategory>>;
    async fn create_category(&self, name: &str) -> Result<BudgetCategory>;
    async fn delete_category(&self, name: &str) -> Result<()>;

    fn list_plans(&self, month_key: Option<&str>) -> Result<Vec<Plan>>;
    async fn set_plan(&self, plan: PlanInput) -> Result<(Plan, bool)>;
    async fn delete_plan(&self, month_key: &str, category: &str) -> Result<()>;
}
