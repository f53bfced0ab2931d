use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::budget_model::{
    BorrowEntry, BorrowRepayment, BudgetCategory, EarningEntry, Month, MonthKey, MonthSummary,
    NewBorrowEntry, NewEarningEntry, NewSpendingEntry, Plan, PlanInput, SpendingEntry,
};
use super::budget_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};

pub struct BudgetService {
    budget_repo: Arc<dyn BudgetRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl BudgetService {
    pub fn new(
        budget_repo: Arc<dyn BudgetRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        BudgetService {
            budget_repo,
            event_sink,
        }
    }

    fn changed(&self, month_key: Option<&MonthKey>) {
        self.event_sink
            .emit(DomainEvent::budget_changed(month_key.map(MonthKey::to_string)));
    }
}

fn month_filter(month_key: Option<&str>) -> Result<Option<MonthKey>> {
    month_key.map(MonthKey::parse).transpose()
}

fn require_deleted(deleted: usize, what: &str, key: &str) -> Result<()> {
    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("{} '{}'", what, key)).into());
    }
    Ok(())
}

fn category_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    Ok(name.to_string())
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    fn list_months(&self) -> Result<Vec<Month>> {
        self.budget_repo.list_months()
    }

    async fn create_month(&self, month_key: &str) -> Result<Month> {
        let month_key = MonthKey::parse(month_key)?;
        let month = self
            .budget_repo
            .create_month_with_plans(month_key.clone())
            .await?;
        debug!("Created budget month {}", month_key);
        self.changed(Some(&month_key));
        Ok(month)
    }

    fn get_month_summary(&self, month_key: &str) -> Result<MonthSummary> {
        let month_key = MonthKey::parse(month_key)?;
        let month = Some(&month_key);
        Ok(MonthSummary::build(
            month_key.clone(),
            self.budget_repo.list_spending(month)?,
            self.budget_repo.list_earnings(month)?,
            self.budget_repo.list_borrows(month)?,
            self.budget_repo.list_plans(month)?,
        ))
    }

    async fn delete_month(&self, month_key: &str) -> Result<()> {
        let month_key = MonthKey::parse(month_key)?;
        if self.budget_repo.get_month(&month_key)?.is_none() {
            return Err(DatabaseError::NotFound(format!("month '{}'", month_key)).into());
        }
        self.budget_repo.delete_month(month_key.clone()).await?;
        debug!("Deleted budget month {} with its entries", month_key);
        self.changed(Some(&month_key));
        Ok(())
    }

    fn list_spending(&self, month_key: Option<&str>) -> Result<Vec<SpendingEntry>> {
        self.budget_repo
            .list_spending(month_filter(month_key)?.as_ref())
    }

    async fn add_spending(&self, entry: NewSpendingEntry) -> Result<SpendingEntry> {
        entry.validate()?;
        let entry = NewSpendingEntry {
            category: entry.category.trim().to_string(),
            note: entry.note.filter(|note| !note.trim().is_empty()),
            ..entry
        };
        let created = self.budget_repo.create_spending(entry).await?;
        self.changed(Some(&created.month_key));
        Ok(created)
    }

    async fn delete_spending(&self, entry_id: &str) -> Result<()> {
        let deleted = self
            .budget_repo
            .delete_spending(entry_id.to_string())
            .await?;
        require_deleted(deleted, "spending entry", entry_id)?;
        self.changed(None);
        Ok(())
    }

    fn list_earnings(&self, month_key: Option<&str>) -> Result<Vec<EarningEntry>> {
        self.budget_repo
            .list_earnings(month_filter(month_key)?.as_ref())
    }

    async fn add_earning(&self, entry: NewEarningEntry) -> Result<EarningEntry> {
        entry.validate()?;
        let entry = NewEarningEntry {
            source: entry.source.trim().to_string(),
            ..entry
        };
        let created = self.budget_repo.create_earning(entry).await?;
        self.changed(Some(&created.month_key));
        Ok(created)
    }

    async fn delete_earning(&self, entry_id: &str) -> Result<()> {
        let deleted = self
            .budget_repo
            .delete_earning(entry_id.to_string())
            .await?;
        require_deleted(deleted, "earning entry", entry_id)?;
        self.changed(None);
        Ok(())
    }

    fn list_borrows(&self, month_key: Option<&str>) -> Result<Vec<BorrowEntry>> {
        self.budget_repo
            .list_borrows(month_filter(month_key)?.as_ref())
    }

    async fn add_borrow(&self, entry: NewBorrowEntry) -> Result<BorrowEntry> {
        entry.validate()?;
        let entry = NewBorrowEntry {
            lender: entry.lender.trim().to_string(),
            ..entry
        };
        let created = self.budget_repo.create_borrow(entry).await?;
        self.changed(Some(&created.month_key));
        Ok(created)
    }

    async fn record_repayment(
        &self,
        entry_id: &str,
        repayment: BorrowRepayment,
    ) -> Result<BorrowEntry> {
        let borrow = self
            .budget_repo
            .get_borrow(entry_id)?
            .ok_or_else(|| Error::from(DatabaseError::NotFound(format!("borrow '{}'", entry_id))))?;
        repayment.validate_against(&borrow)?;

        let updated = self
            .budget_repo
            .update_borrow_repayment(entry_id.to_string(), repayment)
            .await?
            .ok_or_else(|| Error::from(DatabaseError::NotFound(format!("borrow '{}'", entry_id))))?;
        debug!(
            "Borrow {} repaid {}, {} outstanding",
            updated.id,
            updated.repaid_amount.unwrap_or_default(),
            updated.outstanding()
        );
        self.changed(Some(&updated.month_key));
        Ok(updated)
    }

    async fn delete_borrow(&self, entry_id: &str) -> Result<()> {
        let deleted = self
            .budget_repo
            .delete_borrow(entry_id.to_string())
            .await?;
        require_deleted(deleted, "borrow", entry_id)?;
        self.changed(None);
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<BudgetCategory>> {
        self.budget_repo.list_categories()
    }

    async fn create_category(&self, name: &str) -> Result<BudgetCategory> {
        let category = self.budget_repo.create_category(category_name(name)?).await?;
        self.changed(None);
        Ok(category)
    }

    async fn delete_category(&self, name: &str) -> Result<()> {
        let deleted = self
            .budget_repo
            .delete_category(name.trim().to_string())
            .await?;
        require_deleted(deleted, "category", name)?;
        self.changed(None);
        Ok(())
    }

    fn list_plans(&self, month_key: Option<&str>) -> Result<Vec<Plan>> {
        self.budget_repo
            .list_plans(month_filter(month_key)?.as_ref())
    }

    async fn set_plan(&self, plan: PlanInput) -> Result<(Plan, bool)> {
        plan.validate()?;
        let plan = PlanInput {
            category: plan.category.trim().to_string(),
            ..plan
        };
        let (saved, updated) = self.budget_repo.upsert_plan(plan).await?;
        self.changed(Some(&saved.month_key));
        Ok((saved, updated))
    }

    async fn delete_plan(&self, month_key: &str, category: &str) -> Result<()> {
        let key = MonthKey::parse(month_key)?;
        let deleted = self
            .budget_repo
            .delete_plan(key.clone(), category.trim().to_string())
            .await?;
        require_deleted(deleted, "plan", &format!("{}/{}", key, category))?;
        self.changed(Some(&key));
        Ok(())
    }
}
