//! Monthly budget: spending, earnings, borrows, categories and plans,
//! grouped by calendar month.

mod budget_model;
mod budget_service;
mod budget_traits;



pub use budget_model::{
    BorrowEntry, BorrowRepayment, BudgetCategory, CategoryBudget, EarningEntry, Month, MonthKey,
    MonthSummary, NewBorrowEntry, NewEarningEntry, NewSpendingEntry, Plan, PlanInput,
    SpendingEntry,
};
pub use budget_service::BudgetService;
pub use budget_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
