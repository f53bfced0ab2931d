//! SQLite storage implementation for the monthly budget.

mod model;
mod repository;

pub use model::{
    BorrowEntryDB, BudgetCategoryDB, EarningEntryDB, MonthDB, PlanDB, SpendingEntryDB,
};
pub use repository::BudgetRepository;
