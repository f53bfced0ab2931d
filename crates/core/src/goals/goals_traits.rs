use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalStatus, GoalUpdate, NewGoal};
use crate::schedule::{GoalSchedule, GoalTracker};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for goal repository operations.
///
/// This is the goal store the rest of the crate persists through; the SQLite
/// crate provides the production implementation.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn load_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn insert_new_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal_update: Goal) -> Result<Goal>;
    async fn update_goal_status(&self, goal_id: String, status: GoalStatus) -> Result<Goal>;
    async fn update_current_amount(&self, goal_id: String, amount: Decimal) -> Result<Goal>;
    async fn delete_goal(&self, goal_id_to_delete: String) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal>;
    async fn update_goal_status(&self, goal_id: &str, status: GoalStatus) -> Result<Goal>;
    async fn update_current_amount(&self, goal_id: &str, amount: Decimal) -> Result<Goal>;
    async fn delete_goal(&self, goal_id_to_delete: String) -> Result<usize>;
    fn get_goal_schedule(&self, goal_id: &str) -> Result<GoalSchedule>;
    fn open_tracker(&self, goal_id: &str) -> Result<GoalTracker>;
}
