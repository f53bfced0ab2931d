use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::goals::goals_model::{Goal, GoalStatus, GoalUpdate, NewGoal};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::schedule::{generate_schedule, summarize, GoalSchedule, GoalTracker};
use crate::settings::SettingsServiceTrait;
use crate::utils::decimal_utils::clamp_amount;
use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl GoalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        GoalService {
            goal_repo,
            settings_service,
            event_sink,
        }
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self) -> Result<Vec<Goal>> {
        let mut goals = self.goal_repo.load_goals()?;
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repo.get_goal(goal_id)
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        let mut new_goal = new_goal;
        if new_goal.start_date.is_none() {
            new_goal.start_date = Some(self.settings_service.today()?);
        }
        new_goal.validate()?;

        let goal = self.goal_repo.insert_new_goal(new_goal).await?;
        debug!("Created goal {} ({})", goal.id, goal.title);
        self.event_sink
            .emit(DomainEvent::goals_changed(vec![goal.id.clone()]));
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let existing = self.goal_repo.get_goal(goal_id)?;
        let updated = update.apply_to(&existing);
        updated.validate()?;
        if update.affects_schedule() {
            debug!("Goal {} edit changes its badge schedule", goal_id);
        }

        let goal = self.goal_repo.update_goal(updated).await?;
        self.event_sink
            .emit(DomainEvent::goals_changed(vec![goal.id.clone()]));
        Ok(goal)
    }

    async fn update_goal_status(&self, goal_id: &str, status: GoalStatus) -> Result<Goal> {
        let goal = self
            .goal_repo
            .update_goal_status(goal_id.to_string(), status)
            .await?;
        self.event_sink
            .emit(DomainEvent::goals_changed(vec![goal.id.clone()]));
        Ok(goal)
    }

    async fn update_current_amount(&self, goal_id: &str, amount: Decimal) -> Result<Goal> {
        let existing = self.goal_repo.get_goal(goal_id)?;
        let amount = clamp_amount(amount, Decimal::ZERO, existing.target_amount);

        let mut goal = self
            .goal_repo
            .update_current_amount(goal_id.to_string(), amount)
            .await?;
        if goal.status == GoalStatus::NotStarted && amount > Decimal::ZERO {
            goal = self
                .goal_repo
                .update_goal_status(goal_id.to_string(), GoalStatus::InProgress)
                .await?;
        }
        self.event_sink.emit(DomainEvent::goal_progress_changed(
            goal.id.clone(),
            goal.current_amount,
        ));
        Ok(goal)
    }

    async fn delete_goal(&self, goal_id_to_delete: String) -> Result<usize> {
        let deleted = self
            .goal_repo
            .delete_goal(goal_id_to_delete.clone())
            .await?;
        if deleted > 0 {
            self.event_sink
                .emit(DomainEvent::goals_changed(vec![goal_id_to_delete]));
        }
        Ok(deleted)
    }

    fn get_goal_schedule(&self, goal_id: &str) -> Result<GoalSchedule> {
        let goal = self.goal_repo.get_goal(goal_id)?;
        let settings = self.settings_service.get_settings()?;
        let today = self.settings_service.today()?;
        let badges = generate_schedule(&goal, today, &settings)?;
        let summary = summarize(&goal, &badges);
        Ok(GoalSchedule {
            goal,
            badges,
            summary,
        })
    }

    fn open_tracker(&self, goal_id: &str) -> Result<GoalTracker> {
        let goal = self.goal_repo.get_goal(goal_id)?;
        let settings = self.settings_service.get_settings()?;
        let today = self.settings_service.today()?;
        GoalTracker::new(
            goal,
            settings,
            today,
            Arc::clone(&self.goal_repo),
            Arc::clone(&self.event_sink),
        )
    }
}
