use goalpace_core::goals::{Goal, GoalRepositoryTrait, GoalStatus, NewGoal};
use goalpace_core::Result;

use super::model::{GoalDB, NewGoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;
use crate::schema::goals::dsl::*;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use std::sync::Arc;
use uuid::Uuid;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }

    pub fn load_goals_impl(&self) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let goals_db = goals
            .order(created_at.desc())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(goals_db.into_iter().map(Goal::from).collect())
    }

    pub fn get_goal_impl(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        let goal_db = goals
            .find(goal_id)
            .first::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Goal::from(goal_db))
    }
}

fn reload(conn: &mut SqliteConnection, goal_id: &str) -> Result<Goal> {
    let goal_db = goals
        .find(goal_id)
        .first::<GoalDB>(conn)
        .map_err(StorageError::from)?;
    Ok(Goal::from(goal_db))
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn load_goals(&self) -> Result<Vec<Goal>> {
        self.load_goals_impl()
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.get_goal_impl(goal_id)
    }

    async fn insert_new_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal_id = new_goal
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let new_goal_db =
                    NewGoalDB::from_new_goal(new_goal, goal_id, Utc::now().naive_utc());

                let result_db = diesel::insert_into(goals::table)
                    .values(&new_goal_db)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Goal::from(result_db))
            })
            .await
    }

    async fn update_goal(&self, goal_update: Goal) -> Result<Goal> {
        let goal_id_owned = goal_update.id.clone();
        let goal_db = GoalDB::from(goal_update);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                diesel::update(goals.find(goal_id_owned.as_str()))
                    .set(&goal_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                reload(conn, &goal_id_owned)
            })
            .await
    }

    async fn update_goal_status(&self, goal_id: String, new_status: GoalStatus) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                diesel::update(goals.find(goal_id.as_str()))
                    .set(status.eq(new_status.as_str()))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                reload(conn, &goal_id)
            })
            .await
    }

    async fn update_current_amount(&self, goal_id: String, amount: Decimal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                diesel::update(goals.find(goal_id.as_str()))
                    .set(current_amount.eq(amount.to_string()))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                reload(conn, &goal_id)
            })
            .await
    }

    async fn delete_goal(&self, goal_id_to_delete: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(goals.find(goal_id_to_delete))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::NaiveDate;
    use goalpace_core::errors::{DatabaseError, Error};
    use goalpace_core::goals::SaveFrequency;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (GoalRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (GoalRepository::new(Arc::clone(&pool), writer), temp_dir)
    }

    fn new_goal(name: &str) -> NewGoal {
        NewGoal {
            title: name.to_string(),
            description: Some("monthly plan".to_string()),
            target_amount: Some(dec!(1200.00)),
            save_frequency: Some(SaveFrequency::Monthly),
            duration: Some(12),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_goal() {
        let (repo, _dir) = create_test_repository().await;

        let inserted = repo.insert_new_goal(new_goal("Laptop")).await.unwrap();
        assert!(!inserted.id.is_empty());
        assert_eq!(inserted.status, GoalStatus::NotStarted);
        assert_eq!(inserted.current_amount, Decimal::ZERO);

        let loaded = repo.get_goal(&inserted.id).unwrap();
        assert_eq!(loaded, inserted);
        assert_eq!(loaded.target_amount, dec!(1200.00));
        assert_eq!(loaded.save_frequency, SaveFrequency::Monthly);
        assert_eq!(loaded.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(loaded.duration, Some(12));
    }

    #[tokio::test]
    async fn test_insert_keeps_caller_supplied_id() {
        let (repo, _dir) = create_test_repository().await;
        let mut goal = new_goal("Phone");
        goal.id = Some("fixed-id".to_string());

        let inserted = repo.insert_new_goal(goal).await.unwrap();
        assert_eq!(inserted.id, "fixed-id");

        let mut duplicate = new_goal("Phone again");
        duplicate.id = Some("fixed-id".to_string());
        let err = repo.insert_new_goal(duplicate).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn test_update_goal_clears_optional_fields() {
        let (repo, _dir) = create_test_repository().await;
        let mut goal = repo.insert_new_goal(new_goal("Trip")).await.unwrap();

        goal.description = None;
        goal.end_date = NaiveDate::from_ymd_opt(2024, 6, 30);
        goal.save_frequency = SaveFrequency::Weekly;
        let updated = repo.update_goal(goal.clone()).await.unwrap();

        assert_eq!(updated.description, None);
        assert_eq!(updated.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(updated.save_frequency, SaveFrequency::Weekly);
        assert_eq!(updated, goal);
    }

    #[tokio::test]
    async fn test_update_amount_and_status() {
        let (repo, _dir) = create_test_repository().await;
        let goal = repo.insert_new_goal(new_goal("Bike")).await.unwrap();

        let saved = repo
            .update_current_amount(goal.id.clone(), dec!(250.75))
            .await
            .unwrap();
        assert_eq!(saved.current_amount, dec!(250.75));

        let completed = repo
            .update_goal_status(goal.id.clone(), GoalStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, GoalStatus::Completed);
        assert_eq!(completed.current_amount, dec!(250.75));
    }

    #[tokio::test]
    async fn test_update_missing_goal_fails() {
        let (repo, _dir) = create_test_repository().await;
        let err = repo
            .update_current_amount("missing".to_string(), dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::Internal(_))));
        assert!(matches!(
            repo.get_goal("missing"),
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_goals_newest_first_and_delete() {
        let (repo, _dir) = create_test_repository().await;
        let mut first = repo.insert_new_goal(new_goal("First")).await.unwrap();
        let second = repo.insert_new_goal(new_goal("Second")).await.unwrap();
        first.created_at = second.created_at - chrono::Duration::days(1);
        let first = repo.update_goal(first).await.unwrap();

        let ids: Vec<String> = repo.load_goals().unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        assert_eq!(repo.delete_goal(first.id.clone()).await.unwrap(), 1);
        assert_eq!(repo.delete_goal(first.id).await.unwrap(), 0);
        assert_eq!(repo.load_goals().unwrap().len(), 1);
    }
}
